// src/services/lead_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{error::AppError, page_params},
    db::{CustomerRepository, LeadRepository},
    models::{
        customer::{AddressInput, Customer},
        lead::{transition_allowed, Lead, LeadStatus},
        Page,
    },
};

#[derive(Clone)]
pub struct LeadService {
    lead_repo: LeadRepository,
    customer_repo: CustomerRepository,
}

impl LeadService {
    pub fn new(lead_repo: LeadRepository, customer_repo: CustomerRepository) -> Self {
        Self {
            lead_repo,
            customer_repo,
        }
    }

    pub async fn create(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        source: &str,
    ) -> Result<Lead, AppError> {
        let id = Uuid::new_v4().to_string();
        self.lead_repo
            .create(&id, name, email, phone, source, Utc::now())
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Lead, AppError> {
        self.lead_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Lead"))
    }

    pub async fn list(&self, page: Option<u32>, limit: Option<u32>) -> Result<Page<Lead>, AppError> {
        let (page, limit, offset) = page_params(page, limit)?;
        let items = self.lead_repo.list(limit, offset).await?;
        let total = self.lead_repo.count().await?;
        Ok(Page::new(items, total, page, limit))
    }

    /// Atualiza dados de contato; campos omitidos ficam como estão.
    pub async fn update(
        &self,
        id: &str,
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        source: Option<String>,
    ) -> Result<Lead, AppError> {
        let current = self.get(id).await?;

        self.lead_repo
            .update_contact(
                id,
                &name.unwrap_or(current.name),
                &email.unwrap_or(current.email),
                &phone.unwrap_or(current.phone),
                &source.unwrap_or(current.source),
                Utc::now(),
            )
            .await?
            .ok_or(AppError::NotFound("Lead"))
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if self.lead_repo.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Lead"))
        }
    }

    // =========================================================================
    //  MÁQUINA DE ESTADOS
    // =========================================================================

    /// Troca o status pela tabela de transições e atualiza last_updated.
    /// Este primitivo não tem efeitos colaterais além do próprio lead; a
    /// guarda contra reconversão mora em `convert_to_customer`.
    pub async fn update_status(&self, id: &str, status_raw: &str) -> Result<Lead, AppError> {
        let new_status = LeadStatus::parse(status_raw)?;
        let lead = self.get(id).await?;

        if !transition_allowed(lead.status, new_status) {
            return Err(AppError::InvalidInput(format!(
                "Transição de status {} -> {} não permitida.",
                lead.status, new_status
            )));
        }

        self.lead_repo
            .set_status(id, new_status, Utc::now())
            .await?
            .ok_or(AppError::NotFound("Lead"))
    }

    pub async fn list_by_status(
        &self,
        status_raw: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Page<Lead>, AppError> {
        let status = LeadStatus::parse(status_raw)?;
        let (page, limit, offset) = page_params(page, limit)?;

        let items = self.lead_repo.list_by_status(status, limit, offset).await?;
        let total = self.lead_repo.count_by_status(status).await?;
        Ok(Page::new(items, total, page, limit))
    }

    // =========================================================================
    //  CONVERSÃO LEAD -> CUSTOMER
    // =========================================================================

    /// A única transição com efeito fora do lead. Duas fases:
    ///
    /// 1. lead vira Converted + entrada aberta no conversion_log (uma tx);
    /// 2. Customer criado com nome/e-mail/telefone copiados do lead e os
    ///    campos adicionais do chamador; a entrada do log é concluída.
    ///
    /// As fases NÃO são atômicas entre si. A validação dos campos
    /// adicionais roda depois da fase 1 de propósito: faltando
    /// companyName/endereço, o lead permanece Converted sem Customer, e o
    /// rastro fica visível em `unreconciled` e no log de conversão.
    pub async fn convert_to_customer(
        &self,
        lead_id: &str,
        company_name: Option<String>,
        address: Option<AddressInput>,
    ) -> Result<Customer, AppError> {
        if self.lead_repo.find_by_id(lead_id).await?.is_none() {
            return Err(AppError::NotFound("Lead"));
        }
        if self.lead_repo.has_completed_conversion(lead_id).await? {
            return Err(AppError::Conflict(
                "Este lead já foi convertido em cliente.".to_string(),
            ));
        }

        // Fase 1
        let log_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let lead = self
            .lead_repo
            .begin_conversion(lead_id, &log_id, now)
            .await?
            .ok_or(AppError::NotFound("Lead"))?;

        // Fase 2
        let company_name = match company_name {
            Some(c) if !c.trim().is_empty() => c,
            _ => {
                return Err(AppError::InvalidInput(
                    "companyName é obrigatório para converter o lead.".to_string(),
                ))
            }
        };
        let address = address.unwrap_or_default().into_address().map_err(|missing| {
            AppError::InvalidInput(format!(
                "Campos de endereço obrigatórios ausentes: {}.",
                missing.join(", ")
            ))
        })?;

        let customer_id = Uuid::new_v4().to_string();
        let customer = self
            .customer_repo
            .create(
                &customer_id,
                &lead.name,
                &company_name,
                &lead.email,
                &lead.phone,
                &address,
                now,
            )
            .await?;

        self.lead_repo
            .complete_conversion(&log_id, &customer.id, Utc::now())
            .await?;

        tracing::info!(lead_id = %lead_id, customer_id = %customer.id, "Lead convertido em cliente");
        Ok(customer)
    }

    /// Leads Converted sem Customer correspondente: o que um crash entre as
    /// duas fases deixa para o operador reconciliar.
    pub async fn unreconciled(&self) -> Result<Vec<Lead>, AppError> {
        self.lead_repo.list_unreconciled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::LeadStatus;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> LeadService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        LeadService::new(
            LeadRepository::new(pool.clone()),
            CustomerRepository::new(pool),
        )
    }

    fn full_address() -> AddressInput {
        AddressInput {
            street: Some("Rua A, 10".into()),
            city: Some("São Paulo".into()),
            state: Some("SP".into()),
            country: Some("BR".into()),
            postal_code: Some("01000-000".into()),
        }
    }

    #[tokio::test]
    async fn status_invalido_falha_e_nao_altera_o_lead() {
        let service = setup().await;
        let lead = service
            .create("A", "a@x.com", "1", "Website")
            .await
            .unwrap();
        assert_eq!(lead.status, LeadStatus::New);

        let err = service.update_status(&lead.id, "Qualified").await;
        assert!(matches!(err, Err(AppError::InvalidInput(_))));

        let unchanged = service.get(&lead.id).await.unwrap();
        assert_eq!(unchanged.status, LeadStatus::New);
        assert_eq!(unchanged.last_updated, lead.last_updated);
    }

    #[tokio::test]
    async fn update_status_percorre_o_pipeline() {
        let service = setup().await;
        let lead = service
            .create("A", "a@x.com", "1", "Website")
            .await
            .unwrap();

        let lead = service.update_status(&lead.id, "InProgress").await.unwrap();
        assert_eq!(lead.status, LeadStatus::InProgress);

        let lead = service.update_status(&lead.id, "Converted").await.unwrap();
        assert_eq!(lead.status, LeadStatus::Converted);

        // Comportamento permissivo atual: volta de Converted é aceita
        let lead = service.update_status(&lead.id, "New").await.unwrap();
        assert_eq!(lead.status, LeadStatus::New);

        let err = service.update_status("nao-existe", "New").await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn conversao_copia_dados_e_move_o_lead_de_pagina() {
        let service = setup().await;
        let lead = service
            .create("A", "a@x.com", "1", "Website")
            .await
            .unwrap();

        let customer = service
            .convert_to_customer(
                &lead.id,
                Some("Acme".into()),
                Some(full_address()),
            )
            .await
            .unwrap();

        assert_eq!(customer.full_name, "A");
        assert_eq!(customer.email, "a@x.com");
        assert_eq!(customer.phone, "1");
        assert_eq!(customer.company_name, "Acme");

        let converted = service.get(&lead.id).await.unwrap();
        assert_eq!(converted.status, LeadStatus::Converted);

        // listByStatus("New") não traz mais o lead; "Converted" traz
        let news = service.list_by_status("New", None, None).await.unwrap();
        assert!(news.items.iter().all(|l| l.id != lead.id));
        let converteds = service.list_by_status("Converted", None, None).await.unwrap();
        assert!(converteds.items.iter().any(|l| l.id == lead.id));
        assert_eq!(converteds.total, 1);

        // Nada pendente de reconciliação: as duas fases concluíram
        assert!(service.unreconciled().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn conversao_dupla_nao_cria_dois_clientes() {
        let service = setup().await;
        let lead = service
            .create("A", "a@x.com", "1", "Website")
            .await
            .unwrap();

        service
            .convert_to_customer(&lead.id, Some("Acme".into()), Some(full_address()))
            .await
            .unwrap();

        let second = service
            .convert_to_customer(&lead.id, Some("Acme".into()), Some(full_address()))
            .await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn conversao_sem_campos_deixa_a_fase_um_aplicada() {
        let service = setup().await;
        let lead = service
            .create("A", "a@x.com", "1", "Website")
            .await
            .unwrap();

        // Sem companyName: falha com ValidationError, mas a fase 1 já rodou
        let err = service.convert_to_customer(&lead.id, None, None).await;
        assert!(matches!(err, Err(AppError::InvalidInput(_))));

        let after = service.get(&lead.id).await.unwrap();
        assert_eq!(after.status, LeadStatus::Converted);

        // A janela é observável: lead aparece na reconciliação e o log
        // registra a conversão iniciada e não concluída
        let pending = service.unreconciled().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, lead.id);

        let log = service.lead_repo.find_conversion_log(&lead.id).await.unwrap();
        assert_eq!(log.len(), 1);
        assert!(log[0].customer_id.is_none());
        assert!(log[0].completed_at.is_none());

        // A segunda tentativa, agora completa, conclui a conversão
        let customer = service
            .convert_to_customer(&lead.id, Some("Acme".into()), Some(full_address()))
            .await
            .unwrap();
        assert_eq!(customer.email, "a@x.com");
        assert!(service.unreconciled().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn paginacao_por_status_e_estavel() {
        let service = setup().await;
        for i in 0..15 {
            service
                .create(&format!("L{i}"), &format!("l{i}@x.com"), "1", "Website")
                .await
                .unwrap();
        }

        let page1 = service
            .list_by_status("New", Some(1), Some(10))
            .await
            .unwrap();
        let page2 = service
            .list_by_status("New", Some(2), Some(10))
            .await
            .unwrap();

        assert_eq!(page1.total, 15);
        assert_eq!(page1.page_count, 2);
        assert_eq!(page1.items.len(), 10);
        assert_eq!(page2.items.len(), 5);

        // Nenhum lead repetido entre páginas
        for l in &page2.items {
            assert!(page1.items.iter().all(|p| p.id != l.id));
        }

        let err = service.list_by_status("Bogus", None, None).await;
        assert!(matches!(err, Err(AppError::InvalidInput(_))));
    }
}
