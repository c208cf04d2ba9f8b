// src/services/customer_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{error::AppError, page_params},
    db::CustomerRepository,
    models::{
        customer::{Address, Customer, CustomerNote},
        Page,
    },
};

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository) -> Self {
        Self { repo }
    }

    /// Cadastro direto (sem passar por lead). O e-mail é único entre
    /// clientes; duplicado vira conflito.
    pub async fn create(
        &self,
        full_name: &str,
        company_name: &str,
        email: &str,
        phone: &str,
        address: &Address,
    ) -> Result<Customer, AppError> {
        let id = Uuid::new_v4().to_string();
        self.repo
            .create(&id, full_name, company_name, email, phone, address, Utc::now())
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Customer, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))
    }

    pub async fn list(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Page<Customer>, AppError> {
        let (page, limit, offset) = page_params(page, limit)?;
        let items = self.repo.list(limit, offset).await?;
        let total = self.repo.count().await?;
        Ok(Page::new(items, total, page, limit))
    }

    /// Acrescenta uma nota ao cliente. Notas são append-only: ordem de
    /// inserção = ordem cronológica, nunca editadas nem removidas.
    pub async fn add_note(
        &self,
        id: &str,
        content: &str,
        created_by: Option<String>,
    ) -> Result<Customer, AppError> {
        if content.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "O conteúdo da nota não pode ser vazio.".to_string(),
            ));
        }

        let note = CustomerNote {
            content: content.to_string(),
            created_at: Utc::now(),
            created_by,
        };

        if !self.repo.append_note(id, &note).await? {
            return Err(AppError::NotFound("Cliente"));
        }
        self.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> CustomerService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        CustomerService::new(CustomerRepository::new(pool))
    }

    fn address() -> Address {
        Address {
            street: "Rua A, 10".into(),
            city: "São Paulo".into(),
            state: "SP".into(),
            country: "BR".into(),
            postal_code: "01000-000".into(),
        }
    }

    #[tokio::test]
    async fn email_duplicado_vira_conflito() {
        let service = setup().await;
        service
            .create("Ana", "Acme", "ana@x.com", "1", &address())
            .await
            .unwrap();

        let dup = service
            .create("Outra Ana", "Beta", "ana@x.com", "2", &address())
            .await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn notas_sao_append_only_em_ordem_cronologica() {
        let service = setup().await;
        let customer = service
            .create("Ana", "Acme", "ana@x.com", "1", &address())
            .await
            .unwrap();
        assert!(customer.notes.0.is_empty());

        service
            .add_note(&customer.id, "primeira", Some("vendedor-1".into()))
            .await
            .unwrap();
        let after = service.add_note(&customer.id, "segunda", None).await.unwrap();

        let notes = &after.notes.0;
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].content, "primeira");
        assert_eq!(notes[0].created_by.as_deref(), Some("vendedor-1"));
        assert_eq!(notes[1].content, "segunda");
        assert!(notes[0].created_at <= notes[1].created_at);

        let err = service.add_note(&customer.id, "   ", None).await;
        assert!(matches!(err, Err(AppError::InvalidInput(_))));

        let err = service.add_note("nao-existe", "nota", None).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }
}
