// src/db/lead_repo.rs

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    models::lead::{ConversionLogEntry, Lead, LeadStatus},
};

#[derive(Clone)]
pub struct LeadRepository {
    pool: SqlitePool,
}

impl LeadRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        id: &str,
        name: &str,
        email: &str,
        phone: &str,
        source: &str,
        now: DateTime<Utc>,
    ) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (id, name, email, phone, source, status, created_at, last_updated)
            VALUES (?1, ?2, ?3, ?4, ?5, 'New', ?6, ?6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(source)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(lead)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lead)
    }

    // Ordem de inserção (created_at, id) para a paginação ficar estável
    pub async fn list(&self, limit: u32, offset: u32) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            ORDER BY created_at ASC, id ASC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    pub async fn list_by_status(
        &self,
        status: LeadStatus,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE status = ?1
            ORDER BY created_at ASC, id ASC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    pub async fn count_by_status(&self, status: LeadStatus) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads WHERE status = ?1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    pub async fn update_contact(
        &self,
        id: &str,
        name: &str,
        email: &str,
        phone: &str,
        source: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads
            SET name = ?1, email = ?2, phone = ?3, source = ?4, last_updated = ?5
            WHERE id = ?6
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(source)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lead)
    }

    pub async fn set_status(
        &self,
        id: &str,
        status: LeadStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads
            SET status = ?1, last_updated = ?2
            WHERE id = ?3
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lead)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  CONVERSÃO EM DUAS FASES
    // =========================================================================

    /// Fase 1: marca o lead como Converted e abre a entrada no log, numa
    /// transação só. A criação do Customer (fase 2) acontece fora daqui;
    /// entre as duas fases existe a janela de inconsistência documentada,
    /// observável em `list_unreconciled`.
    pub async fn begin_conversion(
        &self,
        lead_id: &str,
        log_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Lead>, AppError> {
        let mut tx = self.pool.begin().await?;

        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads
            SET status = 'Converted', last_updated = ?1
            WHERE id = ?2
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(lead_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(lead) = lead else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO conversion_log (id, lead_id, started_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(log_id)
        .bind(lead_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(lead))
    }

    /// Fase 2 concluída: registra o Customer criado na entrada do log.
    pub async fn complete_conversion(
        &self,
        log_id: &str,
        customer_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE conversion_log
            SET customer_id = ?1, completed_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(customer_id)
        .bind(now)
        .bind(log_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Uma conversão lógica já produziu Customer para este lead?
    pub async fn has_completed_conversion(&self, lead_id: &str) -> Result<bool, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM conversion_log WHERE lead_id = ?1 AND customer_id IS NOT NULL",
        )
        .bind(lead_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total > 0)
    }

    pub async fn find_conversion_log(
        &self,
        lead_id: &str,
    ) -> Result<Vec<ConversionLogEntry>, AppError> {
        let entries = sqlx::query_as::<_, ConversionLogEntry>(
            "SELECT * FROM conversion_log WHERE lead_id = ?1 ORDER BY started_at ASC, id ASC",
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Consulta de reconciliação: leads Converted sem Customer com o mesmo
    /// e-mail. É o rastro que um crash entre as duas fases deixa para trás.
    pub async fn list_unreconciled(&self) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT l.* FROM leads l
            WHERE l.status = 'Converted'
              AND NOT EXISTS (SELECT 1 FROM customers c WHERE c.email = l.email)
            ORDER BY l.created_at ASC, l.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }
}
