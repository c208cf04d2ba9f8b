// src/db/customer_repo.rs

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    models::customer::{Address, Customer, CustomerNote},
};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        id: &str,
        full_name: &str,
        company_name: &str,
        email: &str,
        phone: &str,
        address: &Address,
        now: DateTime<Utc>,
    ) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (id, full_name, company_name, email, phone, address, notes, registration_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, '[]', ?7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(company_name)
        .bind(email)
        .bind(phone)
        .bind(Json(address))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Tratamento de erro de chave duplicada (índice UNIQUE no e-mail)
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "Já existe um cliente com o e-mail '{}'.",
                        email
                    ));
                }
            }
            e.into()
        })?;

        Ok(customer)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn list(&self, limit: u32, offset: u32) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            ORDER BY registration_date ASC, id ASC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    /// Acrescenta a nota ao fim do array JSON, num UPDATE só (append
    /// atômico no banco). Notas nunca são editadas nem removidas.
    pub async fn append_note(&self, id: &str, note: &CustomerNote) -> Result<bool, AppError> {
        let payload =
            serde_json::to_string(note).map_err(|e| AppError::InternalServerError(e.into()))?;

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET notes = json_insert(notes, '$[#]', json(?1))
            WHERE id = ?2
            "#,
        )
        .bind(payload)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
