// src/db/product_repo.rs

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    models::product::{Product, ScanEvent},
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, product: &Product) -> Result<Product, AppError> {
        let created = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (id, name, description, price, category, inventory, qr_code,
                 custom_fields, scan_history, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            RETURNING *
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category)
        .bind(product.inventory)
        .bind(&product.qr_code)
        .bind(&product.custom_fields)
        .bind(&product.scan_history)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Importação em massa: todas as linhas numa transação só.
    /// Qualquer falha desfaz tudo (tudo-ou-nada).
    pub async fn create_many(&self, products: &[Product]) -> Result<Vec<Product>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(products.len());

        for product in products {
            let row = sqlx::query_as::<_, Product>(
                r#"
                INSERT INTO products
                    (id, name, description, price, category, inventory, qr_code,
                     custom_fields, scan_history, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                RETURNING *
                "#,
            )
            .bind(&product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.category)
            .bind(product.inventory)
            .bind(&product.qr_code)
            .bind(&product.custom_fields)
            .bind(&product.scan_history)
            .bind(product.created_at)
            .bind(product.updated_at)
            .fetch_one(&mut *tx)
            .await?;

            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    pub async fn list(&self, limit: u32, offset: u32) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            ORDER BY created_at ASC, id ASC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    // Busca por substring em nome/descrição, com filtro opcional de categoria.
    // O LIKE do SQLite já é case-insensitive para ASCII.
    pub async fn search(
        &self,
        term: Option<&str>,
        category: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Product>, AppError> {
        let pattern = term.map(|t| format!("%{}%", t));

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE (?1 IS NULL OR name LIKE ?1 OR description LIKE ?1)
              AND (?2 IS NULL OR category = ?2)
            ORDER BY created_at ASC, id ASC
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(&pattern)
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn count_search(
        &self,
        term: Option<&str>,
        category: Option<&str>,
    ) -> Result<i64, AppError> {
        let pattern = term.map(|t| format!("%{}%", t));

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM products
            WHERE (?1 IS NULL OR name LIKE ?1 OR description LIKE ?1)
              AND (?2 IS NULL OR category = ?2)
            "#,
        )
        .bind(&pattern)
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    pub async fn update_info(
        &self,
        id: &str,
        name: &str,
        description: &str,
        price: f64,
        category: &str,
        custom_fields: &Json<serde_json::Map<String, serde_json::Value>>,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = ?1, description = ?2, price = ?3, category = ?4,
                custom_fields = ?5, updated_at = ?6
            WHERE id = ?7
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(category)
        .bind(custom_fields)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  IDENTIDADE (QR CODE)
    // =========================================================================

    /// Quem detém este código hoje? Usado na re-checagem de unicidade
    /// imediatamente antes do commit.
    pub async fn find_id_by_qr(&self, qr_code: &str) -> Result<Option<String>, AppError> {
        let id = sqlx::query_scalar::<_, String>("SELECT id FROM products WHERE qr_code = ?1")
            .bind(qr_code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }

    /// Grava o código no produto. O índice UNIQUE é a última linha de
    /// defesa contra uma corrida entre a re-checagem e o commit.
    pub async fn set_qr_code(
        &self,
        id: &str,
        qr_code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET qr_code = ?1, updated_at = ?2
            WHERE id = ?3
            RETURNING *
            "#,
        )
        .bind(qr_code)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(
                        "Já existe outro produto com este QR code.".to_string(),
                    );
                }
            }
            e.into()
        })?;

        Ok(product)
    }

    // =========================================================================
    //  SCANS E ESTOQUE
    // =========================================================================

    /// Acrescenta o evento ao fim do histórico num UPDATE só; nada mais do
    /// produto é tocado além de scan_history e updated_at.
    pub async fn append_scan(
        &self,
        id: &str,
        event: &ScanEvent,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let payload =
            serde_json::to_string(event).map_err(|e| AppError::InternalServerError(e.into()))?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET scan_history = json_insert(scan_history, '$[#]', json(?1)),
                updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(payload)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Incremento atômico no banco (nunca read-modify-write na aplicação,
    /// para ajustes concorrentes não se perderem). A condição no WHERE
    /// impede o estoque de ficar negativo sem nunca fazer clamp: ou aplica
    /// o delta inteiro, ou não toca na linha.
    pub async fn adjust_inventory(
        &self,
        id: &str,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET inventory = inventory + ?1, updated_at = ?2
            WHERE id = ?3 AND inventory + ?1 >= 0
            RETURNING *
            "#,
        )
        .bind(delta)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }
}
