// src/db/dashboard_repo.rs

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    models::dashboard::{DistributionEntry, ProductPerformanceEntry},
};

/// Totais brutos lidos numa transação só (snapshot consistente).
pub struct RawTotals {
    pub total_leads: i64,
    pub converted_leads: i64,
    pub total_products: i64,
    pub total_customers: i64,
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // 1. Contadores escalares
    pub async fn get_totals(&self) -> Result<RawTotals, AppError> {
        // Uma transação para as quatro contagens enxergarem o mesmo estado
        let mut tx = self.pool.begin().await?;

        let total_leads = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads")
            .fetch_one(&mut *tx)
            .await?;

        let converted_leads =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads WHERE status = 'Converted'")
                .fetch_one(&mut *tx)
                .await?;

        let total_products = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *tx)
            .await?;

        let total_customers = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(RawTotals {
            total_leads,
            converted_leads,
            total_products,
            total_customers,
        })
    }

    // 2. Tendência: contagens por janela de um dia [start, end)
    pub async fn count_leads_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM leads WHERE created_at >= ?1 AND created_at < ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    // Aproximação assumida: o dia da conversão é o last_updated do lead
    // Converted (não guardamos o instante exato da transição).
    pub async fn count_conversions_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM leads
            WHERE status = 'Converted' AND last_updated >= ?1 AND last_updated < ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    // 3. Distribuição por canal de origem: cobre cada lead exatamente uma vez
    pub async fn lead_sources(&self) -> Result<Vec<DistributionEntry>, AppError> {
        let entries = sqlx::query_as::<_, DistributionEntry>(
            r#"
            SELECT source AS name, COUNT(*) AS value
            FROM leads
            GROUP BY source
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    // 4. Top produtos por estoque
    pub async fn top_products_by_inventory(
        &self,
        limit: u32,
    ) -> Result<Vec<ProductPerformanceEntry>, AppError> {
        let entries = sqlx::query_as::<_, ProductPerformanceEntry>(
            r#"
            SELECT name, inventory
            FROM products
            ORDER BY inventory DESC, id ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
