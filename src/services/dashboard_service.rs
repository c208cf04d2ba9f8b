// src/services/dashboard_service.rs

use anyhow::anyhow;
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::dashboard::{DashboardCharts, DashboardStats, TrendPoint},
};

const TREND_DAYS: i64 = 7;
const TOP_PRODUCTS: u32 = 5;

/// Agregações do dashboard. Somente leitura: cada chamada recomputa a
/// partir do estado atual das coleções, sem visão materializada.
#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_stats(&self) -> Result<DashboardStats, AppError> {
        let totals = self.repo.get_totals().await?;

        // Percentual com uma casa; coleção vazia dá 0, nunca NaN
        let conversion_rate = if totals.total_leads > 0 {
            (totals.converted_leads as f64 * 1000.0 / totals.total_leads as f64).round() / 10.0
        } else {
            0.0
        };

        Ok(DashboardStats {
            total_leads: totals.total_leads,
            total_products: totals.total_products,
            total_customers: totals.total_customers,
            conversion_rate,
        })
    }

    pub async fn get_charts(&self) -> Result<DashboardCharts, AppError> {
        Ok(DashboardCharts {
            lead_trend: self.lead_trend().await?,
            lead_sources: self.repo.lead_sources().await?,
            product_performance: self.repo.top_products_by_inventory(TOP_PRODUCTS).await?,
        })
    }

    /// Últimos 7 dias do calendário local (hoje incluso), do mais antigo
    /// ao mais novo. Dias sem movimento aparecem zerados.
    async fn lead_trend(&self) -> Result<Vec<TrendPoint>, AppError> {
        let today = Local::now().date_naive();
        let mut trend = Vec::with_capacity(TREND_DAYS as usize);

        for offset in (0..TREND_DAYS).rev() {
            let day = today - Duration::days(offset);
            let start = local_midnight(day)?;
            let end = local_midnight(day + Duration::days(1))?;

            let leads = self.repo.count_leads_created_between(start, end).await?;
            let conversions = self.repo.count_conversions_between(start, end).await?;

            trend.push(TrendPoint {
                date: format!("{} {}", day.format("%b"), day.format("%-d")),
                leads,
                conversions,
            });
        }

        Ok(trend)
    }
}

// Meia-noite local do dia, em UTC, para as janelas [start, end) do trend
fn local_midnight(day: NaiveDate) -> Result<DateTime<Utc>, AppError> {
    let naive = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("meia-noite inválida para {day}"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::InternalServerError(anyhow!("meia-noite inexistente no fuso local")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CustomerRepository, LeadRepository};
    use crate::models::lead::LeadStatus;
    use crate::models::customer::Address;
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqlitePoolOptions;
    use uuid::Uuid;

    async fn setup() -> (SqlitePool, DashboardService) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        let service = DashboardService::new(DashboardRepository::new(pool.clone()));
        (pool, service)
    }

    async fn seed_lead(pool: &SqlitePool, source: &str, converted: bool) {
        let repo = LeadRepository::new(pool.clone());
        let id = Uuid::new_v4().to_string();
        let lead = repo
            .create(
                &id,
                "Lead",
                &format!("{id}@x.com"),
                "1",
                source,
                Utc::now(),
            )
            .await
            .unwrap();
        if converted {
            repo.set_status(&lead.id, LeadStatus::Converted, Utc::now())
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn colecoes_vazias_dao_zeros_e_trend_zerado() {
        let (_pool, service) = setup().await;

        let stats = service.get_stats().await.unwrap();
        assert_eq!(stats.total_leads, 0);
        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.total_customers, 0);
        assert_eq!(stats.conversion_rate, 0.0);

        let charts = service.get_charts().await.unwrap();
        assert_eq!(charts.lead_trend.len(), 7);
        assert!(charts
            .lead_trend
            .iter()
            .all(|p| p.leads == 0 && p.conversions == 0));
        assert!(charts.lead_sources.is_empty());
        assert!(charts.product_performance.is_empty());
    }

    #[tokio::test]
    async fn taxa_de_conversao_com_uma_casa_decimal() {
        let (pool, service) = setup().await;
        for i in 0..10 {
            seed_lead(&pool, "Website", i < 3).await;
        }

        let stats = service.get_stats().await.unwrap();
        assert_eq!(stats.total_leads, 10);
        assert_eq!(stats.conversion_rate, 30.0);

        // 1 convertido em 3 -> 33.3, arredondado a uma casa
        let (pool, service) = setup().await;
        for i in 0..3 {
            seed_lead(&pool, "Website", i < 1).await;
        }
        let stats = service.get_stats().await.unwrap();
        assert_eq!(stats.conversion_rate, 33.3);
    }

    #[tokio::test]
    async fn trend_conta_criacao_e_conversao_de_hoje() {
        let (pool, service) = setup().await;
        seed_lead(&pool, "Website", false).await;
        seed_lead(&pool, "Website", true).await;

        let charts = service.get_charts().await.unwrap();
        assert_eq!(charts.lead_trend.len(), 7);

        // Dias do mais antigo ao mais novo; tudo aconteceu hoje
        let today = charts.lead_trend.last().unwrap();
        assert_eq!(today.leads, 2);
        assert_eq!(today.conversions, 1);
        for earlier in &charts.lead_trend[..6] {
            assert_eq!(earlier.leads, 0);
            assert_eq!(earlier.conversions, 0);
        }
    }

    #[tokio::test]
    async fn distribuicao_cobre_cada_lead_uma_vez() {
        let (pool, service) = setup().await;
        seed_lead(&pool, "Website", false).await;
        seed_lead(&pool, "Website", false).await;
        seed_lead(&pool, "Indicação", false).await;

        let charts = service.get_charts().await.unwrap();
        let mut sources = charts.lead_sources;
        sources.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].name, "Indicação");
        assert_eq!(sources[0].value, 1);
        assert_eq!(sources[1].name, "Website");
        assert_eq!(sources[1].value, 2);

        let total: i64 = sources.iter().map(|s| s.value).sum();
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn clientes_entram_na_contagem_do_dashboard() {
        let (pool, service) = setup().await;
        let repo = CustomerRepository::new(pool.clone());
        repo.create(
            "c1",
            "Ana",
            "Acme",
            "ana@x.com",
            "1",
            &Address {
                street: "Rua A".into(),
                city: "SP".into(),
                state: "SP".into(),
                country: "BR".into(),
                postal_code: "01000-000".into(),
            },
            Utc::now(),
        )
        .await
        .unwrap();

        let stats = service.get_stats().await.unwrap();
        assert_eq!(stats.total_customers, 1);
    }
}
