// src/config.rs

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{env, str::FromStr, time::Duration};

use crate::{
    db::{CustomerRepository, DashboardRepository, LeadRepository, ProductRepository},
    services::{CustomerService, DashboardService, LeadService, ProductService, QrService},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub lead_service: LeadService,
    pub customer_service: CustomerService,
    pub product_service: ProductService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://crm.db".to_string());
        // Base dos localizadores embutidos nos QR codes impressos
        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);

        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, base_url))
    }

    // Monta o gráfico de dependências a partir do pool
    pub fn from_pool(db_pool: SqlitePool, base_url: String) -> Self {
        let lead_repo = LeadRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let lead_service = LeadService::new(lead_repo, customer_repo.clone());
        let customer_service = CustomerService::new(customer_repo);
        let product_service = ProductService::new(product_repo, QrService::new(base_url));
        let dashboard_service = DashboardService::new(dashboard_repo);

        Self {
            db_pool,
            lead_service,
            customer_service,
            product_service,
            dashboard_service,
        }
    }
}
