// src/models/dashboard.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// 1. Contadores do topo do dashboard
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_leads: i64,
    pub total_products: i64,
    pub total_customers: i64,
    // Percentual com uma casa decimal; 0 quando não há leads.
    pub conversion_rate: f64,
}

// 2. Um dia da tendência de leads (últimos 7 dias, do mais antigo ao mais novo)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    // Rótulo do dia no calendário local ("Aug 24")
    pub date: String,
    pub leads: i64,
    pub conversions: i64,
}

// 3. Distribuição categórica ({name, value}, um par por grupo observado)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub name: String,
    pub value: i64,
}

// 4. Top produtos por estoque.
// Sem métrica de vendas por enquanto: entra aqui quando existir uma
// fonte real de vendas, nunca como placeholder sintético.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPerformanceEntry {
    pub name: String,
    pub inventory: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    pub lead_trend: Vec<TrendPoint>,
    pub lead_sources: Vec<DistributionEntry>,
    pub product_performance: Vec<ProductPerformanceEntry>,
}
