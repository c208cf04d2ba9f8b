// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::dashboard::{DashboardCharts, DashboardStats},
};

// GET /api/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Totais e taxa de conversão (uma casa decimal)", body = DashboardStats)
    ),
    security(("caller_identity" = []))
)]
pub async fn get_dashboard_stats(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.dashboard_service.get_stats().await?;
    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/dashboard/charts
#[utoipa::path(
    get,
    path = "/api/dashboard/charts",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Séries prontas para os gráficos do painel", body = DashboardCharts)
    ),
    security(("caller_identity" = []))
)]
pub async fn get_dashboard_charts(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let charts = app_state.dashboard_service.get_charts().await?;
    Ok((StatusCode::OK, Json(charts)))
}
