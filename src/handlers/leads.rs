// src/handlers/leads.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::PageQuery,
    models::{
        customer::{AddressInput, Customer},
        lead::Lead,
        Page,
    },
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria Silva")]
    pub name: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "maria@exemplo.com")]
    pub email: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "+55 11 99999-0000")]
    pub phone: String,

    // Canal de origem, texto livre
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Website")]
    pub source: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadStatusPayload {
    // Validado no domínio: valor fora do pipeline é ValidationError
    #[schema(example = "InProgress")]
    pub status: String,
}

/// Campos adicionais da conversão. Opcionais AQUI porque a validação roda
/// depois da primeira fase da conversão (ver LeadService::convert_to_customer).
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertLeadPayload {
    #[schema(example = "Acme Ltda")]
    pub company_name: Option<String>,
    pub address: Option<AddressInput>,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado com status New", body = Lead),
        (status = 400, description = "Dados inválidos")
    ),
    security(("caller_identity" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lead = app_state
        .lead_service
        .create(&payload.name, &payload.email, &payload.phone, &payload.source)
        .await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(PageQuery),
    responses(
        (status = 200, description = "Página de leads em ordem de inserção", body = Page<Lead>)
    ),
    security(("caller_identity" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.lead_service.list(query.page, query.limit).await?;
    Ok((StatusCode::OK, Json(page)))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = String, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead encontrado", body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("caller_identity" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.lead_service.get(&id).await?;
    Ok((StatusCode::OK, Json(lead)))
}

// PUT /api/leads/{id}
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = String, Path, description = "ID do lead")),
    request_body = UpdateLeadPayload,
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("caller_identity" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lead = app_state
        .lead_service
        .update(&id, payload.name, payload.email, payload.phone, payload.source)
        .await?;

    Ok((StatusCode::OK, Json(lead)))
}

// DELETE /api/leads/{id}
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = String, Path, description = "ID do lead")),
    responses(
        (status = 204, description = "Lead removido"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("caller_identity" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.lead_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/leads/{id}/status
#[utoipa::path(
    put,
    path = "/api/leads/{id}/status",
    tag = "Leads",
    params(("id" = String, Path, description = "ID do lead")),
    request_body = UpdateLeadStatusPayload,
    responses(
        (status = 200, description = "Status atualizado e lastUpdated renovado", body = Lead),
        (status = 400, description = "Status desconhecido ou transição não permitida"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("caller_identity" = []))
)]
pub async fn update_lead_status(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateLeadStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_service
        .update_status(&id, &payload.status)
        .await?;

    Ok((StatusCode::OK, Json(lead)))
}

// GET /api/leads/status/{status}
#[utoipa::path(
    get,
    path = "/api/leads/status/{status}",
    tag = "Leads",
    params(
        ("status" = String, Path, description = "New, InProgress ou Converted"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Página de leads com o status pedido", body = Page<Lead>),
        (status = 400, description = "Status desconhecido")
    ),
    security(("caller_identity" = []))
)]
pub async fn list_leads_by_status(
    State(app_state): State<AppState>,
    Path(status): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .lead_service
        .list_by_status(&status, query.page, query.limit)
        .await?;

    Ok((StatusCode::OK, Json(page)))
}

// POST /api/leads/{id}/convert
#[utoipa::path(
    post,
    path = "/api/leads/{id}/convert",
    tag = "Leads",
    params(("id" = String, Path, description = "ID do lead")),
    request_body = ConvertLeadPayload,
    responses(
        (status = 201, description = "Cliente criado a partir do lead", body = Customer),
        (status = 400, description = "companyName/endereço ausentes (fase 1 já aplicada)"),
        (status = 404, description = "Lead não encontrado"),
        (status = 409, description = "Lead já convertido")
    ),
    security(("caller_identity" = []))
)]
pub async fn convert_lead(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ConvertLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .lead_service
        .convert_to_customer(&id, payload.company_name, payload.address)
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/leads/unreconciled
#[utoipa::path(
    get,
    path = "/api/leads/unreconciled",
    tag = "Leads",
    responses(
        (status = 200, description = "Leads Converted sem cliente correspondente (janela de crash da conversão)", body = Vec<Lead>)
    ),
    security(("caller_identity" = []))
)]
pub async fn list_unreconciled_leads(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state.lead_service.unreconciled().await?;
    Ok((StatusCode::OK, Json(leads)))
}
