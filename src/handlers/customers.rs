// src/handlers/customers.rs

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
    middleware::auth::CallerIdentity,
    models::{
        customer::{Address, Customer},
        Page,
    },
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ana Souza")]
    pub full_name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Acme Ltda")]
    pub company_name: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "ana@acme.com")]
    pub email: String,

    #[validate(length(min = 1, message = "required"))]
    pub phone: String,

    #[validate(nested)]
    pub address: Address,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddNotePayload {
    #[schema(example = "Cliente pediu orçamento para 200 unidades.")]
    pub content: String,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Clientes",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente cadastrado", body = Customer),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("caller_identity" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state
        .customer_service
        .create(
            &payload.full_name,
            &payload.company_name,
            &payload.email,
            &payload.phone,
            &payload.address,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Clientes",
    params(PageQuery),
    responses(
        (status = 200, description = "Página de clientes por data de cadastro", body = Page<Customer>)
    ),
    security(("caller_identity" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .customer_service
        .list(query.page, query.limit)
        .await?;
    Ok((StatusCode::OK, Json(page)))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Clientes",
    params(("id" = String, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente encontrado", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("caller_identity" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state.customer_service.get(&id).await?;
    Ok((StatusCode::OK, Json(customer)))
}

// POST /api/customers/{id}/notes
#[utoipa::path(
    post,
    path = "/api/customers/{id}/notes",
    tag = "Clientes",
    params(("id" = String, Path, description = "ID do cliente")),
    request_body = AddNotePayload,
    responses(
        (status = 200, description = "Nota acrescentada ao histórico", body = Customer),
        (status = 400, description = "Nota vazia"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("caller_identity" = []))
)]
pub async fn add_customer_note(
    State(app_state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
    Json(payload): Json<AddNotePayload>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .customer_service
        .add_note(&id, &payload.content, Some(caller))
        .await?;

    Ok((StatusCode::OK, Json(customer)))
}
