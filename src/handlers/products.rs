// src/handlers/products.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::PageQuery,
    middleware::auth::{AdminCaller, MaybeCaller},
    models::{
        product::{Product, QrCodePayload, ScanAck, ScanLocation},
        Page,
    },
    services::product_service::BulkProductRecord,
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Teclado Mecânico")]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[validate(range(min = 0.0, message = "must_be_non_negative"))]
    #[schema(example = 249.9)]
    pub price: f64,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Eletrônicos")]
    pub category: String,

    #[validate(range(min = 0, message = "must_be_non_negative"))]
    #[schema(example = 20)]
    pub inventory: i64,

    #[schema(value_type = Object)]
    pub custom_fields: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "must_be_non_negative"))]
    pub price: Option<f64>,
    #[validate(length(min = 1, message = "required"))]
    pub category: Option<String>,
    #[schema(value_type = Object)]
    pub custom_fields: Option<Map<String, Value>>,
}

/// Delta assinado: positivo repõe, negativo baixa. O resultado nunca
/// pode ficar negativo.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustInventoryPayload {
    #[schema(example = -3)]
    pub delta: i64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanPayload {
    pub location: Option<ScanLocation>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkImportPayload {
    pub products: Vec<BulkProductRecord>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Trecho de nome ou descrição (case-insensitive)
    pub query: Option<String>,
    /// Categoria exata
    pub category: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Produtos",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado sem QR code e sem scans", body = Product),
        (status = 400, description = "Dados inválidos")
    ),
    security(("caller_identity" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .product_service
        .create(
            payload.name,
            payload.description,
            payload.price,
            payload.category,
            payload.inventory,
            payload.custom_fields,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Produtos",
    params(PageQuery),
    responses(
        (status = 200, description = "Página de produtos em ordem de criação", body = Page<Product>)
    ),
    security(("caller_identity" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .product_service
        .list(query.page, query.limit)
        .await?;
    Ok((StatusCode::OK, Json(page)))
}

// GET /api/products/search
#[utoipa::path(
    get,
    path = "/api/products/search",
    tag = "Produtos",
    params(SearchQuery),
    responses(
        (status = 200, description = "Produtos filtrados por texto e/ou categoria", body = Page<Product>)
    ),
    security(("caller_identity" = []))
)]
pub async fn search_products(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .product_service
        .search(query.query, query.category, query.page, query.limit)
        .await?;
    Ok((StatusCode::OK, Json(page)))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Produtos",
    params(("id" = String, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto encontrado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("caller_identity" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.get(&id).await?;
    Ok((StatusCode::OK, Json(product)))
}

// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Produtos",
    params(("id" = String, Path, description = "ID do produto")),
    request_body = UpdateProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("caller_identity" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .product_service
        .update(
            &id,
            payload.name,
            payload.description,
            payload.price,
            payload.category,
            payload.custom_fields,
        )
        .await?;

    Ok((StatusCode::OK, Json(product)))
}

// DELETE /api/products/{id} (somente admin)
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Produtos",
    params(("id" = String, Path, description = "ID do produto")),
    responses(
        (status = 204, description = "Produto removido"),
        (status = 403, description = "Requer papel de administrador"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("caller_identity" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    AdminCaller(_admin): AdminCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.product_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/products/{id}/qr
#[utoipa::path(
    get,
    path = "/api/products/{id}/qr",
    tag = "Produtos",
    params(("id" = String, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "QR code do produto como data URL PNG", body = QrCodePayload),
        (status = 404, description = "Produto não encontrado"),
        (status = 409, description = "Código já pertence a outro produto")
    ),
    security(("caller_identity" = []))
)]
pub async fn generate_product_qr(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let payload = app_state.product_service.generate_code(&id).await?;
    Ok((StatusCode::OK, Json(payload)))
}

// PUT /api/products/{id}/inventory
#[utoipa::path(
    put,
    path = "/api/products/{id}/inventory",
    tag = "Produtos",
    params(("id" = String, Path, description = "ID do produto")),
    request_body = AdjustInventoryPayload,
    responses(
        (status = 200, description = "Estoque ajustado atomicamente", body = Product),
        (status = 400, description = "O ajuste deixaria o estoque negativo"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("caller_identity" = []))
)]
pub async fn adjust_product_inventory(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AdjustInventoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .product_service
        .adjust_inventory(&id, payload.delta)
        .await?;
    Ok((StatusCode::OK, Json(product)))
}

// POST /api/products/scan/{id} — rota PÚBLICA: o QR impresso precisa
// funcionar para qualquer pessoa com uma câmera. Corpo opcional.
#[utoipa::path(
    post,
    path = "/api/products/scan/{id}",
    tag = "Produtos",
    params(("id" = String, Path, description = "ID do produto embutido no QR code")),
    request_body(content = ScanPayload, description = "Localização opcional do scan"),
    responses(
        (status = 200, description = "Scan registrado; só os campos públicos do produto", body = ScanAck),
        (status = 400, description = "Coordenadas inválidas"),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn record_product_scan(
    State(app_state): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
    Path(id): Path<String>,
    payload: Option<Json<ScanPayload>>,
) -> Result<impl IntoResponse, AppError> {
    let location = payload.and_then(|Json(p)| p.location);

    let ack = app_state
        .product_service
        .record_scan(&id, location, caller)
        .await?;

    Ok((StatusCode::OK, Json(ack)))
}

// POST /api/products/bulk-import (somente admin)
#[utoipa::path(
    post,
    path = "/api/products/bulk-import",
    tag = "Produtos",
    request_body = BulkImportPayload,
    responses(
        (status = 201, description = "Todos os produtos criados", body = Vec<Product>),
        (status = 400, description = "Linhas inválidas; nada foi gravado"),
        (status = 403, description = "Requer papel de administrador")
    ),
    security(("caller_identity" = []))
)]
pub async fn bulk_import_products(
    State(app_state): State<AppState>,
    AdminCaller(_admin): AdminCaller,
    Json(payload): Json<BulkImportPayload>,
) -> Result<impl IntoResponse, AppError> {
    let created = app_state.product_service.bulk_import(payload.products).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
