// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use crate::common;
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Leads ---
        handlers::leads::create_lead,
        handlers::leads::list_leads,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::delete_lead,
        handlers::leads::update_lead_status,
        handlers::leads::list_leads_by_status,
        handlers::leads::convert_lead,
        handlers::leads::list_unreconciled_leads,

        // --- Produtos ---
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::search_products,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::generate_product_qr,
        handlers::products::adjust_product_inventory,
        handlers::products::record_product_scan,
        handlers::products::bulk_import_products,

        // --- Clientes ---
        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::add_customer_note,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard_stats,
        handlers::dashboard::get_dashboard_charts,
    ),
    components(
        schemas(
            // --- Leads ---
            models::lead::LeadStatus,
            models::lead::Lead,
            models::lead::ConversionLogEntry,
            handlers::leads::CreateLeadPayload,
            handlers::leads::UpdateLeadPayload,
            handlers::leads::UpdateLeadStatusPayload,
            handlers::leads::ConvertLeadPayload,

            // --- Produtos ---
            models::product::Product,
            models::product::ProductSummary,
            models::product::ScanLocation,
            models::product::ScanEvent,
            models::product::ScanAck,
            models::product::QrCodePayload,
            handlers::products::CreateProductPayload,
            handlers::products::UpdateProductPayload,
            handlers::products::AdjustInventoryPayload,
            handlers::products::ScanPayload,
            handlers::products::BulkImportPayload,
            services::product_service::BulkProductRecord,

            // --- Clientes ---
            models::customer::Address,
            models::customer::AddressInput,
            models::customer::CustomerNote,
            models::customer::Customer,
            handlers::customers::CreateCustomerPayload,
            handlers::customers::AddNotePayload,

            // --- Dashboard ---
            models::dashboard::DashboardStats,
            models::dashboard::TrendPoint,
            models::dashboard::DistributionEntry,
            models::dashboard::ProductPerformanceEntry,
            models::dashboard::DashboardCharts,

            // --- Erros ---
            common::error::BulkRowError,
        )
    ),
    tags(
        (name = "Leads", description = "Pipeline de leads e conversão em cliente"),
        (name = "Produtos", description = "Catálogo, QR codes, scans e estoque"),
        (name = "Clientes", description = "Cadastro de clientes e notas de relacionamento"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        // A borda autentica e repassa a identidade neste header
        components.add_security_scheme(
            "caller_identity",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-user-id"))),
        );
    }
}

// GET /api/docs/openapi.json
pub async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(ApiDoc::openapi())
}
