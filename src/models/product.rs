// src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;

// --- GEOLOCALIZAÇÃO DO SCAN ---

// Coordenada opaca + precisão. Só a forma é validada (números, precisão
// não-negativa); plausibilidade geográfica não é problema nosso.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

// --- EVENTO DE SCAN (append-only) ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ScanLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanned_by: Option<String>,
}

// --- PRODUTO ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,

    pub price: f64,
    pub category: String,

    // Nunca fica negativo; o ajuste é atômico no banco.
    pub inventory: i64,

    // Data URL do PNG. Nulo até a primeira geração; único quando presente.
    pub qr_code: Option<String>,

    // Mapa ordenado de valores livres (chave string)
    #[schema(value_type = Object)]
    pub custom_fields: Json<Map<String, Value>>,

    #[schema(value_type = Vec<ScanEvent>)]
    pub scan_history: Json<Vec<ScanEvent>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- RESPOSTAS DO TRACKER ---

/// Campos públicos do produto devolvidos a quem escaneou o código.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanAck {
    pub product: ProductSummary,
    pub scanned_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QrCodePayload {
    pub qr_code: String,
}
