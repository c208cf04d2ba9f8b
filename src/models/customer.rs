// src/models/customer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// --- ENDEREÇO ---

// Todos os campos são obrigatórios no cadastro de cliente.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[validate(length(min = 1, message = "required"))]
    pub street: String,
    #[validate(length(min = 1, message = "required"))]
    pub city: String,
    #[validate(length(min = 1, message = "required"))]
    pub state: String,
    #[validate(length(min = 1, message = "required"))]
    pub country: String,
    #[validate(length(min = 1, message = "required"))]
    pub postal_code: String,
}

/// Endereço parcial vindo da conversão de lead. A validação acontece só
/// DEPOIS da primeira fase da conversão (o lead já marcado como Converted),
/// então os campos aqui são todos opcionais.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressInput {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

impl AddressInput {
    /// Valida presença e não-vazio de cada campo; devolve os nomes dos
    /// campos ausentes quando incompleto.
    pub fn into_address(self) -> Result<Address, Vec<&'static str>> {
        let mut missing = Vec::new();
        let take = |v: Option<String>, name, missing: &mut Vec<&'static str>| match v {
            Some(s) if !s.trim().is_empty() => s,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let address = Address {
            street: take(self.street, "address.street", &mut missing),
            city: take(self.city, "address.city", &mut missing),
            state: take(self.state, "address.state", &mut missing),
            country: take(self.country, "address.country", &mut missing),
            postal_code: take(self.postal_code, "address.postalCode", &mut missing),
        };

        if missing.is_empty() {
            Ok(address)
        } else {
            Err(missing)
        }
    }
}

// --- NOTAS (append-only) ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerNote {
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

// --- CLIENTE ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,

    pub full_name: String,
    pub company_name: String,

    // Único entre clientes (índice UNIQUE no banco)
    pub email: String,
    pub phone: String,

    // O banco guarda como JSON; o Rust enxerga o tipo forte.
    #[schema(value_type = Address)]
    pub address: Json<Address>,

    // Nunca editadas nem removidas, só acrescentadas.
    #[schema(value_type = Vec<CustomerNote>)]
    pub notes: Json<Vec<CustomerNote>>,

    pub registration_date: DateTime<Utc>,
}
