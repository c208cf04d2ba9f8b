// src/models/lead.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::common::error::AppError;

// --- STATUS DO PIPELINE ---

// Gravado como TEXT no banco, com o nome da variante (New, InProgress, Converted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum LeadStatus {
    New,
    InProgress,
    Converted,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::InProgress => "InProgress",
            LeadStatus::Converted => "Converted",
        }
    }

    /// Converte a string vinda da API. Qualquer valor fora do pipeline
    /// é erro de validação, nunca um status novo.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "New" => Ok(LeadStatus::New),
            "InProgress" => Ok(LeadStatus::InProgress),
            "Converted" => Ok(LeadStatus::Converted),
            other => Err(AppError::InvalidInput(format!(
                "Status de lead desconhecido: '{}'. Valores aceitos: New, InProgress, Converted.",
                other
            ))),
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- MÁQUINA DE ESTADOS ---

/// Tabela de transições permitidas do pipeline. Hoje TODAS as arestas são
/// permitidas, inclusive voltar de Converted para New/InProgress mesmo com
/// um Customer já criado pela conversão.
///
/// ATENÇÃO: as arestas saindo de Converted são uma decisão de produto ainda
/// pendente. Quando for decidido travar o estado terminal, basta remover as
/// três últimas linhas desta tabela.
pub const ALLOWED_TRANSITIONS: &[(LeadStatus, LeadStatus)] = &[
    (LeadStatus::New, LeadStatus::New),
    (LeadStatus::New, LeadStatus::InProgress),
    (LeadStatus::New, LeadStatus::Converted),
    (LeadStatus::InProgress, LeadStatus::New),
    (LeadStatus::InProgress, LeadStatus::InProgress),
    (LeadStatus::InProgress, LeadStatus::Converted),
    (LeadStatus::Converted, LeadStatus::Converted),
    (LeadStatus::Converted, LeadStatus::New),
    (LeadStatus::Converted, LeadStatus::InProgress),
];

pub fn transition_allowed(from: LeadStatus, to: LeadStatus) -> bool {
    ALLOWED_TRANSITIONS
        .iter()
        .any(|&(f, t)| f == from && t == to)
}

// --- LEAD ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,

    // Canal de origem (texto livre: "Website", "Indicação"...)
    pub source: String,

    pub status: LeadStatus,

    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

// --- LOG DE CONVERSÃO (as duas fases) ---

// A conversão grava aqui antes de criar o Customer. customer_id nulo
// significa que a segunda fase não concluiu (janela de reconciliação).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionLogEntry {
    pub id: String,
    pub lead_id: String,
    pub customer_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejeita_status_desconhecido() {
        assert!(LeadStatus::parse("New").is_ok());
        assert!(LeadStatus::parse("InProgress").is_ok());
        assert!(LeadStatus::parse("Converted").is_ok());
        assert!(matches!(
            LeadStatus::parse("Qualified"),
            Err(AppError::InvalidInput(_))
        ));
        // Sensível a maiúsculas de propósito
        assert!(LeadStatus::parse("new").is_err());
    }

    #[test]
    fn tabela_cobre_todas_as_arestas() {
        // Comportamento permissivo atual: qualquer status alcança qualquer outro
        for &from in &[LeadStatus::New, LeadStatus::InProgress, LeadStatus::Converted] {
            for &to in &[LeadStatus::New, LeadStatus::InProgress, LeadStatus::Converted] {
                assert!(transition_allowed(from, to), "{from} -> {to} deveria ser permitido");
            }
        }
    }
}
