use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

/// Erro de uma linha rejeitada na importação em massa.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkRowError {
    pub index: usize,
    pub field: String,
    pub reason: String,
}

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Entrada malformada detectada pelo domínio (status desconhecido,
    // estoque que ficaria negativo, campo obrigatório ausente...)
    #[error("{0}")]
    InvalidInput(String),

    #[error("Importação em massa rejeitada")]
    BulkImportError(Vec<BulkRowError>),

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    // Violação de unicidade: QR code duplicado, e-mail de cliente repetido,
    // lead já convertido.
    #[error("{0}")]
    Conflict(String),

    #[error("Identidade do chamador ausente")]
    MissingIdentity,

    #[error("Operação restrita a administradores")]
    AdminOnly,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // Lista índice e motivo de cada linha rejeitada; nada foi gravado.
            AppError::BulkImportError(rows) => {
                let body = Json(json!({
                    "error": "Um ou mais registros da importação são inválidos.",
                    "rows": rows,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::InvalidInput(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(entity) => {
                (StatusCode::NOT_FOUND, format!("{} não encontrado.", entity))
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::MissingIdentity => (
                StatusCode::UNAUTHORIZED,
                "Identidade do chamador ausente (header x-user-id).".to_string(),
            ),
            AppError::AdminOnly => (
                StatusCode::FORBIDDEN,
                "Operação restrita a administradores.".to_string(),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
