// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::common::error::AppError;

// A autenticação em si é uma capacidade externa: a borda valida a sessão
// e repassa a identidade (e o papel) nestes headers.
const USER_HEADER: &str = "x-user-id";
const ADMIN_HEADER: &str = "x-admin-role";

/// Identidade do chamador autenticado, usada para atribuição
/// (scannedBy, createdBy).
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub String);

fn identity_from_parts(parts: &Parts) -> Option<String> {
    // Extensão primeiro (rotas atrás do caller_guard); header direto depois
    if let Some(CallerIdentity(id)) = parts.extensions.get::<CallerIdentity>() {
        return Some(id.clone());
    }
    parts
        .headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

// O middleware em si
pub async fn caller_guard(mut request: Request, next: Next) -> Result<Response, AppError> {
    let identity = request
        .headers()
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    match identity {
        Some(id) => {
            // Insere a identidade nos "extensions" da requisição
            request.extensions_mut().insert(CallerIdentity(id));
            Ok(next.run(request).await)
        }
        None => Err(AppError::MissingIdentity),
    }
}

// Extrator para obter o chamador diretamente nos handlers
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_parts(parts)
            .map(CallerIdentity)
            .ok_or(AppError::MissingIdentity)
    }
}

/// Chamador opcional: a rota pública de scan registra scannedBy apenas
/// quando o header está presente.
pub struct MaybeCaller(pub Option<String>);

impl<S> FromRequestParts<S> for MaybeCaller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeCaller(identity_from_parts(parts)))
    }
}

/// Chamador com papel de administrador (também repassado pela borda).
pub struct AdminCaller(pub String);

impl<S> FromRequestParts<S> for AdminCaller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = identity_from_parts(parts).ok_or(AppError::MissingIdentity)?;

        let is_admin = parts
            .headers
            .get(ADMIN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.eq_ignore_ascii_case("admin"))
            .unwrap_or(false);

        if is_admin {
            Ok(AdminCaller(identity))
        } else {
            Err(AppError::AdminOnly)
        }
    }
}
