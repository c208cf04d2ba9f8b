pub mod customers;
pub mod dashboard;
pub mod leads;
pub mod products;

use serde::Deserialize;
use utoipa::IntoParams;

/// Parâmetros de paginação comuns (?page=1&limit=10)
#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
