pub mod customer;
pub mod dashboard;
pub mod lead;
pub mod product;

use serde::Serialize;
use utoipa::ToSchema;

/// Página de resultados com contagem total.
/// A ordenação por (created_at, id) nos repositórios mantém a
/// paginação estável entre chamadas.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_count: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: u32, page_size: u32) -> Self {
        let page_count = if total == 0 {
            0
        } else {
            ((total as u64).div_ceil(page_size as u64)) as u32
        };
        Self {
            items,
            total,
            page,
            page_count,
        }
    }
}
