pub mod error;

use error::AppError;

/// Normaliza os parâmetros de paginação da query string.
/// Padrões: página 1, 10 itens; teto de 100 itens por página.
/// Devolve (page, limit, offset).
pub fn page_params(page: Option<u32>, limit: Option<u32>) -> Result<(u32, u32, u32), AppError> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(10);

    if page == 0 {
        return Err(AppError::InvalidInput(
            "O parâmetro 'page' deve ser maior ou igual a 1.".to_string(),
        ));
    }
    if limit == 0 || limit > 100 {
        return Err(AppError::InvalidInput(
            "O parâmetro 'limit' deve estar entre 1 e 100.".to_string(),
        ));
    }

    Ok((page, limit, (page - 1) * limit))
}
