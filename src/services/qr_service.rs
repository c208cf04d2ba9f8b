// src/services/qr_service.rs

use anyhow::anyhow;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::Luma;
use qrcode::QrCode;

use crate::common::error::AppError;

/// Gerador do identificador escaneável do produto.
///
/// O código carrega um localizador estável (a URL de scan que resolve de
/// volta para o id do produto) e é devolvido como PNG em data URL, pronto
/// para imprimir ou exibir.
#[derive(Clone)]
pub struct QrService {
    base_url: String,
}

impl QrService {
    pub fn new(base_url: String) -> Self {
        // Sem barra final para o join do localizador ficar previsível
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// O localizador que o código carrega. Escanear e dereferenciar essa
    /// URL leva de volta a exatamente um produto.
    pub fn scan_locator(&self, product_id: &str) -> String {
        format!("{}/products/scan/{}", self.base_url, product_id)
    }

    /// Codifica o localizador num PNG e devolve como data URL.
    pub fn encode(&self, locator: &str) -> Result<String, AppError> {
        let code = QrCode::new(locator.as_bytes())
            .map_err(|e| anyhow!("Falha ao montar o QR code: {}", e))?;

        let rendered = code.render::<Luma<u8>>().min_dimensions(256, 256).build();

        let mut png: Vec<u8> = Vec::new();
        image::DynamicImage::ImageLuma8(rendered)
            .write_to(&mut png, image::ImageOutputFormat::Png)
            .map_err(|e| anyhow!("Falha ao codificar o PNG do QR code: {}", e))?;

        Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localizador_resolve_para_o_produto() {
        let qr = QrService::new("http://localhost:3000/".to_string());
        assert_eq!(
            qr.scan_locator("abc-123"),
            "http://localhost:3000/products/scan/abc-123"
        );
    }

    #[test]
    fn payload_e_data_url_png() {
        let qr = QrService::new("http://localhost:3000".to_string());
        let locator = qr.scan_locator("abc-123");
        let payload = qr.encode(&locator).unwrap();
        assert!(payload.starts_with("data:image/png;base64,"));

        // Localizadores distintos geram payloads distintos
        let other = qr.encode(&qr.scan_locator("def-456")).unwrap();
        assert_ne!(payload, other);
    }
}
