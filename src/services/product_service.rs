// src/services/product_service.rs

use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    common::{
        error::{AppError, BulkRowError},
        page_params,
    },
    db::ProductRepository,
    models::{
        product::{Product, QrCodePayload, ScanAck, ScanEvent, ScanLocation},
        Page,
    },
    services::QrService,
};

/// Linha crua da importação em massa. Campos opcionais de propósito: a
/// validação aponta índice e motivo em vez de rejeitar o JSON inteiro.
#[derive(Debug, Clone, Default, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkProductRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub inventory: Option<i64>,
    #[schema(value_type = Object)]
    pub custom_fields: Option<Map<String, Value>>,
}

#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepository,
    qr: QrService,
}

impl ProductService {
    pub fn new(repo: ProductRepository, qr: QrService) -> Self {
        Self { repo, qr }
    }

    fn build_product(
        name: String,
        description: String,
        price: f64,
        category: String,
        inventory: i64,
        custom_fields: Option<Map<String, Value>>,
    ) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            price,
            category,
            inventory,
            qr_code: None,
            custom_fields: Json(custom_fields.unwrap_or_default()),
            scan_history: Json(Vec::new()),
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn create(
        &self,
        name: String,
        description: String,
        price: f64,
        category: String,
        inventory: i64,
        custom_fields: Option<Map<String, Value>>,
    ) -> Result<Product, AppError> {
        let product =
            Self::build_product(name, description, price, category, inventory, custom_fields);
        self.repo.create(&product).await
    }

    pub async fn get(&self, id: &str) -> Result<Product, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Produto"))
    }

    pub async fn list(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Page<Product>, AppError> {
        let (page, limit, offset) = page_params(page, limit)?;
        let items = self.repo.list(limit, offset).await?;
        let total = self.repo.count().await?;
        Ok(Page::new(items, total, page, limit))
    }

    pub async fn search(
        &self,
        term: Option<String>,
        category: Option<String>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Page<Product>, AppError> {
        let (page, limit, offset) = page_params(page, limit)?;
        let term = term.filter(|t| !t.trim().is_empty());
        let category = category.filter(|c| !c.trim().is_empty());

        let items = self
            .repo
            .search(term.as_deref(), category.as_deref(), limit, offset)
            .await?;
        let total = self
            .repo
            .count_search(term.as_deref(), category.as_deref())
            .await?;
        Ok(Page::new(items, total, page, limit))
    }

    /// Atualiza dados cadastrais; estoque e QR code têm operações próprias.
    pub async fn update(
        &self,
        id: &str,
        name: Option<String>,
        description: Option<String>,
        price: Option<f64>,
        category: Option<String>,
        custom_fields: Option<Map<String, Value>>,
    ) -> Result<Product, AppError> {
        let current = self.get(id).await?;

        let price = price.unwrap_or(current.price);
        if price < 0.0 || !price.is_finite() {
            return Err(AppError::InvalidInput(
                "O preço não pode ser negativo.".to_string(),
            ));
        }

        self.repo
            .update_info(
                id,
                &name.unwrap_or(current.name),
                &description.unwrap_or(current.description),
                price,
                &category.unwrap_or(current.category),
                &custom_fields.map(Json).unwrap_or(current.custom_fields),
                Utc::now(),
            )
            .await?
            .ok_or(AppError::NotFound("Produto"))
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Produto"))
        }
    }

    // =========================================================================
    //  IDENTIDADE (QR CODE)
    // =========================================================================

    /// Gera e persiste o código escaneável do produto.
    ///
    /// O código é a única ponte entre um scan físico e um produto, então a
    /// unicidade é re-verificada imediatamente antes de gravar: se OUTRO
    /// produto já detém um valor idêntico, falha com conflito em vez de
    /// sobrescrever. O índice UNIQUE cobre a corrida residual.
    pub async fn generate_code(&self, product_id: &str) -> Result<QrCodePayload, AppError> {
        let product = self.get(product_id).await?;

        let locator = self.qr.scan_locator(&product.id);
        let payload = self.qr.encode(&locator)?;

        if let Some(owner_id) = self.repo.find_id_by_qr(&payload).await? {
            if owner_id != product.id {
                return Err(AppError::Conflict(
                    "Já existe outro produto com este QR code.".to_string(),
                ));
            }
        }

        self.repo
            .set_qr_code(&product.id, &payload, Utc::now())
            .await?
            .ok_or(AppError::NotFound("Produto"))?;

        Ok(QrCodePayload { qr_code: payload })
    }

    // =========================================================================
    //  SCANS
    // =========================================================================

    /// Registra um scan: acrescenta {timestamp, location?, scannedBy?} ao
    /// histórico e devolve só os campos públicos do produto. Não toca em
    /// estoque nem em qualquer outro campo.
    pub async fn record_scan(
        &self,
        product_id: &str,
        location: Option<ScanLocation>,
        scanned_by: Option<String>,
    ) -> Result<ScanAck, AppError> {
        // Validação estrutural apenas; plausibilidade geográfica não
        if let Some(loc) = &location {
            if !loc.latitude.is_finite() || !loc.longitude.is_finite() {
                return Err(AppError::InvalidInput(
                    "Latitude e longitude devem ser números finitos.".to_string(),
                ));
            }
            if let Some(accuracy) = loc.accuracy {
                if !accuracy.is_finite() || accuracy < 0.0 {
                    return Err(AppError::InvalidInput(
                        "A precisão (accuracy) não pode ser negativa.".to_string(),
                    ));
                }
            }
        }

        let product = self.get(product_id).await?;

        let now = Utc::now();
        let event = ScanEvent {
            timestamp: now,
            location,
            scanned_by,
        };
        self.repo.append_scan(&product.id, &event, now).await?;

        Ok(ScanAck {
            product: (&product).into(),
            scanned_at: now,
        })
    }

    // =========================================================================
    //  ESTOQUE
    // =========================================================================

    /// Aplica `inventory += delta` atomicamente no banco. Se o resultado
    /// ficasse negativo, falha e o estoque permanece exatamente como estava.
    pub async fn adjust_inventory(&self, id: &str, delta: i64) -> Result<Product, AppError> {
        match self.repo.adjust_inventory(id, delta, Utc::now()).await? {
            Some(product) => Ok(product),
            // A linha não mudou: ou o produto não existe, ou o delta
            // deixaria o estoque negativo
            None => {
                if self.repo.find_by_id(id).await?.is_some() {
                    Err(AppError::InvalidInput(
                        "O ajuste deixaria o estoque negativo; nada foi alterado.".to_string(),
                    ))
                } else {
                    Err(AppError::NotFound("Produto"))
                }
            }
        }
    }

    // =========================================================================
    //  IMPORTAÇÃO EM MASSA
    // =========================================================================

    /// Valida TODAS as linhas antes de qualquer escrita; com uma linha
    /// ruim, devolve índice e motivo de cada uma e não grava nada.
    pub async fn bulk_import(
        &self,
        records: Vec<BulkProductRecord>,
    ) -> Result<Vec<Product>, AppError> {
        let mut errors: Vec<BulkRowError> = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let mut push = |field: &str, reason: &str| {
                errors.push(BulkRowError {
                    index,
                    field: field.to_string(),
                    reason: reason.to_string(),
                });
            };

            match &record.name {
                Some(n) if !n.trim().is_empty() => {}
                _ => push("name", "obrigatório e não-vazio"),
            }
            match &record.category {
                Some(c) if !c.trim().is_empty() => {}
                _ => push("category", "obrigatório e não-vazio"),
            }
            match record.price {
                Some(p) if p.is_finite() && p >= 0.0 => {}
                Some(_) => push("price", "deve ser um número não-negativo"),
                None => push("price", "obrigatório"),
            }
            match record.inventory {
                Some(i) if i >= 0 => {}
                Some(_) => push("inventory", "deve ser um inteiro não-negativo"),
                None => push("inventory", "obrigatório"),
            }
        }

        if !errors.is_empty() {
            return Err(AppError::BulkImportError(errors));
        }

        let products: Vec<Product> = records
            .into_iter()
            .map(|r| {
                Self::build_product(
                    r.name.unwrap_or_default(),
                    r.description.unwrap_or_default(),
                    r.price.unwrap_or_default(),
                    r.category.unwrap_or_default(),
                    r.inventory.unwrap_or_default(),
                    r.custom_fields,
                )
            })
            .collect();

        let created = self.repo.create_many(&products).await?;
        tracing::info!(count = created.len(), "Importação em massa concluída");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> ProductService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        ProductService::new(
            ProductRepository::new(pool),
            QrService::new("http://localhost:3000".to_string()),
        )
    }

    async fn sample_product(service: &ProductService, name: &str, inventory: i64) -> Product {
        service
            .create(
                name.to_string(),
                "Descrição".to_string(),
                99.9,
                "Eletrônicos".to_string(),
                inventory,
                None,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn qr_code_e_unico_e_estavel() {
        let service = setup().await;
        let a = sample_product(&service, "A", 1).await;
        let b = sample_product(&service, "B", 1).await;

        let code_a = service.generate_code(&a.id).await.unwrap();
        let code_b = service.generate_code(&b.id).await.unwrap();
        assert_ne!(code_a.qr_code, code_b.qr_code);

        // Regenerar o código do mesmo produto não conflita consigo mesmo
        let again = service.generate_code(&a.id).await.unwrap();
        assert_eq!(again.qr_code, code_a.qr_code);

        let err = service.generate_code("nao-existe").await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn colisao_de_qr_falha_sem_sobrescrever() {
        let service = setup().await;
        let a = sample_product(&service, "A", 1).await;
        let b = sample_product(&service, "B", 1).await;

        let code_a = service.generate_code(&a.id).await.unwrap();

        // Força o produto B a deter exatamente o código de A
        let stolen = service
            .repo
            .set_qr_code(&b.id, &code_a.qr_code, Utc::now())
            .await;
        assert!(matches!(stolen, Err(AppError::Conflict(_))));

        // Os códigos anteriores de ambos permanecem intactos
        let a_after = service.get(&a.id).await.unwrap();
        let b_after = service.get(&b.id).await.unwrap();
        assert_eq!(a_after.qr_code, Some(code_a.qr_code));
        assert_eq!(b_after.qr_code, None);
    }

    #[tokio::test]
    async fn scan_e_append_only_com_timestamps_crescentes() {
        let service = setup().await;
        let product = sample_product(&service, "A", 5).await;
        assert!(product.scan_history.0.is_empty());

        let location = ScanLocation {
            latitude: -23.55,
            longitude: -46.63,
            accuracy: Some(12.0),
        };

        for i in 0..3 {
            let ack = service
                .record_scan(
                    &product.id,
                    Some(location.clone()),
                    (i == 0).then(|| "vendedor-1".to_string()),
                )
                .await
                .unwrap();
            assert_eq!(ack.product.id, product.id);
            assert_eq!(ack.product.name, "A");
        }

        let after = service.get(&product.id).await.unwrap();
        let history = &after.scan_history.0;
        assert_eq!(history.len(), 3);
        for pair in history.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        assert_eq!(history[0].scanned_by.as_deref(), Some("vendedor-1"));
        assert!(history[1].scanned_by.is_none());

        // Scan não mexe no estoque
        assert_eq!(after.inventory, 5);

        // Precisão negativa é rejeitada sem gravar nada
        let err = service
            .record_scan(
                &product.id,
                Some(ScanLocation {
                    latitude: 0.0,
                    longitude: 0.0,
                    accuracy: Some(-1.0),
                }),
                None,
            )
            .await;
        assert!(matches!(err, Err(AppError::InvalidInput(_))));
        let unchanged = service.get(&product.id).await.unwrap();
        assert_eq!(unchanged.scan_history.0.len(), 3);
    }

    #[tokio::test]
    async fn ajuste_de_estoque_nunca_fica_negativo() {
        let service = setup().await;
        let product = sample_product(&service, "A", 5).await;

        let zeroed = service.adjust_inventory(&product.id, -5).await.unwrap();
        assert_eq!(zeroed.inventory, 0);

        let err = service.adjust_inventory(&product.id, -1).await;
        assert!(matches!(err, Err(AppError::InvalidInput(_))));
        let unchanged = service.get(&product.id).await.unwrap();
        assert_eq!(unchanged.inventory, 0);

        let err = service.adjust_inventory("nao-existe", 1).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn ajustes_concorrentes_somam_exatamente() {
        let service = setup().await;
        let product = sample_product(&service, "A", 50).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let service = service.clone();
            let id = product.id.clone();
            handles.push(tokio::spawn(
                async move { service.adjust_inventory(&id, -2).await },
            ));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let after = service.get(&product.id).await.unwrap();
        assert_eq!(after.inventory, 50 - 10 * 2);
    }

    #[tokio::test]
    async fn importacao_em_massa_e_tudo_ou_nada() {
        let service = setup().await;

        let bad = vec![
            BulkProductRecord {
                name: Some("OK".into()),
                description: Some("desc".into()),
                price: Some(10.0),
                category: Some("Cat".into()),
                inventory: Some(5),
                custom_fields: None,
            },
            BulkProductRecord {
                name: Some("Ruim".into()),
                price: Some(-1.0),
                category: Some("Cat".into()),
                inventory: Some(5),
                ..Default::default()
            },
        ];

        let err = service.bulk_import(bad).await;
        match err {
            Err(AppError::BulkImportError(rows)) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].index, 1);
                assert_eq!(rows[0].field, "price");
            }
            other => panic!("esperava BulkImportError, veio {other:?}"),
        }

        // Nenhuma escrita parcial: nem a linha válida entrou
        let page = service.list(None, None).await.unwrap();
        assert_eq!(page.total, 0);

        let good = vec![
            BulkProductRecord {
                name: Some("P1".into()),
                price: Some(10.0),
                category: Some("Cat".into()),
                inventory: Some(5),
                ..Default::default()
            },
            BulkProductRecord {
                name: Some("P2".into()),
                price: Some(0.0),
                category: Some("Cat".into()),
                inventory: Some(0),
                ..Default::default()
            },
        ];
        let created = service.bulk_import(good).await.unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(service.list(None, None).await.unwrap().total, 2);
    }

    #[tokio::test]
    async fn busca_filtra_por_texto_e_categoria() {
        let service = setup().await;
        sample_product(&service, "Teclado Mecânico", 3).await;
        sample_product(&service, "Mouse", 7).await;

        let hits = service
            .search(Some("teclado".into()), None, None, None)
            .await
            .unwrap();
        assert_eq!(hits.total, 1);

        let by_category = service
            .search(None, Some("Eletrônicos".into()), None, None)
            .await
            .unwrap();
        assert_eq!(by_category.total, 2);

        let none = service
            .search(None, Some("Vestuário".into()), None, None)
            .await
            .unwrap();
        assert_eq!(none.total, 0);
    }
}
