//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::env;
use tokio::net::TcpListener;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::middleware::auth::caller_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let lead_routes = Router::new()
        .route("/"
               ,post(handlers::leads::create_lead)
               .get(handlers::leads::list_leads)
        )
        .route("/unreconciled"
               ,get(handlers::leads::list_unreconciled_leads)
        )
        .route("/status/{status}"
               ,get(handlers::leads::list_leads_by_status)
        )
        .route("/{id}"
               ,get(handlers::leads::get_lead)
               .put(handlers::leads::update_lead)
               .delete(handlers::leads::delete_lead)
        )
        .route("/{id}/status"
               ,put(handlers::leads::update_lead_status)
        )
        .route("/{id}/convert"
               ,post(handlers::leads::convert_lead)
        )

        .layer(axum_middleware::from_fn(caller_guard));

    let product_routes = Router::new()
        .route("/"
               ,post(handlers::products::create_product)
               .get(handlers::products::list_products)
        )
        .route("/search"
               ,get(handlers::products::search_products)
        )
        .route("/bulk-import"
               ,post(handlers::products::bulk_import_products)
        )
        .route("/{id}"
               ,get(handlers::products::get_product)
               .put(handlers::products::update_product)
               .delete(handlers::products::delete_product)
        )
        .route("/{id}/qr"
               ,get(handlers::products::generate_product_qr)
        )
        .route("/{id}/inventory"
               ,put(handlers::products::adjust_product_inventory)
        )

        .layer(axum_middleware::from_fn(caller_guard))

        // Rota PÚBLICA, fora do guard: o QR impresso precisa funcionar
        // para qualquer pessoa com uma câmera
        .route("/scan/{id}"
               ,post(handlers::products::record_product_scan)
        );

    let customer_routes = Router::new()
        .route("/"
               ,post(handlers::customers::create_customer)
               .get(handlers::customers::list_customers)
        )
        .route("/{id}"
               ,get(handlers::customers::get_customer)
        )
        .route("/{id}/notes"
               ,post(handlers::customers::add_customer_note)
        )

        .layer(axum_middleware::from_fn(caller_guard));

    let dashboard_routes = Router::new()
        .route("/stats", get(handlers::dashboard::get_dashboard_stats))
        .route("/charts", get(handlers::dashboard::get_dashboard_charts))

        .layer(axum_middleware::from_fn(caller_guard));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/docs/openapi.json", get(docs::openapi_json))
        .nest("/api/leads", lead_routes)
        .nest("/api/products", product_routes)
        .nest("/api/customers", customer_routes)
        .nest("/api/dashboard", dashboard_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
