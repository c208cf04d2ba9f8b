pub mod customer_service;
pub use customer_service::CustomerService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod lead_service;
pub use lead_service::LeadService;
pub mod product_service;
pub use product_service::ProductService;
pub mod qr_service;
pub use qr_service::QrService;
