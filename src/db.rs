pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
