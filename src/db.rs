pub mod user_repo;
pub use user_repo::UserRepository;
pub mod config_repo;
pub use config_repo::ConfigRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod transaction_repo;
pub use transaction_repo::TransactionRepository;
pub mod invoice_repo;
pub use invoice_repo::InvoiceRepository;
pub mod scheduled_service_repo;
pub use scheduled_service_repo::ScheduledServiceRepository;
