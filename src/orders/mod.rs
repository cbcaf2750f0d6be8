// Module declarations
pub(crate) mod orders_errors;
pub(crate) mod orders_import;
pub(crate) mod orders_model;
pub(crate) mod orders_repository;
pub(crate) mod orders_service;
pub(crate) mod orders_traits;

// Re-export the public interface
pub use orders_import::{OrderImportError, OrderImportResult, OrderImportRow};
pub use orders_model::{NewOrder, Order, OrderDB, OrderRecord, OrderSide, OrderUpdate, OrderView};
pub use orders_repository::OrderRepository;
pub use orders_service::OrderService;
pub use orders_traits::{OrderRepositoryTrait, OrderServiceTrait};

// Re-export error types for convenience
pub use orders_errors::OrderError;
