// Module declarations
pub(crate) mod catalog_provider;
pub(crate) mod tickers_errors;
pub(crate) mod tickers_model;
pub(crate) mod tickers_repository;
pub(crate) mod tickers_service;
pub(crate) mod tickers_traits;

// Re-export the public interface
pub use catalog_provider::ReferenceCatalogProvider;
pub use tickers_model::{NewTicker, Ticker};
pub use tickers_repository::TickerRepository;
pub use tickers_service::TickerService;
pub use tickers_traits::{TickerCatalogProvider, TickerRepositoryTrait, TickerServiceTrait};

// Re-export error types for convenience
pub use tickers_errors::TickerError;
