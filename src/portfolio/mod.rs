// Module declarations
pub(crate) mod history_model;
pub(crate) mod history_repository;
pub(crate) mod history_service;
pub(crate) mod history_traits;
pub(crate) mod portfolio_errors;
pub(crate) mod valuation_calculator;
pub(crate) mod valuation_model;
pub(crate) mod valuation_service;

// Re-export the public interface
pub use history_model::{HistoryImportResult, HistoryPoint};
pub use history_repository::HistoryRepository;
pub use history_service::HistoryService;
pub use history_traits::{HistoryRepositoryTrait, HistoryServiceTrait};
pub use valuation_calculator::{build_account_valuation, build_envelope_valuation};
pub use valuation_model::{
    AccountValuation, EnvelopeValuation, MonetaryValue, PortfolioValuation, PositionValuation,
};
pub use valuation_service::{ValuationService, ValuationServiceTrait};

// Re-export error types for convenience
pub use portfolio_errors::PortfolioError;
