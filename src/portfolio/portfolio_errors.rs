use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::accounts::AccountError;

/// Custom error type for valuation and history operations
#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Import error: {0}")]
    ImportError(String),
}

impl From<DieselError> for PortfolioError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => PortfolioError::NotFound("Record not found".to_string()),
            _ => PortfolioError::DatabaseError(err.to_string()),
        }
    }
}

impl From<AccountError> for PortfolioError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(msg) => PortfolioError::NotFound(msg),
            AccountError::InvalidData(msg) => PortfolioError::InvalidData(msg),
            AccountError::DatabaseError(msg) => PortfolioError::DatabaseError(msg),
        }
    }
}

/// Result type for portfolio operations
pub type Result<T> = std::result::Result<T, PortfolioError>;
