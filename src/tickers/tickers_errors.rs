use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for ticker catalog operations
#[derive(Debug, Error)]
pub enum TickerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
}

impl From<DieselError> for TickerError {
    fn from(err: DieselError) -> Self {
        TickerError::DatabaseError(err.to_string())
    }
}

/// Result type for ticker operations
pub type Result<T> = std::result::Result<T, TickerError>;
