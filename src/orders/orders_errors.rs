use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for order-related operations
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Import error: {0}")]
    ImportError(String),
}

impl From<DieselError> for OrderError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => OrderError::NotFound("Record not found".to_string()),
            _ => OrderError::DatabaseError(err.to_string()),
        }
    }
}

/// Result type for order operations
pub type Result<T> = std::result::Result<T, OrderError>;
