// Error handling utilities

use thiserror::Error;

use crate::data::DataError;
use crate::processing::ProcessingError;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("processing error: {0}")]
    Processing(#[from] ProcessingError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

/// Result type alias for AppError.
pub type AppResult<T> = Result<T, AppError>;
