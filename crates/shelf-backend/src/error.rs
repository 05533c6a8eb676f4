use shelf_types::{AuthErrorCode, BookValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Auth(#[from] AuthErrorCode),

    #[error(transparent)]
    Validation(#[from] BookValidationError),

    #[error("book {0} not found")]
    NotFound(String),

    #[error("permission denied")]
    PermissionDenied,

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BackendError>;
