use crate::service::storage_service::StorageError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("retry is not allowed for this payment")]
    RetryNotAllowed,

    #[error("retry limit exceeded: retry_count={retry_count}, max_retries={max_retries}")]
    RetryLimitExceeded { retry_count: u32, max_retries: u32 },

    #[error("retry requested too soon: next retry allowed after {next_retry_after}")]
    RetryTooSoon { next_retry_after: i64 },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage failure: {0}")]
    StorageFatal(String),

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl CoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::RetryNotAllowed => "RETRY_NOT_ALLOWED",
            Self::RetryLimitExceeded { .. } => "RETRY_LIMIT_EXCEEDED",
            Self::RetryTooSoon { .. } => "RETRY_TOO_SOON",
            Self::Conflict(_) => "CONFLICT",
            Self::StorageFatal(_) => "STORAGE_FAILURE",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::Duplicate(what) => Self::Conflict(format!("duplicate record: {what}")),
            StoreError::Conflict(what) => Self::Conflict(what),
            StoreError::Backend(msg) => Self::Persistence(msg),
        }
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        Self::StorageFatal(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
