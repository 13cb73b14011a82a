use crate::error::CoreError;
use axum::http::StatusCode;

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, code, message)
    }

    pub fn forbidden(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::FORBIDDEN, code, message)
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, code, message)
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CONFLICT, code, message)
    }

    pub fn too_many_requests(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::TOO_MANY_REQUESTS, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }

    fn with_status(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let code = err.code();
        let message = err.to_string();
        match err {
            CoreError::Validation(_) => Self::bad_request(code, message),
            CoreError::Unauthorized(_) => Self::unauthorized(code, message),
            CoreError::Forbidden(_) => Self::forbidden(code, message),
            CoreError::NotFound(_) => Self::not_found(code, message),
            CoreError::RetryNotAllowed
            | CoreError::RetryLimitExceeded { .. }
            | CoreError::Conflict(_) => Self::conflict(code, message),
            CoreError::RetryTooSoon { .. } => Self::too_many_requests(code, message),
            CoreError::StorageFatal(_) | CoreError::Persistence(_) => {
                Self::internal(code, message)
            }
        }
    }
}
