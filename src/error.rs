use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::bridge::BridgeError;
use crate::utils::error_codes;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("too many bridge tokens created, retry in {retry_after}s")]
    RateLimitExceeded { retry_after: u64 },
    #[error("bridge token is invalid or expired")]
    InvalidOrExpiredToken,
    #[error("too many failed attempts, retry in {retry_after}s")]
    TooManyFailedAttempts { retry_after: u64 },
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    code: i32,
    error: &'static str,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimitExceeded { .. } | AppError::TooManyFailedAttempts { .. } => {
                StatusCode::TOO_MANY_REQUESTS
            }
            AppError::InvalidOrExpiredToken => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 稳定的机器可读错误码
    pub fn kind(&self) -> (i32, &'static str) {
        match self {
            AppError::Validation(_) => (error_codes::VALIDATION_ERROR, "VALIDATION_ERROR"),
            AppError::RateLimitExceeded { .. } => (error_codes::RATE_LIMIT, "RATE_LIMIT_EXCEEDED"),
            AppError::InvalidOrExpiredToken => {
                (error_codes::INVALID_TOKEN, "INVALID_OR_EXPIRED_TOKEN")
            }
            AppError::TooManyFailedAttempts { .. } => {
                (error_codes::TOO_MANY_ATTEMPTS, "TOO_MANY_FAILED_ATTEMPTS")
            }
            AppError::Internal(_) => (error_codes::INTERNAL_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn retry_after(&self) -> Option<u64> {
        match self {
            AppError::RateLimitExceeded { retry_after }
            | AppError::TooManyFailedAttempts { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl From<BridgeError> for AppError {
    fn from(e: BridgeError) -> Self {
        match e {
            BridgeError::MissingField(field) => {
                AppError::Validation(format!("Missing required field: {}", field))
            }
            BridgeError::RateLimitExceeded { retry_after } => {
                AppError::RateLimitExceeded { retry_after }
            }
            BridgeError::InvalidOrExpiredToken => AppError::InvalidOrExpiredToken,
            BridgeError::TooManyFailedAttempts { retry_after } => {
                AppError::TooManyFailedAttempts { retry_after }
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, error) = self.kind();
        let retry_after = self.retry_after();

        let body = Json(ErrorResponse {
            success: false,
            code,
            error,
            message: self.to_string(),
        });

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
