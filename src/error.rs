//! HTTP-facing error type. Every handler returns `Result<_, ApiError>`; the
//! `ResponseError` impl turns it into the JSON [`ErrorResponse`] body.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::db::StoreError;
use crate::dispatch::DispatchError;
use crate::validation::FieldError;
use crate::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {} invalid field(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// Message is safe to show; the underlying cause is logged where it happened.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => "BadRequest",
            Self::Unauthorized(_) => "Unauthorized",
            Self::Forbidden(_) => "Forbidden",
            Self::NotFound(_) => "NotFound",
            Self::Conflict(_) => "Conflict",
            Self::Internal(_) => "InternalServerError",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::Validation(fields) => {
                ErrorResponse::new(self.kind(), &self.to_string()).with_details(fields.clone())
            }
            _ => ErrorResponse::new(self.kind(), &self.to_string()),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(message) => Self::Conflict(message),
            other => {
                log::error!("Store error: {}", other);
                Self::Internal("Database operation failed".to_string())
            }
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::InvalidRecipient(_) => Self::BadRequest(error.to_string()),
            DispatchError::Rasterize(e) => {
                log::error!("PDF generation failed: {}", e);
                Self::Internal("Error generating PDF".to_string())
            }
            DispatchError::Mail(e) => {
                log::error!("Mail delivery failed: {}", e);
                Self::Internal("Error sending email".to_string())
            }
        }
    }
}
