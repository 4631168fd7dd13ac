//! Error types for Bookstock server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Numeric error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    InvalidIdentifier = 2,
    NoSuchBook = 3,
    OutOfStock = 4,
    StoreUnavailable = 5,
    TransactionFailed = 6,
    BadValue = 7,
    DbFailure = 8,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Out of stock: {0}")]
    OutOfStock(String),

    /// The store could not be reached or no connection could be acquired.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Commit failed; the transaction has been rolled back.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the caller may retry the same operation later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::StoreUnavailable(_) | AppError::TransactionFailed(_)
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidIdentifier(_) => ErrorCode::InvalidIdentifier,
            AppError::NotFound(_) => ErrorCode::NoSuchBook,
            AppError::OutOfStock(_) => ErrorCode::OutOfStock,
            AppError::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
            AppError::TransactionFailed(_) => ErrorCode::TransactionFailed,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidIdentifier(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::OutOfStock(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) | AppError::TransactionFailed(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = self.status();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::StoreUnavailable(msg) | AppError::TransactionFailed(msg) => {
                tracing::warn!("{:?}: {}", code, msg);
                self.to_string()
            }
            AppError::InvalidIdentifier(msg)
            | AppError::NotFound(msg)
            | AppError::OutOfStock(msg)
            | AppError::Validation(msg) => msg.clone(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
