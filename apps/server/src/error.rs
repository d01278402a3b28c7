//! # API Error Types
//!
//! The last stop of the error pipeline: everything the frontend sees.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError / DbError                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (this module) ← status + machine code + message              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { "success": false, "code": "insufficient_stock",                     │
//! │    "message": "Insufficient stock for Coca-Cola 2L: ..." }             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Mapping
//! ```text
//! not found                  → 404
//! conflict (stock, in-flight commit, not reviewed)  → 409
//! bad input (cash short, empty cart, validation)    → 400
//! rule violation (discount, quantity ceilings)      → 422
//! persistence failure                               → 503 (cart preserved)
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use caixa_core::CoreError;
use caixa_db::DbError;

/// An error ready to be serialized to the frontend.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    /// Stable machine-readable code the frontend switches on.
    pub code: &'static str,
    /// Human-readable message (already user-presentable).
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// The database is down or the transaction could not run. The cart is
    /// preserved so the cashier can retry.
    pub fn service_unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "service_unavailable",
            "Persistence failure, the cart has been preserved - try again",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "code": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        let (status, code) = match err {
            CoreError::ProductNotFound(_) | CoreError::ProductNotInCart(_) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            CoreError::InsufficientStock { .. } => (StatusCode::CONFLICT, "insufficient_stock"),
            CoreError::CommitInFlight => (StatusCode::CONFLICT, "commit_in_flight"),
            CoreError::NotReviewed => (StatusCode::CONFLICT, "not_reviewed"),
            CoreError::InsufficientCash { .. } => (StatusCode::BAD_REQUEST, "insufficient_cash"),
            CoreError::EmptyCart => (StatusCode::BAD_REQUEST, "empty_cart"),
            CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            CoreError::InvalidDiscount { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_discount")
            }
            CoreError::CartTooLarge { .. } | CoreError::QuantityTooLarge { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "limit_exceeded")
            }
        };
        ApiError::new(status, code, message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            // Business rules re-validated inside the commit transaction.
            DbError::Domain(core) => core.into(),
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),
            DbError::UniqueViolation { .. } => {
                ApiError::new(StatusCode::CONFLICT, "conflict", err.to_string())
            }
            other => {
                // Infrastructure failures: log the detail, hide it from the
                // frontend.
                error!(error = %other, "Database failure");
                ApiError::service_unavailable()
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
