//! HTTP error mapping.
//!
//! Domain failures ([`shared::error`]) and storage failures surface here
//! exactly once, as an [`AppError`] rendered to a stable JSON body:
//!
//! ```json
//! {
//!   "code": "INSUFFICIENT_STOCK",
//!   "message": "insufficient stock for product 42: requested 3, available 1"
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::error::{CheckoutError, CouponError, InventoryError, OrderError};
use tracing::error;

use crate::core::CoreError;
use crate::db::repository::RepoError;

/// API error body.
#[derive(Debug, Serialize)]
pub struct AppResponse {
    pub code: String,
    pub message: String,
}

/// Application error enum.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Typed domain failure; status derives from the variant.
    #[error(transparent)]
    Domain(#[from] CheckoutError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    fn status_and_code(&self) -> (StatusCode, String) {
        match self {
            Self::Domain(err) => (domain_status(err), err.code().to_string()),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND".into()),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED".into()),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR".into()),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR".into()),
        }
    }
}

/// Recoverable input problems map to 4xx; ledger invariant violations are
/// 500s because they indicate bookkeeping drift, not bad input.
fn domain_status(err: &CheckoutError) -> StatusCode {
    match err {
        CheckoutError::Inventory(inv) => match inv {
            InventoryError::InsufficientStock { .. } => StatusCode::CONFLICT,
            InventoryError::NegativeStock { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            InventoryError::UnknownUnit { .. } | InventoryError::BatchNotFound(_) => {
                StatusCode::NOT_FOUND
            }
        },
        CheckoutError::Coupon(c) => match c {
            CouponError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        },
        CheckoutError::Order(o) => match o {
            OrderError::NotFound(_) | OrderError::ReturnNotFound(_) => StatusCode::NOT_FOUND,
            OrderError::InvalidTransition { .. } | OrderError::InvalidReturnDecision { .. } => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::BAD_REQUEST,
        },
        // The orchestrator swallows duplicates as success before they get
        // here; a duplicate surfacing as an error means a caller bypassed
        // it.
        CheckoutError::DuplicateConfirmation(_) => StatusCode::CONFLICT,
        CheckoutError::EmptyCart | CheckoutError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(code = %code, message = %message, "Request failed");
        }

        (status, Json(AppResponse { code, message })).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Checkout(domain) => Self::Domain(domain),
            CoreError::Storage(repo) => repo.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => Self::NotFound(msg),
            RepoError::Duplicate(msg) => Self::Validation(msg),
            RepoError::Validation(msg) => Self::Validation(msg),
            RepoError::Database(msg) => Self::Database(msg),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}
