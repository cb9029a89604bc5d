//! Repository Module
//!
//! SQL access for the checkout core, one module per aggregate. All queries
//! are runtime-checked; guarded writes return the affected row count so
//! callers can tell whether the guard held.

pub mod coupon;
pub mod order;
pub mod reservation;
pub mod return_request;
pub mod stock;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(err.to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Database(format!("JSON column: {err}"))
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// NULL variants are stored as 0 so (product_id, variant_id) keys stay
/// unique; see migrations/0001_init.sql.
pub(crate) fn variant_column(variant_id: Option<i64>) -> i64 {
    variant_id.unwrap_or(0)
}
