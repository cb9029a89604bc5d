//! Reservation models.
//!
//! A reservation is a time-boxed hold against a stock unit, never a
//! permanent deduction. Holds with `expires_at <= now` are logically dead
//! the instant the clock passes, whether or not a sweep has deleted them.

use serde::{Deserialize, Serialize};

/// One active hold on a stock unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    /// Groups the holds created by one checkout attempt.
    pub batch_id: String,
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub quantity: i64,
    pub expires_at: i64,
    pub created_at: i64,
}


/// Requested line in a reserve call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationLine {
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub quantity: i64,
}

/// Result of a successful all-or-nothing reserve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationBatch {
    pub batch_id: String,
    pub reservation_ids: Vec<i64>,
    pub expires_at: i64,
}
