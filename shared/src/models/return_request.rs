//! Return request models.
//!
//! Each return request runs its own small machine, independent of its
//! siblings and of the parent order's status:
//!
//! ```text
//! Requested --(approve + refund amount)--> Approved --(mark refunded)--> Refunded
//! Requested --(reject)--> Rejected
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ReturnStatus {
    Requested,
    Approved,
    Rejected,
    Refunded,
}


/// Line being returned; a subset of the parent order's item snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReturnItem {
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReturnRequest {
    pub id: i64,
    pub order_id: i64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub items: Vec<ReturnItem>,
    pub reason: String,
    pub status: ReturnStatus,
    pub refund_amount: Option<i64>,
    pub requested_at: i64,
    pub decision_at: Option<i64>,
}

/// Create payload, filed by the customer against a shipped or delivered
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRequestCreate {
    pub items: Vec<ReturnItem>,
    pub reason: String,
}

/// Admin decision on a return request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReturnDecision {
    Approve { refund_amount: i64 },
    Reject,
    MarkRefunded,
}
