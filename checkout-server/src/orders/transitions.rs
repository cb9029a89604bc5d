//! Legal state-machine edges, as pure predicates.
//!
//! The primary machine:
//!
//! ```text
//! Processing -> Shipped      (tracking number required)
//! Processing -> Cancelled
//! Shipped    -> Delivered
//! Shipped    -> Cancelled    (admin exception)
//! ```
//!
//! Re-saving the same status is not an edge: no-op transitions are
//! rejected so downstream notifications only ever fire on real changes.

use shared::error::OrderError;
use shared::models::{OrderStatus, ReturnStatus};

pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Processing, Shipped)
            | (Processing, Cancelled)
            | (Shipped, Delivered)
            | (Shipped, Cancelled)
    )
}

pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(OrderError::InvalidTransition { from, to })
    }
}

/// Return requests may only be filed against shipped or delivered orders.
pub fn returns_allowed(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Shipped | OrderStatus::Delivered)
}

pub fn can_decide_return(from: ReturnStatus, to: ReturnStatus) -> bool {
    use ReturnStatus::*;
    matches!(
        (from, to),
        (Requested, Approved) | (Requested, Rejected) | (Approved, Refunded)
    )
}

pub fn check_return_decision(from: ReturnStatus, to: ReturnStatus) -> Result<(), OrderError> {
    if can_decide_return(from, to) {
        Ok(())
    } else {
        Err(OrderError::InvalidReturnDecision { from, to })
    }
}
