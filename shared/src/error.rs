//! Typed failure taxonomy for the checkout core.
//!
//! Every fallible operation on the public surface returns one of these
//! variants; generic errors never cross the checkout boundary. Callers are
//! expected to distinguish three classes:
//!
//! - retry with different input: [`InventoryError::InsufficientStock`],
//!   any [`CouponError`]
//! - illegal operation: [`OrderError::InvalidTransition`] and friends
//! - already done: [`CheckoutError::DuplicateConfirmation`], which the
//!   orchestrator swallows as success
//!
//! Each variant carries a stable machine code (`code()`) so API clients can
//! switch on it without parsing messages.

use thiserror::Error;

use crate::models::order::OrderStatus;
use crate::models::return_request::ReturnStatus;

/// Stock ledger and reservation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Requested quantity exceeds available (total minus active holds).
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: i64,
        variant_id: Option<i64>,
        requested: i64,
        available: i64,
    },

    /// An adjustment would take the ledger below zero. This indicates
    /// bookkeeping drift and is logged as an audit alert by the caller.
    #[error("stock for product {product_id} would go negative (current {current}, delta {delta})")]
    NegativeStock {
        product_id: i64,
        variant_id: Option<i64>,
        current: i64,
        delta: i64,
    },

    /// No ledger row exists for the unit.
    #[error("unknown stock unit: product {product_id}")]
    UnknownUnit {
        product_id: i64,
        variant_id: Option<i64>,
    },

    /// A reservation batch id that does not match any active reservation.
    #[error("reservation batch {0} not found")]
    BatchNotFound(String),
}

impl InventoryError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::NegativeStock { .. } => "NEGATIVE_STOCK",
            Self::UnknownUnit { .. } => "UNKNOWN_STOCK_UNIT",
            Self::BatchNotFound(_) => "RESERVATION_BATCH_NOT_FOUND",
        }
    }
}

/// Coupon validation failures, in the order the checks run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("coupon not found or inactive")]
    NotFound,

    #[error("coupon is not active yet")]
    NotYetActive,

    #[error("coupon has expired")]
    Expired,

    #[error("coupon usage limit reached")]
    UsageLimitReached,

    #[error("per-user usage limit reached for this coupon")]
    PerUserLimitReached,

    #[error("order subtotal {subtotal} is below the coupon minimum {min_order_amount}")]
    MinOrderNotMet {
        subtotal: i64,
        min_order_amount: i64,
    },

    #[error("coupon is not applicable to any item in the cart")]
    NotApplicable,
}

impl CouponError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "COUPON_NOT_FOUND",
            Self::NotYetActive => "COUPON_NOT_YET_ACTIVE",
            Self::Expired => "COUPON_EXPIRED",
            Self::UsageLimitReached => "COUPON_USAGE_LIMIT",
            Self::PerUserLimitReached => "COUPON_PER_USER_LIMIT",
            Self::MinOrderNotMet { .. } => "COUPON_MIN_ORDER_NOT_MET",
            Self::NotApplicable => "COUPON_NOT_APPLICABLE",
        }
    }
}

/// Order lifecycle and return sub-machine failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order {0} not found")]
    NotFound(i64),

    #[error("invalid order status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Shipping requires a tracking number, supplied now or already set.
    #[error("cannot mark order shipped without a tracking number")]
    TrackingRequired,

    /// Returns may only be filed against shipped or delivered orders.
    #[error("return request not allowed while order is {status:?}")]
    ReturnNotAllowed { status: OrderStatus },

    #[error("return request {0} not found")]
    ReturnNotFound(i64),

    #[error("invalid return decision: {from:?} -> {to:?}")]
    InvalidReturnDecision { from: ReturnStatus, to: ReturnStatus },

    /// Approving a return requires a refund amount.
    #[error("refund amount required to approve a return")]
    RefundAmountRequired,
}

impl OrderError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ORDER_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::TrackingRequired => "TRACKING_REQUIRED",
            Self::ReturnNotAllowed { .. } => "RETURN_NOT_ALLOWED",
            Self::ReturnNotFound(_) => "RETURN_NOT_FOUND",
            Self::InvalidReturnDecision { .. } => "INVALID_RETURN_DECISION",
            Self::RefundAmountRequired => "REFUND_AMOUNT_REQUIRED",
        }
    }
}

/// Composite error for the checkout orchestrator surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Order(#[from] OrderError),

    /// The payment gateway re-delivered a confirmation the core already
    /// applied. The idempotency guard trips, nothing is decremented twice,
    /// and the orchestrator reports success to the gateway.
    #[error("payment for order {0} was already confirmed")]
    DuplicateConfirmation(i64),

    #[error("cart is empty")]
    EmptyCart,

    #[error("cart line has non-positive quantity {0}")]
    InvalidQuantity(i64),
}

impl CheckoutError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Inventory(e) => e.code(),
            Self::Coupon(e) => e.code(),
            Self::Order(e) => e.code(),
            Self::DuplicateConfirmation(_) => "DUPLICATE_CONFIRMATION",
            Self::EmptyCart => "EMPTY_CART",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
        }
    }
}
