//! Order models and the status machine vocabulary.

use serde::{Deserialize, Serialize};

/// Primary order status.
///
/// ```text
/// Processing --(ship + tracking)--> Shipped --(deliver)--> Delivered
/// Processing --(cancel)--> Cancelled
/// Shipped    --(cancel)--> Cancelled   (admin exception)
/// ```
///
/// `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}


/// Payment handoff state, used by the idempotent confirmation guard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentState {
    Pending,
    Confirmed,
    Failed,
}

/// Immutable line snapshot. Prices are copied at placement time, never
/// references to live catalog prices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub name: String,
    pub category_id: Option<i64>,
    pub unit_price: i64,
    pub quantity: i64,
    pub line_total: i64,
}

/// Order entity. Only `status`, `tracking_number`, `estimated_delivery`
/// and `payment_state` mutate after creation; everything else is a
/// placement-time snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub user_id: Option<i64>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub items: Vec<OrderItem>,
    pub subtotal: i64,
    pub discount: i64,
    pub shipping_cost: i64,
    pub total: i64,
    pub status: OrderStatus,
    pub address_id: i64,
    pub coupon_code: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<i64>,
    /// Opaque token handed to the payment gateway at placement.
    pub payment_token: String,
    pub payment_state: PaymentState,
    /// Reservation batch holding this order's stock until payment settles.
    /// Cleared semantics are by deletion of the batch, not this field.
    pub reservation_batch: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// True once a non-empty tracking number has been recorded.
    pub fn has_tracking(&self) -> bool {
        self.tracking_number
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

/// Explicit post-creation mutations. Anything not expressible here is not
/// mutable — there is deliberately no free-form patch object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OrderUpdate {
    /// Drive the status machine. `tracking_number` may accompany a move to
    /// `Shipped`; it is rejected as absent when blank.
    SetStatus {
        status: OrderStatus,
        tracking_number: Option<String>,
    },
    /// Record or replace the tracking number without changing status.
    SetTracking { tracking_number: String },
    /// Expected delivery date (Unix millis).
    SetEstimatedDelivery { estimated_delivery: i64 },
}
