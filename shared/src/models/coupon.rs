//! Coupon models.

use serde::{Deserialize, Serialize};

/// Discount kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CouponKind {
    /// `value` is a percentage (20 = 20%).
    Percent,
    /// `value` is a fixed amount in minor units.
    Fixed,
}

/// Coupon entity. `code` is stored lowercase; lookups normalize the same
/// way, so matching is case-insensitive.
///
/// `used_count` moves only on durable order placement, never on
/// validation. Invariant: `used_count <= max_uses` when `max_uses` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    pub kind: CouponKind,
    pub value: i64,
    pub is_active: bool,
    /// Activity window start (Unix millis), unset = active immediately.
    pub starts_at: Option<i64>,
    /// Activity window end (Unix millis), unset = never expires.
    pub ends_at: Option<i64>,
    pub max_uses: Option<i64>,
    pub used_count: i64,
    pub min_order_amount: Option<i64>,
    pub max_uses_per_user: Option<i64>,
    /// When non-empty, the coupon only applies to cart lines whose product
    /// id is listed here (or whose category id is in
    /// `allowed_category_ids`).
    #[cfg_attr(feature = "db", sqlx(json))]
    pub allowed_product_ids: Vec<i64>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub allowed_category_ids: Vec<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Coupon {
    /// Whether the allow-lists restrict eligibility at all.
    pub fn is_restricted(&self) -> bool {
        !self.allowed_product_ids.is_empty() || !self.allowed_category_ids.is_empty()
    }
}

/// Create coupon payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponCreate {
    pub code: String,
    pub kind: CouponKind,
    pub value: i64,
    pub is_active: Option<bool>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub max_uses: Option<i64>,
    pub min_order_amount: Option<i64>,
    pub max_uses_per_user: Option<i64>,
    pub allowed_product_ids: Option<Vec<i64>>,
    pub allowed_category_ids: Option<Vec<i64>>,
}
