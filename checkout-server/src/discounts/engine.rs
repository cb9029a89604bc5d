//! Discount engine: ordered validation chain, discount math, redemption
//! commit.
//!
//! Validation never mutates anything — `used_count` moves only in
//! [`DiscountEngine::commit_use`], which runs on the order-placement
//! transaction after the order row exists. Abandoned checkouts therefore
//! never consume a use.

use std::sync::Arc;

use shared::clock::Clock;
use shared::error::CouponError;
use shared::models::{CartLine, Coupon, CouponCreate, CouponKind};
use sqlx::{SqliteConnection, SqlitePool};

use super::matcher;
use crate::core::CoreResult;
use crate::db::repository::coupon as repo;

/// Result of validating-and-pricing a coupon against a cart.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PricedCoupon {
    pub coupon: Coupon,
    pub eligible_line_total: i64,
    pub discount: i64,
}

#[derive(Clone)]
pub struct DiscountEngine {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl DiscountEngine {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    pub async fn create_coupon(&self, data: CouponCreate) -> CoreResult<Coupon> {
        let now = self.clock.now_millis();
        Ok(repo::create(&self.pool, data, now).await?)
    }

    pub async fn find_by_code(&self, code: &str) -> CoreResult<Option<Coupon>> {
        Ok(repo::find_by_code(&self.pool, code).await?)
    }

    /// Run the validation chain; the first failing check wins.
    ///
    /// Order: existence/active → activity window → global cap → per-user
    /// cap (anonymous carts pass — guests cannot be limited per user) →
    /// order minimum → allow-list applicability.
    pub async fn validate(
        &self,
        code: &str,
        cart_subtotal: i64,
        user_id: Option<i64>,
        lines: &[CartLine],
    ) -> CoreResult<Coupon> {
        let now = self.clock.now_millis();

        let coupon = repo::find_by_code(&self.pool, code)
            .await?
            .filter(|c| c.is_active)
            .ok_or(CouponError::NotFound)?;

        matcher::check_window(&coupon, now)?;

        if let Some(max_uses) = coupon.max_uses
            && coupon.used_count >= max_uses
        {
            return Err(CouponError::UsageLimitReached.into());
        }

        if let Some(per_user) = coupon.max_uses_per_user
            && let Some(user_id) = user_id
        {
            let used = repo::user_redemption_count(&self.pool, coupon.id, user_id).await?;
            if used >= per_user {
                return Err(CouponError::PerUserLimitReached.into());
            }
        }

        if let Some(min_order_amount) = coupon.min_order_amount
            && cart_subtotal < min_order_amount
        {
            return Err(CouponError::MinOrderNotMet {
                subtotal: cart_subtotal,
                min_order_amount,
            }
            .into());
        }

        if coupon.is_restricted() && !lines.iter().any(|l| matcher::line_matches(&coupon, l)) {
            return Err(CouponError::NotApplicable.into());
        }

        Ok(coupon)
    }

    /// Validate and price in one call (the checkout pricing path).
    pub async fn price(
        &self,
        code: &str,
        cart_subtotal: i64,
        user_id: Option<i64>,
        lines: &[CartLine],
    ) -> CoreResult<PricedCoupon> {
        let coupon = self.validate(code, cart_subtotal, user_id, lines).await?;
        let eligible_line_total = matcher::eligible_line_total(&coupon, lines);
        let discount = compute_discount(cart_subtotal, &coupon, eligible_line_total);
        Ok(PricedCoupon {
            coupon,
            eligible_line_total,
            discount,
        })
    }

    /// Record a redemption on the caller's transaction: guarded
    /// `used_count` increment plus a per-user redemption row.
    ///
    /// The guard re-checks the global cap at write time, so two checkouts
    /// racing for the last use cannot both land — the loser gets
    /// `UsageLimitReached` and the caller rolls its order back.
    pub async fn commit_use(
        &self,
        conn: &mut SqliteConnection,
        coupon_id: i64,
        user_id: Option<i64>,
        order_id: i64,
    ) -> CoreResult<()> {
        let now = self.clock.now_millis();
        let affected = repo::commit_use_guarded(conn, coupon_id, now).await?;
        if affected == 0 {
            return Err(CouponError::UsageLimitReached.into());
        }
        repo::insert_redemption(conn, coupon_id, user_id, order_id, now).await?;
        Ok(())
    }
}

/// Monetary discount for a validated coupon.
///
/// - percent: half-up rounding of `eligible * value / 100`
/// - fixed: capped at the eligible portion, never the full face value
///
/// The result is additionally capped so `subtotal - discount >= 0`.
pub fn compute_discount(subtotal: i64, coupon: &Coupon, eligible_line_total: i64) -> i64 {
    let eligible = eligible_line_total.clamp(0, subtotal);
    let raw = match coupon.kind {
        CouponKind::Percent => (eligible * coupon.value + 50) / 100,
        CouponKind::Fixed => coupon.value.min(eligible),
    };
    raw.clamp(0, subtotal)
}
