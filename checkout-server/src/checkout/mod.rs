//! Checkout Orchestrator: the single "place an order" use case and the
//! payment callbacks that settle it.
//!
//! Placement never trusts client-computed money: the discount is re-priced
//! server-side and stock is held by the reservation guard, not by a
//! read-then-check. The order row and the coupon redemption commit in one
//! transaction, so a coupon racing for its last use either lands with its
//! order or not at all.
//!
//! Settlement is keyed by order id, with the callback's payment token
//! checked against the opaque one handed out at placement. Both
//! callbacks are idempotent: the payment-state guard
//! allows exactly one Pending → Confirmed/Failed move, and a duplicate
//! callback is answered with the order as-is instead of an error.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::Deserialize;
use shared::clock::Clock;
use shared::error::{CheckoutError, OrderError};
use shared::models::{
    CartLine, Order, OrderItem, OrderStatus, PaymentState, ReservationLine, UnitKey,
    cart_subtotal,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::{Config, CoreError, CoreResult};
use crate::db::ImmediateTxn;
use crate::db::repository::{RepoError, order as order_repo, reservation as reservation_repo, stock as stock_repo};
use crate::discounts::{DiscountEngine, PricedCoupon};
use crate::inventory::ReservationManager;
use crate::notify::{NotificationDispatcher, notify_detached};
use crate::orders::{OrderLifecycle, transitions};

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: Option<i64>,
    pub address_id: i64,
    pub lines: Vec<CartLine>,
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub shipping_cost: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Success,
    Failure,
}

/// What the payment gateway posts back. The token must match the one
/// handed out at placement; settlement is keyed by order id.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentCallback {
    pub payment_token: String,
    pub outcome: PaymentOutcome,
}

#[derive(Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    reservations: ReservationManager,
    discounts: DiscountEngine,
    lifecycle: OrderLifecycle,
    dispatcher: Arc<dyn NotificationDispatcher>,
    reservation_ttl_millis: i64,
}

impl CheckoutService {
    pub fn new(
        pool: SqlitePool,
        clock: Arc<dyn Clock>,
        reservations: ReservationManager,
        discounts: DiscountEngine,
        lifecycle: OrderLifecycle,
        dispatcher: Arc<dyn NotificationDispatcher>,
        config: &Config,
    ) -> Self {
        Self {
            pool,
            clock,
            reservations,
            discounts,
            lifecycle,
            dispatcher,
            reservation_ttl_millis: config.reservation_ttl_millis(),
        }
    }

    /// Place an order: price the cart, hold the stock, persist the order
    /// snapshot, and hand back a payment token.
    ///
    /// Ordering matters. The reservation is taken before any money is
    /// written; the coupon's usage slot is claimed in the same transaction
    /// as the order row. If the coupon guard loses its race, the whole
    /// placement rolls back and the holds are released.
    pub async fn place_order(&self, request: PlaceOrderRequest) -> CoreResult<Order> {
        if request.lines.is_empty() {
            return Err(CheckoutError::EmptyCart.into());
        }
        for line in &request.lines {
            if line.quantity <= 0 {
                return Err(CheckoutError::InvalidQuantity(line.quantity).into());
            }
        }

        let subtotal = cart_subtotal(&request.lines);

        // Re-price server-side; a client-cached discount is never trusted.
        let priced = match &request.coupon_code {
            Some(code) => Some(
                self.discounts
                    .price(code, subtotal, request.user_id, &request.lines)
                    .await?,
            ),
            None => None,
        };
        let discount = priced.as_ref().map_or(0, |p| p.discount);
        let total = subtotal - discount + request.shipping_cost;

        // All-or-nothing hold on every line. Fails with InsufficientStock
        // before the order or the coupon is touched.
        let reservation_lines: Vec<ReservationLine> = request
            .lines
            .iter()
            .map(|l| ReservationLine {
                product_id: l.product_id,
                variant_id: l.variant_id,
                quantity: l.quantity,
            })
            .collect();
        let batch = self
            .reservations
            .reserve(&reservation_lines, self.reservation_ttl_millis)
            .await?;

        let now = self.clock.now_millis();
        let order = Order {
            id: shared::util::snowflake_id(),
            user_id: request.user_id,
            items: request
                .lines
                .iter()
                .map(|l| OrderItem {
                    product_id: l.product_id,
                    variant_id: l.variant_id,
                    name: l.name.clone(),
                    category_id: l.category_id,
                    unit_price: l.unit_price,
                    quantity: l.quantity,
                    line_total: l.line_total(),
                })
                .collect(),
            subtotal,
            discount,
            shipping_cost: request.shipping_cost,
            total,
            status: OrderStatus::Processing,
            address_id: request.address_id,
            coupon_code: priced.as_ref().map(|p| p.coupon.code.clone()),
            tracking_number: None,
            estimated_delivery: None,
            payment_token: Uuid::new_v4().to_string(),
            payment_state: PaymentState::Pending,
            reservation_batch: Some(batch.batch_id.clone()),
            created_at: now,
            updated_at: now,
        };

        if let Err(err) = self
            .persist_placement(&order, priced.as_ref(), request.user_id)
            .await
        {
            // Nothing durable landed; hand the holds back instead of
            // letting them linger until TTL.
            self.reservations.release_batch(&batch.batch_id).await?;
            tracing::info!(
                order_id = order.id,
                coupon = ?order.coupon_code,
                "Placement rolled back, holds released"
            );
            return Err(err);
        }

        tracing::info!(
            order_id = order.id,
            user_id = ?order.user_id,
            total = order.total,
            batch_id = %batch.batch_id,
            "Order placed"
        );
        Ok(order)
    }

    /// Order row and coupon slot, one transaction: a coupon racing for its
    /// last use either lands with its order or not at all.
    async fn persist_placement(
        &self,
        order: &Order,
        priced: Option<&PricedCoupon>,
        user_id: Option<i64>,
    ) -> CoreResult<()> {
        let mut txn = ImmediateTxn::begin(&self.pool).await?;
        order_repo::insert(txn.conn(), order).await?;
        if let Some(priced) = priced {
            if let Err(err) = self
                .discounts
                .commit_use(txn.conn(), priced.coupon.id, user_id, order.id)
                .await
            {
                txn.rollback().await?;
                return Err(err);
            }
        }
        txn.commit().await?;
        Ok(())
    }

    /// Payment-gateway callback, idempotent per order id. The token is
    /// checked against the one issued at placement before anything moves.
    /// A duplicate delivery surfaces internally as
    /// [`CheckoutError::DuplicateConfirmation`] and is swallowed here: the
    /// gateway gets the settled order back, which is what stops it
    /// retrying forever.
    pub async fn settle_payment(
        &self,
        order_id: i64,
        callback: PaymentCallback,
    ) -> CoreResult<Order> {
        let order = order_repo::find(&self.pool, order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;
        if order.payment_token != callback.payment_token {
            return Err(RepoError::Validation("payment token mismatch".into()).into());
        }
        let settled = match callback.outcome {
            PaymentOutcome::Success => self.confirm_payment(order).await,
            PaymentOutcome::Failure => self.fail_payment(order).await,
        };
        match settled {
            Err(CoreError::Checkout(CheckoutError::DuplicateConfirmation(id))) => {
                tracing::info!(order_id = id, "Duplicate payment callback ignored");
                Ok(order_repo::find(&self.pool, id)
                    .await?
                    .ok_or(OrderError::NotFound(id))?)
            }
            other => other,
        }
    }

    /// Payment success.
    ///
    /// One transaction moves the payment state, permanently decrements the
    /// ledger by the ordered quantities, and drops the reservation batch.
    /// A duplicate delivery trips the state guard and decrements nothing.
    async fn confirm_payment(&self, order: Order) -> CoreResult<Order> {
        let now = self.clock.now_millis();

        let mut txn = ImmediateTxn::begin(&self.pool).await?;
        let moved =
            order_repo::set_payment_state_guarded(txn.conn(), order.id, PaymentState::Confirmed, now)
                .await?;
        if moved == 0 {
            txn.rollback().await?;
            return Err(CheckoutError::DuplicateConfirmation(order.id).into());
        }

        for item in &order.items {
            let unit = UnitKey {
                product_id: item.product_id,
                variant_id: item.variant_id,
            };
            self.commit_line(&mut txn, unit, item.quantity, order.id, now)
                .await?;
        }

        if let Some(batch_id) = &order.reservation_batch {
            reservation_repo::delete_batch(txn.conn(), batch_id).await?;
        }
        txn.commit().await?;

        tracing::info!(order_id = order.id, "Payment confirmed, stock committed");
        Ok(order_repo::find(&self.pool, order.id)
            .await?
            .ok_or(OrderError::NotFound(order.id))?)
    }

    /// Payment failure/timeout. Releases the holds and, when the status
    /// machine still allows it, cancels the order; no ledger mutation.
    /// Idempotent the same way confirmation is.
    ///
    /// The cancel goes through the lifecycle's per-order lock and a
    /// status-guarded write, so a failure callback can neither force-cancel
    /// a delivered order nor race an admin transition into a lost update.
    async fn fail_payment(&self, order: Order) -> CoreResult<Order> {
        let lock = self.lifecycle.lock_for(order.id);
        let _guard = lock.lock().await;

        // Status may have moved while we waited for the lock.
        let order = order_repo::find(&self.pool, order.id)
            .await?
            .ok_or(OrderError::NotFound(order.id))?;
        let now = self.clock.now_millis();

        let mut txn = ImmediateTxn::begin(&self.pool).await?;
        let moved =
            order_repo::set_payment_state_guarded(txn.conn(), order.id, PaymentState::Failed, now)
                .await?;
        if moved == 0 {
            txn.rollback().await?;
            return Err(CheckoutError::DuplicateConfirmation(order.id).into());
        }

        let cancelled = if transitions::can_transition(order.status, OrderStatus::Cancelled) {
            order_repo::update_status_guarded(
                txn.conn(),
                order.id,
                order.status,
                OrderStatus::Cancelled,
                now,
            )
            .await?
                > 0
        } else {
            tracing::warn!(
                order_id = order.id,
                status = ?order.status,
                "Payment failed after fulfilment, order status left unchanged"
            );
            false
        };
        if let Some(batch_id) = &order.reservation_batch {
            reservation_repo::delete_batch(txn.conn(), batch_id).await?;
        }
        txn.commit().await?;

        let updated = order_repo::find(&self.pool, order.id)
            .await?
            .ok_or(OrderError::NotFound(order.id))?;
        if cancelled {
            tracing::info!(order_id = order.id, "Payment failed, order cancelled");
            notify_detached(self.dispatcher.clone(), updated.clone(), OrderStatus::Cancelled);
        }
        Ok(updated)
    }

    /// Ledger decrement plus audit entry for one order line, on the
    /// caller's transaction.
    async fn commit_line(
        &self,
        txn: &mut ImmediateTxn,
        unit: UnitKey,
        quantity: i64,
        order_id: i64,
        now: i64,
    ) -> CoreResult<()> {
        let Some(old_value) = stock_repo::total_for_update(txn.conn(), unit).await? else {
            return Err(RepoError::NotFound(format!(
                "stock unit for product {}",
                unit.product_id
            ))
            .into());
        };
        let affected = stock_repo::adjust_guarded(txn.conn(), unit, -quantity, now).await?;
        if affected == 0 {
            // Holds should have protected this quantity; reaching here
            // means the ledger drifted underneath an active reservation.
            tracing::error!(
                product_id = unit.product_id,
                variant_id = ?unit.variant_id,
                order_id,
                current = old_value,
                quantity,
                "Ledger short at commit despite active holds"
            );
            return Err(shared::error::InventoryError::NegativeStock {
                product_id: unit.product_id,
                variant_id: unit.variant_id,
                current: old_value,
                delta: -quantity,
            }
            .into());
        }
        let entry = shared::models::StockAdjustment {
            id: shared::util::snowflake_id(),
            product_id: unit.product_id,
            variant_id: unit.variant_id,
            old_value,
            new_value: old_value - quantity,
            delta: -quantity,
            actor: "checkout".to_string(),
            reason: format!("order {order_id} commit"),
            created_at: now,
        };
        stock_repo::insert_adjustment(txn.conn(), &entry).await?;
        Ok(())
    }
}
