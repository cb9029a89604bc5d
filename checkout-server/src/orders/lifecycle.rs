//! Order Lifecycle Controller.
//!
//! Owns every post-creation mutation of an order and its return requests.
//! Updates arrive as [`OrderUpdate`] variants — there is no free-form
//! patch path, so fields that must stay immutable after placement simply
//! cannot be addressed.
//!
//! Transitions on one order are serialized through a per-id async mutex;
//! different orders proceed independently. An invalid transition mutates
//! nothing. Successful status changes (and only those) fire the
//! notification dispatcher, after the write lands, fire-and-forget.

use std::sync::Arc;

use dashmap::DashMap;
use shared::clock::Clock;
use shared::error::OrderError;
use shared::models::{
    Order, OrderStatus, OrderUpdate, ReturnDecision, ReturnRequest, ReturnRequestCreate,
    ReturnStatus,
};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::core::CoreResult;
use crate::db::repository::{RepoError, order as order_repo, return_request as return_repo};
use crate::notify::{NotificationDispatcher, notify_detached};
use crate::orders::transitions;

#[derive(Clone)]
pub struct OrderLifecycle {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    /// Per-entity transition locks, keyed by order/return id.
    locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl OrderLifecycle {
    pub fn new(
        pool: SqlitePool,
        clock: Arc<dyn Clock>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            pool,
            clock,
            dispatcher,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Shared with the checkout settlement path so payment callbacks and
    /// admin transitions on the same order serialize on one mutex.
    pub(crate) fn lock_for(&self, id: i64) -> Arc<Mutex<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn get_order(&self, id: i64) -> CoreResult<Order> {
        order_repo::find(&self.pool, id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id).into())
    }

    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
    ) -> CoreResult<Vec<Order>> {
        Ok(order_repo::list(&self.pool, status, limit).await?)
    }

    /// Apply one explicit update. Invalid edges fail before any write.
    pub async fn apply_update(&self, id: i64, update: OrderUpdate) -> CoreResult<Order> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let order = self.get_order(id).await?;
        let now = self.clock.now_millis();

        match update {
            OrderUpdate::SetStatus {
                status,
                tracking_number,
            } => {
                transitions::check_transition(order.status, status)?;

                let tracking = tracking_number
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty());
                if status == OrderStatus::Shipped && tracking.is_none() && !order.has_tracking() {
                    return Err(OrderError::TrackingRequired.into());
                }

                let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
                order_repo::update_status(&mut conn, id, status, tracking, now).await?;
                drop(conn);

                let updated = self.get_order(id).await?;
                tracing::info!(
                    order_id = id,
                    from = ?order.status,
                    to = ?status,
                    "Order status changed"
                );
                notify_detached(self.dispatcher.clone(), updated.clone(), status);
                Ok(updated)
            }
            OrderUpdate::SetTracking { tracking_number } => {
                let tracking = tracking_number.trim();
                if tracking.is_empty() {
                    return Err(OrderError::TrackingRequired.into());
                }
                let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
                order_repo::set_tracking(&mut conn, id, tracking, now).await?;
                drop(conn);
                self.get_order(id).await
            }
            OrderUpdate::SetEstimatedDelivery { estimated_delivery } => {
                let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
                order_repo::set_estimated_delivery(&mut conn, id, estimated_delivery, now).await?;
                drop(conn);
                self.get_order(id).await
            }
        }
    }

    /// Hard delete, allowed in any status (administrative override).
    /// Return requests cascade.
    pub async fn delete_order(&self, id: i64) -> CoreResult<()> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let deleted = order_repo::delete(&self.pool, id).await?;
        if deleted == 0 {
            return Err(OrderError::NotFound(id).into());
        }
        self.locks.remove(&id);
        tracing::warn!(order_id = id, "Order hard-deleted");
        Ok(())
    }

    /// File a return against a shipped or delivered order. The requested
    /// lines must be a subset of what the order actually contains.
    pub async fn create_return(
        &self,
        order_id: i64,
        data: ReturnRequestCreate,
    ) -> CoreResult<ReturnRequest> {
        let order = self.get_order(order_id).await?;
        if !transitions::returns_allowed(order.status) {
            return Err(OrderError::ReturnNotAllowed {
                status: order.status,
            }
            .into());
        }
        if data.items.is_empty() {
            return Err(RepoError::Validation("return request has no items".into()).into());
        }
        for item in &data.items {
            let ordered: i64 = order
                .items
                .iter()
                .filter(|oi| {
                    oi.product_id == item.product_id && oi.variant_id == item.variant_id
                })
                .map(|oi| oi.quantity)
                .sum();
            if item.quantity <= 0 || item.quantity > ordered {
                return Err(RepoError::Validation(format!(
                    "return quantity {} for product {} exceeds ordered quantity {}",
                    item.quantity, item.product_id, ordered
                ))
                .into());
            }
        }

        let id = shared::util::snowflake_id();
        let now = self.clock.now_millis();
        let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
        return_repo::insert(&mut conn, id, order_id, &data.items, &data.reason, now).await?;
        drop(conn);

        tracing::info!(order_id, return_id = id, "Return request filed");
        return_repo::find(&self.pool, id)
            .await?
            .ok_or_else(|| OrderError::ReturnNotFound(id).into())
    }

    pub async fn list_returns(&self, order_id: i64) -> CoreResult<Vec<ReturnRequest>> {
        // Surface a 404 for unknown orders rather than an empty list
        self.get_order(order_id).await?;
        Ok(return_repo::list_for_order(&self.pool, order_id).await?)
    }

    /// Decide a return request: approve (with refund amount), reject, or
    /// mark an approved one refunded. The write is guarded by the status
    /// the decision was made against, so concurrent decisions cannot both
    /// land.
    pub async fn decide_return(
        &self,
        return_id: i64,
        decision: ReturnDecision,
    ) -> CoreResult<ReturnRequest> {
        let lock = self.lock_for(return_id);
        let _guard = lock.lock().await;

        let request = return_repo::find(&self.pool, return_id)
            .await?
            .ok_or(OrderError::ReturnNotFound(return_id))?;

        let (to, refund_amount) = match decision {
            ReturnDecision::Approve { refund_amount } => {
                if refund_amount < 0 {
                    return Err(OrderError::RefundAmountRequired.into());
                }
                (ReturnStatus::Approved, Some(refund_amount))
            }
            ReturnDecision::Reject => (ReturnStatus::Rejected, None),
            ReturnDecision::MarkRefunded => (ReturnStatus::Refunded, None),
        };
        transitions::check_return_decision(request.status, to)?;

        let now = self.clock.now_millis();
        let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
        let affected = return_repo::update_status_guarded(
            &mut conn,
            return_id,
            request.status,
            to,
            refund_amount,
            now,
        )
        .await?;
        drop(conn);
        if affected == 0 {
            return Err(OrderError::InvalidReturnDecision {
                from: request.status,
                to,
            }
            .into());
        }

        tracing::info!(return_id, from = ?request.status, to = ?to, "Return request decided");
        return_repo::find(&self.pool, return_id)
            .await?
            .ok_or_else(|| OrderError::ReturnNotFound(return_id).into())
    }
}
