//! Notification dispatch.
//!
//! Status changes notify the customer through an external channel (SMS,
//! messenger, email — not this crate's concern). The contract is
//! fire-and-forget: a failed notification is logged and never blocks or
//! rolls back the transition that triggered it.

use async_trait::async_trait;
use shared::models::{Order, OrderStatus};
use std::sync::Arc;

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Tell the customer their order reached `new_status`. Errors are the
    /// dispatcher's to report; callers ignore the outcome.
    async fn notify(&self, order: &Order, new_status: OrderStatus) -> anyhow::Result<()>;
}

/// Default dispatcher: structured log lines only. Real delivery channels
/// live behind the same trait in their own crates.
#[derive(Debug, Default)]
pub struct TracingDispatcher;

#[async_trait]
impl NotificationDispatcher for TracingDispatcher {
    async fn notify(&self, order: &Order, new_status: OrderStatus) -> anyhow::Result<()> {
        tracing::info!(
            order_id = order.id,
            user_id = ?order.user_id,
            status = ?new_status,
            "Order status notification"
        );
        Ok(())
    }
}

/// Spawn the notification without waiting for it.
pub fn notify_detached(
    dispatcher: Arc<dyn NotificationDispatcher>,
    order: Order,
    new_status: OrderStatus,
) {
    tokio::spawn(async move {
        if let Err(e) = dispatcher.notify(&order, new_status).await {
            tracing::warn!(order_id = order.id, error = %e, "Notification dispatch failed");
        }
    });
}
