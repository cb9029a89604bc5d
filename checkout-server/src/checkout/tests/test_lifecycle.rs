//! Order status machine, return sub-machine, and the controller rules
//! around them.

use super::*;

use shared::models::{OrderUpdate, ReturnDecision, ReturnItem, ReturnRequestCreate, ReturnStatus};

fn ship(tracking: Option<&str>) -> OrderUpdate {
    OrderUpdate::SetStatus {
        status: OrderStatus::Shipped,
        tracking_number: tracking.map(str::to_string),
    }
}

fn set_status(status: OrderStatus) -> OrderUpdate {
    OrderUpdate::SetStatus {
        status,
        tracking_number: None,
    }
}

fn return_one(product_id: i64) -> ReturnRequestCreate {
    ReturnRequestCreate {
        items: vec![ReturnItem {
            product_id,
            variant_id: None,
            quantity: 1,
        }],
        reason: "does not fit".to_string(),
    }
}

/// Drive a fresh order to `Delivered`.
async fn delivered_order(h: &TestHarness) -> Order {
    let order = h.place_simple_order(1, 2).await;
    h.state
        .lifecycle
        .apply_update(order.id, ship(Some("TRACK-1")))
        .await
        .unwrap();
    h.state
        .lifecycle
        .apply_update(order.id, set_status(OrderStatus::Delivered))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_ship_requires_tracking() {
    let h = harness().await;
    let order = h.place_simple_order(1, 1).await;

    let err = order_err(h.state.lifecycle.apply_update(order.id, ship(None)).await);
    assert_eq!(err, OrderError::TrackingRequired);

    // Blank counts as absent.
    let err = order_err(
        h.state
            .lifecycle
            .apply_update(order.id, ship(Some("   ")))
            .await,
    );
    assert_eq!(err, OrderError::TrackingRequired);

    let updated = h
        .state
        .lifecycle
        .apply_update(order.id, ship(Some("TRACK-9")))
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);
    assert_eq!(updated.tracking_number.as_deref(), Some("TRACK-9"));
}

#[tokio::test]
async fn test_tracking_can_be_recorded_before_shipping() {
    let h = harness().await;
    let order = h.place_simple_order(1, 1).await;

    h.state
        .lifecycle
        .apply_update(
            order.id,
            OrderUpdate::SetTracking {
                tracking_number: "EARLY-1".into(),
            },
        )
        .await
        .unwrap();

    // Ship without repeating the number; the stored one satisfies the rule.
    let updated = h
        .state
        .lifecycle
        .apply_update(order.id, ship(None))
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);
    assert_eq!(updated.tracking_number.as_deref(), Some("EARLY-1"));
}

#[tokio::test]
async fn test_empty_tracking_update_rejected() {
    let h = harness().await;
    let order = h.place_simple_order(1, 1).await;

    let err = order_err(
        h.state
            .lifecycle
            .apply_update(
                order.id,
                OrderUpdate::SetTracking {
                    tracking_number: "  ".into(),
                },
            )
            .await,
    );
    assert_eq!(err, OrderError::TrackingRequired);
}

#[tokio::test]
async fn test_illegal_edges_mutate_nothing() {
    let h = harness().await;
    let order = h.place_simple_order(1, 1).await;

    // Processing cannot jump straight to Delivered.
    let err = order_err(
        h.state
            .lifecycle
            .apply_update(order.id, set_status(OrderStatus::Delivered))
            .await,
    );
    assert_eq!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Processing,
            to: OrderStatus::Delivered,
        }
    );
    let current = h.state.lifecycle.get_order(order.id).await.unwrap();
    assert_eq!(current.status, OrderStatus::Processing);
}

#[tokio::test]
async fn test_terminal_states_stay_terminal() {
    let h = harness().await;
    let order = delivered_order(&h).await;

    for target in [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Cancelled,
    ] {
        let err = order_err(
            h.state
                .lifecycle
                .apply_update(order.id, set_status(target))
                .await,
        );
        assert!(matches!(err, OrderError::InvalidTransition { .. }));
    }
}

#[tokio::test]
async fn test_cancel_allowed_from_shipped() {
    let h = harness().await;
    let order = h.place_simple_order(1, 1).await;
    h.state
        .lifecycle
        .apply_update(order.id, ship(Some("T")))
        .await
        .unwrap();

    let cancelled = h
        .state
        .lifecycle
        .apply_update(order.id, set_status(OrderStatus::Cancelled))
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_status_changes_are_notified() {
    let h = harness().await;
    let order = h.place_simple_order(1, 1).await;

    h.state
        .lifecycle
        .apply_update(order.id, ship(Some("T")))
        .await
        .unwrap();

    // Dispatch is fire-and-forget; give the spawned task a moment.
    for _ in 0..50 {
        if !h.dispatcher.events.lock().await.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    let events = h.dispatcher.events.lock().await;
    assert_eq!(events.as_slice(), &[(order.id, OrderStatus::Shipped)]);
}

#[tokio::test]
async fn test_returns_only_against_shipped_or_delivered() {
    let h = harness().await;
    let order = h.place_simple_order(1, 1).await;

    let err = order_err(
        h.state
            .lifecycle
            .create_return(order.id, return_one(1))
            .await,
    );
    assert_eq!(
        err,
        OrderError::ReturnNotAllowed {
            status: OrderStatus::Processing,
        }
    );

    h.state
        .lifecycle
        .apply_update(order.id, ship(Some("T")))
        .await
        .unwrap();
    let request = h
        .state
        .lifecycle
        .create_return(order.id, return_one(1))
        .await
        .unwrap();
    assert_eq!(request.status, ReturnStatus::Requested);
    assert_eq!(request.order_id, order.id);
}

#[tokio::test]
async fn test_return_quantity_bounded_by_order() {
    let h = harness().await;
    let order = delivered_order(&h).await; // 2 units of product 1

    let result = h
        .state
        .lifecycle
        .create_return(
            order.id,
            ReturnRequestCreate {
                items: vec![ReturnItem {
                    product_id: 1,
                    variant_id: None,
                    quantity: 3,
                }],
                reason: "all of them and one more".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(CoreError::Storage(_))));

    // Products never ordered are rejected the same way.
    let result = h
        .state
        .lifecycle
        .create_return(order.id, return_one(42))
        .await;
    assert!(matches!(result, Err(CoreError::Storage(_))));
}

#[tokio::test]
async fn test_return_decision_machine() {
    let h = harness().await;
    let order = delivered_order(&h).await;
    let request = h
        .state
        .lifecycle
        .create_return(order.id, return_one(1))
        .await
        .unwrap();

    // Refunded only follows Approved.
    let err = order_err(
        h.state
            .lifecycle
            .decide_return(request.id, ReturnDecision::MarkRefunded)
            .await,
    );
    assert_eq!(
        err,
        OrderError::InvalidReturnDecision {
            from: ReturnStatus::Requested,
            to: ReturnStatus::Refunded,
        }
    );

    let approved = h
        .state
        .lifecycle
        .decide_return(request.id, ReturnDecision::Approve { refund_amount: 10_000 })
        .await
        .unwrap();
    assert_eq!(approved.status, ReturnStatus::Approved);
    assert_eq!(approved.refund_amount, Some(10_000));

    // A decided request cannot be re-decided the other way.
    let err = order_err(
        h.state
            .lifecycle
            .decide_return(request.id, ReturnDecision::Reject)
            .await,
    );
    assert!(matches!(err, OrderError::InvalidReturnDecision { .. }));

    let refunded = h
        .state
        .lifecycle
        .decide_return(request.id, ReturnDecision::MarkRefunded)
        .await
        .unwrap();
    assert_eq!(refunded.status, ReturnStatus::Refunded);
}

#[tokio::test]
async fn test_rejected_return_cannot_be_approved() {
    let h = harness().await;
    let order = delivered_order(&h).await;
    let request = h
        .state
        .lifecycle
        .create_return(order.id, return_one(1))
        .await
        .unwrap();

    h.state
        .lifecycle
        .decide_return(request.id, ReturnDecision::Reject)
        .await
        .unwrap();

    let err = order_err(
        h.state
            .lifecycle
            .decide_return(request.id, ReturnDecision::Approve { refund_amount: 1 })
            .await,
    );
    assert_eq!(
        err,
        OrderError::InvalidReturnDecision {
            from: ReturnStatus::Rejected,
            to: ReturnStatus::Approved,
        }
    );
}

#[tokio::test]
async fn test_delete_order_cascades_to_returns() {
    let h = harness().await;
    let order = delivered_order(&h).await;
    let request = h
        .state
        .lifecycle
        .create_return(order.id, return_one(1))
        .await
        .unwrap();

    h.state.lifecycle.delete_order(order.id).await.unwrap();

    let err = order_err(h.state.lifecycle.get_order(order.id).await);
    assert_eq!(err, OrderError::NotFound(order.id));
    let err = order_err(
        h.state
            .lifecycle
            .decide_return(request.id, ReturnDecision::Reject)
            .await,
    );
    assert_eq!(err, OrderError::ReturnNotFound(request.id));
}

#[tokio::test]
async fn test_list_orders_filters_by_status() {
    let h = harness().await;
    let a = h.place_simple_order(1, 1).await;
    let b = h.place_simple_order(2, 1).await;
    h.state
        .lifecycle
        .apply_update(b.id, ship(Some("T")))
        .await
        .unwrap();

    let processing = h
        .state
        .lifecycle
        .list_orders(Some(OrderStatus::Processing), 100)
        .await
        .unwrap();
    assert_eq!(processing.len(), 1);
    assert_eq!(processing[0].id, a.id);

    let all = h.state.lifecycle.list_orders(None, 100).await.unwrap();
    assert_eq!(all.len(), 2);
}
