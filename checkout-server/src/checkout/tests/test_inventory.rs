//! Stock ledger and reservation manager behavior.

use super::*;

#[tokio::test]
async fn test_adjust_stock_and_audit_trail() {
    let h = harness().await;
    h.seed_stock(1, 5).await;

    let new_total = h
        .state
        .ledger
        .adjust_stock(UnitKey::product(1), -2, "admin", "damaged goods")
        .await
        .unwrap();
    assert_eq!(new_total, 3);
    assert_eq!(h.total(1).await, 3);

    // Seed + adjustment, newest first, with old/new/actor recorded.
    let log = h
        .state
        .ledger
        .adjustment_log(UnitKey::product(1), 10)
        .await
        .unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].old_value, 5);
    assert_eq!(log[0].new_value, 3);
    assert_eq!(log[0].delta, -2);
    assert_eq!(log[0].actor, "admin");
    assert_eq!(log[1].reason, "seed");
}

#[tokio::test]
async fn test_adjust_below_zero_rejected_without_mutation() {
    let h = harness().await;
    h.seed_stock(1, 2).await;

    let err = inventory_err(
        h.state
            .ledger
            .adjust_stock(UnitKey::product(1), -3, "admin", "oops")
            .await,
    );
    assert!(matches!(
        err,
        InventoryError::NegativeStock {
            current: 2,
            delta: -3,
            ..
        }
    ));
    assert_eq!(h.total(1).await, 2);

    // The rejected adjustment leaves no audit entry either.
    let log = h
        .state
        .ledger
        .adjustment_log(UnitKey::product(1), 10)
        .await
        .unwrap();
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn test_unknown_unit() {
    let h = harness().await;

    let err = inventory_err(
        h.state
            .ledger
            .adjust_stock(UnitKey::product(99), 1, "admin", "x")
            .await,
    );
    assert!(matches!(err, InventoryError::UnknownUnit { product_id: 99, .. }));

    let err = inventory_err(
        h.state
            .reservations
            .available_stock(UnitKey::product(99))
            .await,
    );
    assert!(matches!(err, InventoryError::UnknownUnit { .. }));
}

#[tokio::test]
async fn test_variants_tracked_independently() {
    let h = harness().await;
    h.state
        .ledger
        .set_stock(UnitKey::variant(1, 10), 4, "test", "seed")
        .await
        .unwrap();
    h.state
        .ledger
        .set_stock(UnitKey::variant(1, 11), 7, "test", "seed")
        .await
        .unwrap();

    h.state
        .ledger
        .adjust_stock(UnitKey::variant(1, 10), -4, "test", "sold out")
        .await
        .unwrap();

    assert_eq!(
        h.state.ledger.total_stock(UnitKey::variant(1, 10)).await.unwrap(),
        0
    );
    assert_eq!(
        h.state.ledger.total_stock(UnitKey::variant(1, 11)).await.unwrap(),
        7
    );
}

#[tokio::test]
async fn test_reserve_exhaust_release_cycle() {
    let h = harness().await;
    h.seed_stock(1, 5).await;

    let batch = h
        .state
        .reservations
        .reserve(&[hold(1, 5)], TTL)
        .await
        .unwrap();
    assert_eq!(batch.reservation_ids.len(), 1);
    assert_eq!(h.available(1).await, 0);
    // Holds are not deductions.
    assert_eq!(h.total(1).await, 5);

    let err = inventory_err(h.state.reservations.reserve(&[hold(1, 1)], TTL).await);
    assert!(matches!(
        err,
        InventoryError::InsufficientStock {
            requested: 1,
            available: 0,
            ..
        }
    ));

    h.state
        .reservations
        .release_batch(&batch.batch_id)
        .await
        .unwrap();
    assert_eq!(h.available(1).await, 5);

    h.state
        .reservations
        .reserve(&[hold(1, 1)], TTL)
        .await
        .unwrap();
    assert_eq!(h.available(1).await, 4);
}

#[tokio::test]
async fn test_release_by_unit_without_batch_id() {
    let h = harness().await;
    h.seed_stock(1, 10).await;
    h.seed_stock(2, 10).await;

    // Two separate batches holding product 1; product 2 held once.
    h.state
        .reservations
        .reserve(&[hold(1, 2), hold(2, 4)], TTL)
        .await
        .unwrap();
    h.clock.advance(1_000);
    h.state
        .reservations
        .reserve(&[hold(1, 3)], TTL)
        .await
        .unwrap();
    assert_eq!(h.available(1).await, 5);

    // Asking for 2 drops exactly the oldest hold on product 1, leaving
    // the later batch and product 2 untouched.
    let released = h
        .state
        .reservations
        .release(&[hold(1, 2)])
        .await
        .unwrap();
    assert_eq!(released, 1);
    assert_eq!(h.available(1).await, 7);
    assert_eq!(h.available(2).await, 6);

    // Asking for more than is held frees everything on the unit and
    // stops there.
    let released = h
        .state
        .reservations
        .release(&[hold(1, 99)])
        .await
        .unwrap();
    assert_eq!(released, 1);
    assert_eq!(h.available(1).await, 10);
}

#[tokio::test]
async fn test_reserve_batch_is_all_or_nothing() {
    let h = harness().await;
    h.seed_stock(1, 10).await;
    h.seed_stock(2, 1).await;

    let err = inventory_err(
        h.state
            .reservations
            .reserve(&[hold(1, 3), hold(2, 2)], TTL)
            .await,
    );
    assert!(matches!(
        err,
        InventoryError::InsufficientStock { product_id: 2, .. }
    ));

    // The covered line did not leave a partial hold behind.
    assert_eq!(h.available(1).await, 10);
    assert_eq!(h.available(2).await, 1);
}

#[tokio::test]
async fn test_zero_quantity_line_is_noop() {
    let h = harness().await;
    h.seed_stock(1, 5).await;

    let batch = h
        .state
        .reservations
        .reserve(&[hold(1, 0)], TTL)
        .await
        .unwrap();
    assert!(batch.reservation_ids.is_empty());
    assert_eq!(h.available(1).await, 5);
}

#[tokio::test]
async fn test_expired_holds_free_stock_lazily() {
    let h = harness().await;
    h.seed_stock(1, 5).await;

    h.state
        .reservations
        .reserve(&[hold(1, 5)], TTL)
        .await
        .unwrap();
    assert_eq!(h.available(1).await, 0);

    // One past-expiry tick is enough; no sweep has run.
    h.clock.advance(TTL + 1);
    assert_eq!(h.available(1).await, 5);

    h.state
        .reservations
        .reserve(&[hold(1, 2)], TTL)
        .await
        .unwrap();
    assert_eq!(h.available(1).await, 3);
}

#[tokio::test]
async fn test_extend_batch_pushes_expiry() {
    let h = harness().await;
    h.seed_stock(1, 5).await;

    let batch = h
        .state
        .reservations
        .reserve(&[hold(1, 5)], TTL)
        .await
        .unwrap();

    h.clock.advance(TTL - 1_000);
    let extended = h
        .state
        .reservations
        .extend_batch(&batch.batch_id, TTL)
        .await
        .unwrap();
    assert_eq!(extended.expires_at, h.clock.now_millis() + TTL);
    assert_eq!(extended.reservation_ids.len(), 1);

    // Past the original expiry, the extended hold is still in force.
    h.clock.advance(2_000);
    assert_eq!(h.available(1).await, 0);
}

#[tokio::test]
async fn test_extend_expired_batch_fails() {
    let h = harness().await;
    h.seed_stock(1, 5).await;

    let batch = h
        .state
        .reservations
        .reserve(&[hold(1, 5)], TTL)
        .await
        .unwrap();
    h.clock.advance(TTL + 1);

    let err = inventory_err(
        h.state
            .reservations
            .extend_batch(&batch.batch_id, TTL)
            .await,
    );
    assert!(matches!(err, InventoryError::BatchNotFound(_)));
}

#[tokio::test]
async fn test_purge_deletes_only_expired_rows() {
    let h = harness().await;
    h.seed_stock(1, 10).await;

    h.state
        .reservations
        .reserve(&[hold(1, 2)], 1_000)
        .await
        .unwrap();
    h.state
        .reservations
        .reserve(&[hold(1, 3)], TTL)
        .await
        .unwrap();

    h.clock.advance(5_000);
    let purged = h.state.reservations.purge_expired().await.unwrap();
    assert_eq!(purged, 1);
    assert_eq!(h.available(1).await, 7);
}

#[tokio::test]
async fn test_concurrent_reserves_one_winner() {
    let h = harness().await;
    h.seed_stock(1, 1).await;

    let r1 = h.state.reservations.clone();
    let r2 = h.state.reservations.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { r1.reserve(&[hold(1, 1)], TTL).await }),
        tokio::spawn(async move { r2.reserve(&[hold(1, 1)], TTL).await }),
    );
    let results = [a.unwrap(), b.unwrap()];

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    let h_available = h.available(1).await;
    assert_eq!(h_available, 0);
}
