//! Discount engine validation chain and pricing against the database.
//! The pure discount math is covered next to `compute_discount`.

use super::*;

#[tokio::test]
async fn test_unknown_code_fails_first() {
    let h = harness().await;
    let err = coupon_err(
        h.state
            .discounts
            .validate("nope", 100_000, Some(1), &[line(1, 100_000, 1)])
            .await,
    );
    assert_eq!(err, CouponError::NotFound);
}

#[tokio::test]
async fn test_inactive_coupon_reads_as_missing() {
    let h = harness().await;
    let mut create = coupon_create("paused", CouponKind::Fixed, 1_000);
    create.is_active = Some(false);
    h.seed_coupon(create).await;

    let err = coupon_err(
        h.state
            .discounts
            .validate("paused", 100_000, Some(1), &[line(1, 100_000, 1)])
            .await,
    );
    assert_eq!(err, CouponError::NotFound);
}

#[tokio::test]
async fn test_code_matching_is_case_insensitive() {
    let h = harness().await;
    h.seed_coupon(coupon_create("SUMMER", CouponKind::Percent, 10)).await;

    let priced = h
        .state
        .discounts
        .price("sUmMeR", 100_000, Some(1), &[line(1, 100_000, 1)])
        .await
        .unwrap();
    assert_eq!(priced.discount, 10_000);
}

#[tokio::test]
async fn test_activity_window() {
    let h = harness().await;
    let mut create = coupon_create("window", CouponKind::Percent, 10);
    create.starts_at = Some(START + 10_000);
    create.ends_at = Some(START + 20_000);
    h.seed_coupon(create).await;

    let cart = [line(1, 100_000, 1)];

    let err = coupon_err(h.state.discounts.validate("window", 100_000, None, &cart).await);
    assert_eq!(err, CouponError::NotYetActive);

    h.clock.set(START + 15_000);
    h.state
        .discounts
        .validate("window", 100_000, None, &cart)
        .await
        .unwrap();

    h.clock.set(START + 20_001);
    let err = coupon_err(h.state.discounts.validate("window", 100_000, None, &cart).await);
    assert_eq!(err, CouponError::Expired);
}

#[tokio::test]
async fn test_global_usage_cap() {
    let h = harness().await;
    let mut create = coupon_create("once", CouponKind::Fixed, 1_000);
    create.max_uses = Some(1);
    h.seed_coupon(create).await;
    h.seed_stock(1, 10).await;

    // Burn the single use through a real placement.
    h.state
        .checkout
        .place_order(order_request(vec![line(1, 50_000, 1)], Some("once")))
        .await
        .unwrap();

    let err = coupon_err(
        h.state
            .discounts
            .validate("once", 100_000, Some(2), &[line(1, 100_000, 1)])
            .await,
    );
    assert_eq!(err, CouponError::UsageLimitReached);
}

#[tokio::test]
async fn test_per_user_cap_ignores_anonymous_carts() {
    let h = harness().await;
    let mut create = coupon_create("peruser", CouponKind::Fixed, 1_000);
    create.max_uses_per_user = Some(1);
    h.seed_coupon(create).await;
    h.seed_stock(1, 10).await;

    h.state
        .checkout
        .place_order(PlaceOrderRequest {
            user_id: Some(7),
            ..order_request(vec![line(1, 50_000, 1)], Some("peruser"))
        })
        .await
        .unwrap();

    // Same user: capped.
    let err = coupon_err(
        h.state
            .discounts
            .validate("peruser", 100_000, Some(7), &[line(1, 100_000, 1)])
            .await,
    );
    assert_eq!(err, CouponError::PerUserLimitReached);

    // Different user passes.
    h.state
        .discounts
        .validate("peruser", 100_000, Some(8), &[line(1, 100_000, 1)])
        .await
        .unwrap();

    // Anonymous carts have no identity to cap on.
    h.state
        .discounts
        .validate("peruser", 100_000, None, &[line(1, 100_000, 1)])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_min_order_amount_scenario() {
    let h = harness().await;
    let mut create = coupon_create("big20k", CouponKind::Fixed, 20_000);
    create.min_order_amount = Some(100_000);
    h.seed_coupon(create).await;

    let err = coupon_err(
        h.state
            .discounts
            .validate("big20k", 90_000, Some(1), &[line(1, 90_000, 1)])
            .await,
    );
    assert_eq!(
        err,
        CouponError::MinOrderNotMet {
            subtotal: 90_000,
            min_order_amount: 100_000,
        }
    );

    let priced = h
        .state
        .discounts
        .price("big20k", 150_000, Some(1), &[line(1, 150_000, 1)])
        .await
        .unwrap();
    assert_eq!(priced.discount, 20_000);
    assert_eq!(150_000 - priced.discount, 130_000);
}

#[tokio::test]
async fn test_restricted_coupon_needs_matching_line() {
    let h = harness().await;
    let mut create = coupon_create("cat5", CouponKind::Percent, 20);
    create.allowed_category_ids = Some(vec![5]);
    h.seed_coupon(create).await;

    let err = coupon_err(
        h.state
            .discounts
            .validate("cat5", 100_000, Some(1), &[line_in_category(1, 9, 100_000, 1)])
            .await,
    );
    assert_eq!(err, CouponError::NotApplicable);

    // Mixed cart: the discount base is the matching portion only.
    let cart = vec![
        line_in_category(1, 5, 100_000, 1),
        line_in_category(2, 9, 50_000, 1),
    ];
    let priced = h
        .state
        .discounts
        .price("cat5", 150_000, Some(1), &cart)
        .await
        .unwrap();
    assert_eq!(priced.eligible_line_total, 100_000);
    assert_eq!(priced.discount, 20_000);
}

#[tokio::test]
async fn test_validation_does_not_consume_uses() {
    let h = harness().await;
    let mut create = coupon_create("keep", CouponKind::Percent, 10);
    create.max_uses = Some(1);
    h.seed_coupon(create).await;

    for _ in 0..3 {
        h.state
            .discounts
            .validate("keep", 100_000, Some(1), &[line(1, 100_000, 1)])
            .await
            .unwrap();
    }

    let coupon = h.state.discounts.find_by_code("keep").await.unwrap().unwrap();
    assert_eq!(coupon.used_count, 0);
}

#[tokio::test]
async fn test_duplicate_code_rejected() {
    let h = harness().await;
    h.seed_coupon(coupon_create("dup", CouponKind::Percent, 10)).await;

    let result = h
        .state
        .discounts
        .create_coupon(coupon_create("DUP", CouponKind::Fixed, 500))
        .await;
    assert!(matches!(result, Err(CoreError::Storage(_))));
}
