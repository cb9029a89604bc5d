//! Service-level tests for the whole checkout core, run against a
//! file-backed SQLite database with a manually advanced clock.
//!
//! In-memory SQLite gives every pooled connection its own database, so the
//! helpers create a real file under a [`TempDir`] instead.

mod test_coupons;
mod test_inventory;
mod test_lifecycle;

use std::sync::Arc;

use async_trait::async_trait;
use shared::clock::{Clock, ManualClock};
use shared::error::{CheckoutError, CouponError, InventoryError, OrderError};
use shared::models::{
    CartLine, CouponCreate, CouponKind, Order, OrderStatus, ReservationLine, UnitKey,
};
use tempfile::TempDir;
use tokio::sync::Mutex;

use crate::checkout::PlaceOrderRequest;
use crate::core::{Config, CoreError, ServerState};
use crate::db;
use crate::notify::NotificationDispatcher;

pub const START: i64 = 1_700_000_000_000;
pub const TTL: i64 = 900_000;

/// Dispatcher that records every notification for assertions.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub events: Mutex<Vec<(i64, OrderStatus)>>,
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn notify(&self, order: &Order, new_status: OrderStatus) -> anyhow::Result<()> {
        self.events.lock().await.push((order.id, new_status));
        Ok(())
    }
}

pub struct TestHarness {
    pub state: ServerState,
    pub clock: Arc<ManualClock>,
    pub dispatcher: Arc<RecordingDispatcher>,
    // Held so the database file outlives the harness.
    _dir: TempDir,
}

pub async fn harness() -> TestHarness {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let pool = db::init_pool(&url).await.unwrap();

    let clock = ManualClock::new(START);
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let config = Config {
        work_dir: dir.path().display().to_string(),
        http_port: 0,
        database_url: url,
        environment: "test".into(),
        reservation_ttl_secs: (TTL / 1000) as u64,
        reservation_sweep_secs: 3600,
        order_list_limit: 100,
    };
    let state = ServerState::with_parts(config, pool, clock.clone(), dispatcher.clone());
    TestHarness {
        state,
        clock,
        dispatcher,
        _dir: dir,
    }
}

impl TestHarness {
    pub async fn seed_stock(&self, product_id: i64, total: i64) {
        self.state
            .ledger
            .set_stock(UnitKey::product(product_id), total, "test", "seed")
            .await
            .unwrap();
    }

    pub async fn seed_coupon(&self, create: CouponCreate) {
        self.state.discounts.create_coupon(create).await.unwrap();
    }

    pub async fn available(&self, product_id: i64) -> i64 {
        self.state
            .reservations
            .available_stock(UnitKey::product(product_id))
            .await
            .unwrap()
    }

    pub async fn total(&self, product_id: i64) -> i64 {
        self.state
            .ledger
            .total_stock(UnitKey::product(product_id))
            .await
            .unwrap()
    }

    /// Seed stock and place a one-line order, returning it Pending.
    pub async fn place_simple_order(&self, product_id: i64, quantity: i64) -> Order {
        self.seed_stock(product_id, quantity * 10).await;
        self.state
            .checkout
            .place_order(order_request(vec![line(product_id, 10_000, quantity)], None))
            .await
            .unwrap()
    }
}

pub fn line(product_id: i64, unit_price: i64, quantity: i64) -> CartLine {
    CartLine {
        product_id,
        variant_id: None,
        name: format!("Product {product_id}"),
        category_id: None,
        unit_price,
        quantity,
    }
}

pub fn line_in_category(product_id: i64, category_id: i64, unit_price: i64, quantity: i64) -> CartLine {
    CartLine {
        category_id: Some(category_id),
        ..line(product_id, unit_price, quantity)
    }
}

pub fn hold(product_id: i64, quantity: i64) -> ReservationLine {
    ReservationLine {
        product_id,
        variant_id: None,
        quantity,
    }
}

pub fn order_request(lines: Vec<CartLine>, coupon_code: Option<&str>) -> PlaceOrderRequest {
    PlaceOrderRequest {
        user_id: Some(1),
        address_id: 1,
        lines,
        coupon_code: coupon_code.map(str::to_string),
        shipping_cost: 0,
    }
}

pub fn coupon_create(code: &str, kind: CouponKind, value: i64) -> CouponCreate {
    CouponCreate {
        code: code.to_string(),
        kind,
        value,
        is_active: None,
        starts_at: None,
        ends_at: None,
        max_uses: None,
        min_order_amount: None,
        max_uses_per_user: None,
        allowed_product_ids: None,
        allowed_category_ids: None,
    }
}

// Error unwrapping helpers: tests assert on the typed variant, not on
// message text.

pub fn inventory_err<T: std::fmt::Debug>(result: Result<T, CoreError>) -> InventoryError {
    match result.unwrap_err() {
        CoreError::Checkout(CheckoutError::Inventory(e)) => e,
        other => panic!("expected inventory error, got {other:?}"),
    }
}

pub fn coupon_err<T: std::fmt::Debug>(result: Result<T, CoreError>) -> CouponError {
    match result.unwrap_err() {
        CoreError::Checkout(CheckoutError::Coupon(e)) => e,
        other => panic!("expected coupon error, got {other:?}"),
    }
}

pub fn order_err<T: std::fmt::Debug>(result: Result<T, CoreError>) -> OrderError {
    match result.unwrap_err() {
        CoreError::Checkout(CheckoutError::Order(e)) => e,
        other => panic!("expected order error, got {other:?}"),
    }
}

pub fn checkout_err<T: std::fmt::Debug>(result: Result<T, CoreError>) -> CheckoutError {
    match result.unwrap_err() {
        CoreError::Checkout(e) => e,
        other => panic!("expected checkout error, got {other:?}"),
    }
}
