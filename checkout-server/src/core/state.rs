//! Server state: one handle per service, cloned into every request.

use std::sync::Arc;

use shared::clock::{Clock, SystemClock};
use sqlx::SqlitePool;

use crate::checkout::CheckoutService;
use crate::core::Config;
use crate::db;
use crate::discounts::DiscountEngine;
use crate::inventory::{ReservationManager, StockLedger};
use crate::notify::{NotificationDispatcher, TracingDispatcher};
use crate::orders::OrderLifecycle;

/// Shared application state.
///
/// Every field is either `Clone`-cheap (pool-backed services) or behind an
/// `Arc`, so handlers receive the whole state by value.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub clock: Arc<dyn Clock>,
    pub ledger: StockLedger,
    pub reservations: ReservationManager,
    pub discounts: DiscountEngine,
    pub lifecycle: OrderLifecycle,
    pub checkout: CheckoutService,
}

impl ServerState {
    /// Open the database and wire every service to it, with the system
    /// clock and the tracing notification dispatcher.
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let pool = db::init_pool(&config.database_url).await?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let dispatcher: Arc<dyn NotificationDispatcher> = Arc::new(TracingDispatcher);
        Ok(Self::with_parts(config.clone(), pool, clock, dispatcher))
    }

    /// Assemble state from explicit parts. Tests use this with a
    /// `ManualClock` and a capturing dispatcher.
    pub fn with_parts(
        config: Config,
        pool: SqlitePool,
        clock: Arc<dyn Clock>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let ledger = StockLedger::new(pool.clone(), clock.clone());
        let reservations = ReservationManager::new(pool.clone(), clock.clone());
        let discounts = DiscountEngine::new(pool.clone(), clock.clone());
        let lifecycle = OrderLifecycle::new(pool.clone(), clock.clone(), dispatcher.clone());
        let checkout = CheckoutService::new(
            pool.clone(),
            clock.clone(),
            reservations.clone(),
            discounts.clone(),
            lifecycle.clone(),
            dispatcher,
            &config,
        );
        Self {
            config,
            pool,
            clock,
            ledger,
            reservations,
            discounts,
            lifecycle,
            checkout,
        }
    }

    /// Start the periodic reservation sweep.
    pub fn start_background_tasks(&self) {
        crate::core::tasks::spawn_reservation_sweep(self.clone());
    }
}
