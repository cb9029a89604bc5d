//! Storefront checkout consistency core.
//!
//! The one subsystem of the storefront with real concurrency invariants:
//! inventory holds during checkout, coupon validation and pricing, and the
//! order status lifecycle with its return sub-workflow. Everything else
//! (catalog, auth, payments themselves) lives upstream and talks to this
//! service over HTTP.
//!
//! # Module structure
//!
//! ```text
//! checkout-server/src/
//! ├── core/         # config, state, server, errors
//! ├── db/           # pool bootstrap, write transactions, repositories
//! ├── inventory/    # stock ledger + reservation manager
//! ├── discounts/    # coupon validation chain and discount math
//! ├── orders/       # status machine, return sub-machine, controller
//! ├── checkout/     # place-order orchestration, payment callbacks
//! ├── notify/       # notification dispatcher trait
//! ├── api/          # HTTP routes and handlers
//! └── utils/        # error mapping, logging setup
//! ```

pub mod api;
pub mod checkout;
pub mod core;
pub mod db;
pub mod discounts;
pub mod inventory;
pub mod notify;
pub mod orders;
pub mod utils;

pub use checkout::CheckoutService;
pub use core::{Config, Server, ServerState};
pub use discounts::DiscountEngine;
pub use inventory::{ReservationManager, StockLedger};
pub use orders::OrderLifecycle;
pub use utils::{AppError, AppResult};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, create the work directory, and initialize logging.
pub fn setup_environment(config: &Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.work_dir)?;
    if config.is_production() {
        let log_dir = std::path::Path::new(&config.work_dir).join("logs");
        let guard = init_logger_with_file("info", true, &log_dir)?;
        // Leak the guard so the appender lives for the process lifetime.
        std::mem::forget(guard);
    } else {
        init_logger("debug")?;
    }
    Ok(())
}
