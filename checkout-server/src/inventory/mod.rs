//! Inventory: permanent stock bookkeeping and time-boxed holds.
//!
//! Two services share the inventory tables but never each other's columns:
//!
//! - [`StockLedger`] owns `total_stock` — mutated only by admin
//!   adjustments and order commit, with an audit row per mutation
//! - [`ReservationManager`] owns the holds that make
//!   `available = total - Σ active reservations` safe under concurrency

mod ledger;
mod reservation;

pub use ledger::StockLedger;
pub use reservation::ReservationManager;
