//! Shared domain types for the storefront checkout core.
//!
//! This crate holds everything both the server and its clients need to
//! agree on:
//!
//! - **Models** (`models`): stock units, reservations, coupons, orders and
//!   return requests, plus their create payloads
//! - **Errors** (`error`): the typed failure taxonomy for inventory,
//!   discount and lifecycle operations
//! - **Clock** (`clock`): injected time source so every component can be
//!   driven by a deterministic clock in tests
//!
//! Money is represented as `i64` minor units throughout; timestamps are
//! Unix milliseconds.

pub mod clock;
pub mod error;
pub mod models;
pub mod util;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CheckoutError, CouponError, InventoryError, OrderError};
