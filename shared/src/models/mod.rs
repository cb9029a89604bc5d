//! Domain models.
//!
//! Entities derive `sqlx::FromRow`/`sqlx::Type` behind the `db` feature so
//! client-side consumers don't pull in the database stack.

pub mod cart;
pub mod coupon;
pub mod order;
pub mod reservation;
pub mod return_request;
pub mod stock;

pub use cart::{CartLine, cart_subtotal};
pub use coupon::{Coupon, CouponCreate, CouponKind};
pub use order::{Order, OrderItem, OrderStatus, OrderUpdate, PaymentState};
pub use reservation::{Reservation, ReservationBatch, ReservationLine};
pub use return_request::{ReturnDecision, ReturnItem, ReturnRequest, ReturnRequestCreate, ReturnStatus};
pub use stock::{StockAdjustment, StockUnit, UnitKey};
