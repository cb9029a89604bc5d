//! Discount Engine: coupon validation and pricing.
//!
//! Split like the pricing layer it replaces: [`matcher`] holds the pure
//! predicates (activity window, allow-list eligibility), [`engine`] owns
//! the ordered validation chain, the discount math and the atomic
//! redemption commit.

pub mod engine;
pub mod matcher;

pub use engine::{DiscountEngine, PricedCoupon};
