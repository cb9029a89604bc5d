//! Core error type for the service layer.
//!
//! Services return [`CoreError`]: either a typed domain failure from the
//! shared taxonomy (which callers can switch on) or a storage failure from
//! the repository layer. HTTP mapping happens once, in
//! [`crate::utils::error`].

use shared::error::{CheckoutError, CouponError, InventoryError, OrderError};
use thiserror::Error;

use crate::db::repository::RepoError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Storage(#[from] RepoError),
}

impl From<InventoryError> for CoreError {
    fn from(err: InventoryError) -> Self {
        Self::Checkout(CheckoutError::Inventory(err))
    }
}

impl From<CouponError> for CoreError {
    fn from(err: CouponError) -> Self {
        Self::Checkout(CheckoutError::Coupon(err))
    }
}

impl From<OrderError> for CoreError {
    fn from(err: OrderError) -> Self {
        Self::Checkout(CheckoutError::Order(err))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
