//! HTTP API routes.
//!
//! # Structure
//!
//! - [`health`] - liveness check
//! - [`stock`] - stock levels, admin adjustments, audit log
//! - [`reservations`] - checkout holds
//! - [`coupons`] - coupon admin and validation
//! - [`checkout`] - order placement and the payment callback
//! - [`orders`] - order lifecycle and return requests
//!
//! Authentication is an upstream concern; these routes are mounted behind
//! the storefront gateway.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub mod checkout;
pub mod coupons;
pub mod health;
pub mod orders;
pub mod reservations;
pub mod stock;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResponse, AppResult};

/// Build a router with all routes registered (no middleware, no state).
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(stock::router())
        .merge(reservations::router())
        .merge(coupons::router())
        .merge(checkout::router())
        .merge(orders::router())
}

/// Fully configured application: routes, middleware, state.
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
