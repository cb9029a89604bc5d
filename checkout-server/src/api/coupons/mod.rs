//! Coupon API: admin creation, lookup, and cart validation.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/coupons", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/validate", post(handler::validate))
        .route("/{code}", get(handler::get_by_code))
}
