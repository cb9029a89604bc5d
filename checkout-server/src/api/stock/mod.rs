//! Stock API: availability reads plus the narrow admin write surface.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stock", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{product_id}/available", get(handler::available))
        .route("/{product_id}", get(handler::get_unit).put(handler::set_stock))
        .route("/{product_id}/adjust", post(handler::adjust_stock))
        .route("/{product_id}/log", get(handler::adjustment_log))
}
