//! Reservation API: create, release and extend checkout holds.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::reserve).delete(handler::release_lines))
        .route(
            "/{batch_id}",
            get(handler::get_batch).delete(handler::release),
        )
        .route("/{batch_id}/extend", post(handler::extend))
}
