//! Order API: lifecycle queries and transitions, return requests and
//! their decisions.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/orders", routes())
        .route("/api/returns/{id}/decision", post(handler::decide_return))
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/transition", post(handler::transition))
        .route(
            "/{id}/returns",
            get(handler::list_returns).post(handler::create_return),
        )
}
