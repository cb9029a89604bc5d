//! Checkout API handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::Order;

use crate::checkout::{PaymentCallback, PlaceOrderRequest};
use crate::core::ServerState;
use crate::utils::AppResult;

pub async fn place_order(
    State(state): State<ServerState>,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<Json<Order>> {
    let order = state.checkout.place_order(payload).await?;
    Ok(Json(order))
}

/// Payment-gateway callback. Duplicate deliveries get the settled order
/// back with 200, never an error — that is what stops gateway retries.
pub async fn payment_callback(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
    Json(payload): Json<PaymentCallback>,
) -> AppResult<Json<Order>> {
    let order = state.checkout.settle_payment(order_id, payload).await?;
    Ok(Json(order))
}
