//! Order API handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::models::{
    Order, OrderStatus, OrderUpdate, ReturnDecision, ReturnRequest, ReturnRequestCreate,
};

use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let limit = query
        .limit
        .unwrap_or(state.config.order_list_limit)
        .clamp(1, state.config.order_list_limit);
    let orders = state.lifecycle.list_orders(query.status, limit).await?;
    Ok(Json(orders))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = state.lifecycle.get_order(id).await?;
    Ok(Json(order))
}

/// Apply one tagged update: set_status, set_tracking or
/// set_estimated_delivery.
pub async fn transition(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<Order>> {
    let order = state.lifecycle.apply_update(id, payload).await?;
    Ok(Json(order))
}

/// Administrative hard delete; return requests cascade.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.lifecycle.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_return(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReturnRequestCreate>,
) -> AppResult<Json<ReturnRequest>> {
    let request = state.lifecycle.create_return(id, payload).await?;
    Ok(Json(request))
}

pub async fn list_returns(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<ReturnRequest>>> {
    let requests = state.lifecycle.list_returns(id).await?;
    Ok(Json(requests))
}

pub async fn decide_return(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReturnDecision>,
) -> AppResult<Json<ReturnRequest>> {
    let request = state.lifecycle.decide_return(id, payload).await?;
    Ok(Json(request))
}
