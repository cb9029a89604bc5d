//! Stock API handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{StockAdjustment, StockUnit, UnitKey};
use validator::Validate;

use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct UnitQuery {
    pub variant_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AvailableResponse {
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub total_stock: i64,
    pub available: i64,
}

/// Available-to-sell for one unit: total minus active holds.
pub async fn available(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Query(query): Query<UnitQuery>,
) -> AppResult<Json<AvailableResponse>> {
    let unit = UnitKey {
        product_id,
        variant_id: query.variant_id,
    };
    let total_stock = state.ledger.total_stock(unit).await?;
    let available = state.reservations.available_stock(unit).await?;
    Ok(Json(AvailableResponse {
        product_id,
        variant_id: query.variant_id,
        total_stock,
        available,
    }))
}

/// Raw ledger row for one unit.
pub async fn get_unit(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Query(query): Query<UnitQuery>,
) -> AppResult<Json<StockUnit>> {
    let unit = UnitKey {
        product_id,
        variant_id: query.variant_id,
    };
    let stock_unit = state
        .ledger
        .find_unit(unit)
        .await?
        .ok_or_else(|| crate::utils::AppError::not_found(format!(
            "Stock unit for product {product_id} not found"
        )))?;
    Ok(Json(stock_unit))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetStockRequest {
    pub variant_id: Option<i64>,
    #[validate(range(min = 0))]
    pub total_stock: i64,
    #[validate(length(min = 1))]
    pub actor: String,
    #[validate(length(min = 1))]
    pub reason: String,
}

/// Absolute set (admin bootstrap/correction). Creates the unit if needed.
pub async fn set_stock(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<SetStockRequest>,
) -> AppResult<Json<StockUnit>> {
    payload.validate()?;
    let unit = UnitKey {
        product_id,
        variant_id: payload.variant_id,
    };
    let stock_unit = state
        .ledger
        .set_stock(unit, payload.total_stock, &payload.actor, &payload.reason)
        .await?;
    Ok(Json(stock_unit))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdjustStockRequest {
    pub variant_id: Option<i64>,
    pub delta: i64,
    #[validate(length(min = 1))]
    pub actor: String,
    #[validate(length(min = 1))]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct AdjustStockResponse {
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub total_stock: i64,
}

/// Relative adjustment; rejected when the result would go negative.
pub async fn adjust_stock(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<AdjustStockRequest>,
) -> AppResult<Json<AdjustStockResponse>> {
    payload.validate()?;
    let unit = UnitKey {
        product_id,
        variant_id: payload.variant_id,
    };
    let total_stock = state
        .ledger
        .adjust_stock(unit, payload.delta, &payload.actor, &payload.reason)
        .await?;
    Ok(Json(AdjustStockResponse {
        product_id,
        variant_id: payload.variant_id,
        total_stock,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub variant_id: Option<i64>,
    #[serde(default = "default_log_limit")]
    pub limit: i64,
}

fn default_log_limit() -> i64 {
    50
}

/// Audit trail for one unit, newest first.
pub async fn adjustment_log(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Query(query): Query<LogQuery>,
) -> AppResult<Json<Vec<StockAdjustment>>> {
    let unit = UnitKey {
        product_id,
        variant_id: query.variant_id,
    };
    let log = state.ledger.adjustment_log(unit, query.limit).await?;
    Ok(Json(log))
}
