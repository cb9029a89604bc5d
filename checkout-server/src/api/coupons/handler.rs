//! Coupon API handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{CartLine, Coupon, CouponCreate};

use crate::core::ServerState;
use crate::discounts::PricedCoupon;
use crate::utils::{AppError, AppResult};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CouponCreate>,
) -> AppResult<Json<Coupon>> {
    let coupon = state.discounts.create_coupon(payload).await?;
    Ok(Json(coupon))
}

pub async fn get_by_code(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> AppResult<Json<Coupon>> {
    let coupon = state
        .discounts
        .find_by_code(&code)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Coupon {code} not found")))?;
    Ok(Json(coupon))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: String,
    pub user_id: Option<i64>,
    pub lines: Vec<CartLine>,
}

/// Dry-run validation and pricing. Consumes nothing; `used_count` only
/// moves on order placement.
pub async fn validate(
    State(state): State<ServerState>,
    Json(payload): Json<ValidateRequest>,
) -> AppResult<Json<PricedCoupon>> {
    let subtotal = shared::models::cart_subtotal(&payload.lines);
    let priced = state
        .discounts
        .price(&payload.code, subtotal, payload.user_id, &payload.lines)
        .await?;
    Ok(Json(priced))
}
