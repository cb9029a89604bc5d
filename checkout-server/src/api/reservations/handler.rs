//! Reservation API handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{ReservationBatch, ReservationLine};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub lines: Vec<ReservationLine>,
    /// Overrides the configured default hold duration when present.
    pub ttl_secs: Option<u64>,
}

pub async fn reserve(
    State(state): State<ServerState>,
    Json(payload): Json<ReserveRequest>,
) -> AppResult<Json<ReservationBatch>> {
    if payload.lines.is_empty() {
        return Err(AppError::validation("reservation has no lines"));
    }
    if payload.lines.iter().any(|l| l.quantity < 0) {
        return Err(AppError::validation("negative reservation quantity"));
    }
    let ttl_millis = payload
        .ttl_secs
        .map(|s| s as i64 * 1000)
        .unwrap_or_else(|| state.config.reservation_ttl_millis());
    let batch = state.reservations.reserve(&payload.lines, ttl_millis).await?;
    Ok(Json(batch))
}

/// Active holds in a batch; expired rows are already invisible.
pub async fn get_batch(
    State(state): State<ServerState>,
    Path(batch_id): Path<String>,
) -> AppResult<Json<Vec<shared::models::Reservation>>> {
    let holds = state.reservations.find_batch(&batch_id).await?;
    Ok(Json(holds))
}

#[derive(Debug, Deserialize)]
pub struct ReleaseLinesRequest {
    pub lines: Vec<ReservationLine>,
}

#[derive(Debug, Serialize)]
pub struct ReleaseLinesResponse {
    pub released: u64,
}

/// Release holds by unit when the client lost the batch id.
pub async fn release_lines(
    State(state): State<ServerState>,
    Json(payload): Json<ReleaseLinesRequest>,
) -> AppResult<Json<ReleaseLinesResponse>> {
    if payload.lines.is_empty() {
        return Err(AppError::validation("release has no lines"));
    }
    let released = state.reservations.release(&payload.lines).await?;
    Ok(Json(ReleaseLinesResponse { released }))
}

#[derive(Debug, Serialize)]
pub struct ReleaseResponse {
    pub batch_id: String,
    pub released: u64,
}

pub async fn release(
    State(state): State<ServerState>,
    Path(batch_id): Path<String>,
) -> AppResult<Json<ReleaseResponse>> {
    let released = state.reservations.release_batch(&batch_id).await?;
    Ok(Json(ReleaseResponse { batch_id, released }))
}

#[derive(Debug, Deserialize)]
pub struct ExtendRequest {
    pub ttl_secs: Option<u64>,
}

pub async fn extend(
    State(state): State<ServerState>,
    Path(batch_id): Path<String>,
    Json(payload): Json<ExtendRequest>,
) -> AppResult<Json<ReservationBatch>> {
    let ttl_millis = payload
        .ttl_secs
        .map(|s| s as i64 * 1000)
        .unwrap_or_else(|| state.config.reservation_ttl_millis());
    let batch = state.reservations.extend_batch(&batch_id, ttl_millis).await?;
    Ok(Json(batch))
}
