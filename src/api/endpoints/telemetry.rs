//! Live telemetry endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::SensorReading;
use crate::pipeline::telemetry::{AnalysisDraft, TelemetrySnapshot};

/// `GET /api/telemetry`: newest reading with trends.
pub async fn latest(State(ctx): State<ApiContext>) -> Result<Json<TelemetrySnapshot>, ApiError> {
    ctx.core
        .telemetry_snapshot()?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No telemetry received yet".into()))
}

/// `POST /api/telemetry`: push a reading into the feed.
pub async fn ingest(
    State(ctx): State<ApiContext>,
    body: Result<Json<SensorReading>, JsonRejection>,
) -> Result<Json<TelemetrySnapshot>, ApiError> {
    let Json(reading) = body?;
    Ok(Json(ctx.core.ingest(reading)?))
}

/// `GET /api/telemetry/draft`: form values from the newest reading.
pub async fn draft(State(ctx): State<ApiContext>) -> Result<Json<AnalysisDraft>, ApiError> {
    ctx.core
        .draft()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No telemetry received yet".into()))
}
