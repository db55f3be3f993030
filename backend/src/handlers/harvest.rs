//! Harvest estimation HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;

use super::ApiResponse;
use crate::services::HarvestEstimationService;
use crate::AppState;

/// A missing or unparseable JSON body becomes `null` and is rejected by
/// validation as `MISSING_BODY`
fn request_body(body: Option<Json<Value>>) -> Value {
    body.map(|Json(value)| value).unwrap_or(Value::Null)
}

/// Calculate harvest estimates for fruits within the diameter range
pub async fn get_harvest_estimate(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> impl IntoResponse {
    let service = HarvestEstimationService::new(state.store.clone());

    match service.estimate(&request_body(body)).await {
        Ok(listing) => (StatusCode::OK, Json(ApiResponse::success(listing))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get histogram data for predicted harvest volumes
pub async fn get_harvest_histogram(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> impl IntoResponse {
    let service = HarvestEstimationService::new(state.store.clone());

    match service.histogram(&request_body(body)).await {
        Ok(view) => (StatusCode::OK, Json(ApiResponse::success(view))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get summary statistics aggregated by the record store
pub async fn get_harvest_statistics(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> impl IntoResponse {
    let service = HarvestEstimationService::new(state.store.clone());

    match service.statistics(&request_body(body)).await {
        Ok(view) => (StatusCode::OK, Json(ApiResponse::success(view))).into_response(),
        Err(e) => e.into_response(),
    }
}
