//! WebAssembly module for Fruit Harvest Estimation
//!
//! Provides client-side computation for:
//! - Request parameter validation
//! - Harvest volume projection
//! - Offline estimation over cached fruit records
//! - Predicted volume histograms

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Offline estimation result
#[derive(Serialize)]
struct OfflineEstimate {
    fruits: Vec<HarvestEstimate>,
    statistics: HarvestStatistics,
    parameters: ParameterEcho,
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Validate a request body and return the normalized parameters as JSON
#[wasm_bindgen]
pub fn validate_harvest_parameters(request_json: &str) -> Result<String, JsValue> {
    let data: Value = serde_json::from_str(request_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid request JSON: {}", e)))?;

    let params = validate_parameters(&data).map_err(js_error)?;
    to_json(&params.echo())
}

/// Predict a single fruit's harvest volume in cubic millimeters
#[wasm_bindgen]
pub fn predict_harvest_volume(
    volume_mm: f64,
    days_delta: i32,
    growth_rate: f64,
) -> Result<f64, JsValue> {
    let predicted = projected_volume(volume_mm, days_delta, growth_rate).map_err(js_error)?;
    Ok(predicted.to_f64().unwrap_or(f64::NAN))
}

/// Checked projection; `days_delta` must be at least one
fn projected_volume(
    volume_mm: f64,
    days_delta: i32,
    growth_rate: f64,
) -> Result<Decimal, ValidationError> {
    let volume =
        decimal_from_f64(volume_mm).ok_or(ValidationError::InvalidNumber("volume_mm"))?;
    let rate =
        decimal_from_f64(growth_rate).ok_or(ValidationError::InvalidNumber("growth_rate"))?;
    if days_delta < 1 {
        return Err(ValidationError::InvalidDateOrder);
    }
    if rate < Decimal::ZERO {
        return Err(ValidationError::NegativeGrowthRate);
    }

    let projection = GrowthProjection::new(i64::from(days_delta), rate)
        .ok_or(ValidationError::GrowthVolumeOverflow)?;
    volume
        .checked_add(projection.growth_volume())
        .ok_or(ValidationError::GrowthVolumeOverflow)
}

/// Project cached fruit records without a server round trip
///
/// Records outside the requested diameter range are skipped; the rest keep
/// their input order.
#[wasm_bindgen]
pub fn estimate_cached_fruits(request_json: &str, fruits_json: &str) -> Result<String, JsValue> {
    let data: Value = serde_json::from_str(request_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid request JSON: {}", e)))?;
    let fruits: Vec<FruitRecord> = serde_json::from_str(fruits_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid fruits JSON: {}", e)))?;

    let params = validate_parameters(&data).map_err(js_error)?;
    let matching: Vec<FruitRecord> = fruits
        .into_iter()
        .filter(|f| params.diameter_range().contains(f.average_diam_mm))
        .collect();

    let estimates = params.projection().estimate(&matching).map_err(js_error)?;
    let statistics = HarvestStatistics::from_estimates(&estimates).map_err(js_error)?;

    to_json(&OfflineEstimate {
        fruits: estimates,
        statistics,
        parameters: params.echo(),
    })
}

/// Bucket a JSON array of predicted volumes into equal-width bins
#[wasm_bindgen]
pub fn build_volume_histogram(volumes_json: &str, num_bins: u32) -> Result<String, JsValue> {
    let raw: Vec<f64> = serde_json::from_str(volumes_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid volumes JSON: {}", e)))?;

    to_json(&volume_histogram(&raw, num_bins).map_err(js_error)?)
}

/// Negative or non-finite volumes are rejected
fn volume_histogram(raw: &[f64], num_bins: u32) -> Result<Vec<HistogramBin>, ValidationError> {
    if !(1..=MAX_HISTOGRAM_BINS).contains(&num_bins) {
        return Err(ValidationError::InvalidBinCount);
    }

    let volumes = raw
        .iter()
        .map(|&v| decimal_from_f64(v).filter(|d| *d >= Decimal::ZERO))
        .collect::<Option<Vec<Decimal>>>()
        .ok_or(ValidationError::InvalidNumber("volumes"))?;

    Ok(build_histogram(&volumes, num_bins))
}
