//! Request parameter validation for harvest estimation
//!
//! Checks run fail-fast in a fixed order: presence of every required field,
//! date format, date order, numeric format, then numeric ranges.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{GrowthProjection, DEFAULT_HISTOGRAM_BINS, MAX_HISTOGRAM_BINS};
use crate::types::{DiameterRange, HarvestWindow};

/// Fields every estimation request must carry, in checking order
pub const REQUIRED_FIELDS: [&str; 5] = [
    "scan_date",
    "harvest_date",
    "growth_rate",
    "min_diameter",
    "max_diameter",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reasons a request's parameters are rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No JSON data provided")]
    MissingBody,

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid date format for {field}. Expected YYYY-MM-DD, got: {value}")]
    InvalidDateFormat { field: &'static str, value: String },

    #[error("Harvest date must be after scan date")]
    InvalidDateOrder,

    #[error("{0} must be a valid number")]
    InvalidNumber(&'static str),

    #[error("Growth rate must be non-negative")]
    NegativeGrowthRate,

    #[error("Diameter values must be non-negative")]
    NegativeDiameter,

    #[error("Minimum diameter must be less than maximum diameter")]
    InvalidDiameterRange,

    #[error("Projected harvest volumes are too large to represent")]
    GrowthVolumeOverflow,

    #[error("num_bins must be an integer between 1 and {}", MAX_HISTOGRAM_BINS)]
    InvalidBinCount,
}

impl ValidationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingBody => "MISSING_BODY",
            ValidationError::MissingParameter(_) => "MISSING_PARAMETER",
            ValidationError::InvalidDateFormat { .. } => "INVALID_DATE_FORMAT",
            ValidationError::InvalidDateOrder => "INVALID_DATE_ORDER",
            ValidationError::InvalidNumber(_) => "INVALID_NUMBER",
            ValidationError::NegativeGrowthRate => "NEGATIVE_GROWTH_RATE",
            ValidationError::NegativeDiameter => "NEGATIVE_DIAMETER",
            ValidationError::InvalidDiameterRange => "INVALID_DIAMETER_RANGE",
            ValidationError::GrowthVolumeOverflow => "GROWTH_VOLUME_OVERFLOW",
            ValidationError::InvalidBinCount => "INVALID_BIN_COUNT",
        }
    }

    /// Offending field, when the error concerns exactly one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingParameter(field)
            | ValidationError::InvalidNumber(field)
            | ValidationError::InvalidDateFormat { field, .. } => Some(*field),
            ValidationError::InvalidDateOrder => Some("harvest_date"),
            ValidationError::NegativeGrowthRate | ValidationError::GrowthVolumeOverflow => {
                Some("growth_rate")
            }
            ValidationError::InvalidDiameterRange => Some("min_diameter"),
            ValidationError::InvalidBinCount => Some("num_bins"),
            ValidationError::MissingBody | ValidationError::NegativeDiameter => None,
        }
    }
}

/// Validated, immutable parameters for one estimation request
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestParameters {
    window: HarvestWindow,
    diameter_range: DiameterRange,
    projection: GrowthProjection,
}

impl HarvestParameters {
    /// Build parameters from already-typed values, enforcing every invariant
    pub fn new(
        scan_date: NaiveDate,
        harvest_date: NaiveDate,
        growth_rate: Decimal,
        min_diameter: Decimal,
        max_diameter: Decimal,
    ) -> Result<Self, ValidationError> {
        let window = HarvestWindow::new(scan_date, harvest_date);
        if harvest_date <= scan_date {
            return Err(ValidationError::InvalidDateOrder);
        }
        if growth_rate < Decimal::ZERO {
            return Err(ValidationError::NegativeGrowthRate);
        }
        if min_diameter < Decimal::ZERO || max_diameter < Decimal::ZERO {
            return Err(ValidationError::NegativeDiameter);
        }
        if min_diameter >= max_diameter {
            return Err(ValidationError::InvalidDiameterRange);
        }
        let projection = GrowthProjection::new(window.days(), growth_rate)
            .ok_or(ValidationError::GrowthVolumeOverflow)?;

        Ok(Self {
            window,
            diameter_range: DiameterRange::new(min_diameter, max_diameter),
            projection,
        })
    }

    pub fn scan_date(&self) -> NaiveDate {
        self.window.scan_date
    }

    pub fn harvest_date(&self) -> NaiveDate {
        self.window.harvest_date
    }

    pub fn growth_rate(&self) -> Decimal {
        self.projection.growth_rate()
    }

    pub fn min_diameter(&self) -> Decimal {
        self.diameter_range.min
    }

    pub fn max_diameter(&self) -> Decimal {
        self.diameter_range.max
    }

    pub fn diameter_range(&self) -> &DiameterRange {
        &self.diameter_range
    }

    /// Whole days between scan and harvest, always at least 1
    pub fn days_delta(&self) -> i64 {
        self.projection.days_delta()
    }

    /// Growth volume added to every fruit (`days_delta * growth_rate`)
    pub fn growth_volume(&self) -> Decimal {
        self.projection.growth_volume()
    }

    pub fn projection(&self) -> &GrowthProjection {
        &self.projection
    }

    /// Normalized parameters echoed back to callers
    pub fn echo(&self) -> ParameterEcho {
        ParameterEcho {
            scan_date: self.scan_date(),
            harvest_date: self.harvest_date(),
            growth_rate: self.growth_rate(),
            min_diameter: self.min_diameter(),
            max_diameter: self.max_diameter(),
            days_delta: self.days_delta(),
            total_growth_per_fruit: self.growth_volume(),
            num_bins: None,
        }
    }
}

/// Parameters as reported in responses; dates serialize as ISO-8601
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterEcho {
    pub scan_date: NaiveDate,
    pub harvest_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub growth_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub min_diameter: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max_diameter: Decimal,
    pub days_delta: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_growth_per_fruit: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_bins: Option<u32>,
}

impl ParameterEcho {
    pub fn with_bins(mut self, num_bins: u32) -> Self {
        self.num_bins = Some(num_bins);
        self
    }
}

/// Validate an untyped request body into [`HarvestParameters`]
pub fn validate_parameters(data: &Value) -> Result<HarvestParameters, ValidationError> {
    let data = request_object(data)?;

    for field in REQUIRED_FIELDS {
        if !data.contains_key(field) {
            return Err(ValidationError::MissingParameter(field));
        }
    }

    let scan_date = parse_date(data, "scan_date")?;
    let harvest_date = parse_date(data, "harvest_date")?;
    if harvest_date <= scan_date {
        return Err(ValidationError::InvalidDateOrder);
    }

    let growth_rate = parse_number(data, "growth_rate")?;
    let min_diameter = parse_number(data, "min_diameter")?;
    let max_diameter = parse_number(data, "max_diameter")?;

    HarvestParameters::new(scan_date, harvest_date, growth_rate, min_diameter, max_diameter)
}

/// Validate the optional `num_bins` field of a histogram request
///
/// Absent or null means [`DEFAULT_HISTOGRAM_BINS`]. Anything other than an
/// integer in `1..=MAX_HISTOGRAM_BINS` is rejected rather than clamped.
pub fn validate_num_bins(data: &Value) -> Result<u32, ValidationError> {
    let data = request_object(data)?;
    let bins = match data.get("num_bins") {
        None | Some(Value::Null) => return Ok(DEFAULT_HISTOGRAM_BINS),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };

    bins.filter(|n| (1..=u64::from(MAX_HISTOGRAM_BINS)).contains(n))
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(ValidationError::InvalidBinCount)
}

/// Parse a date string in YYYY-MM-DD format
pub fn parse_date_str(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| ValidationError::InvalidDateFormat {
        field,
        value: raw.to_string(),
    })
}

/// Convert a float to a decimal through its shortest round-trip text
///
/// `0.1_f64` becomes exactly `0.1` rather than the nearest binary fraction.
/// Returns `None` for non-finite values or values outside `Decimal`'s range.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
}

/// Anything but a non-empty JSON object counts as no data
fn request_object(data: &Value) -> Result<&Map<String, Value>, ValidationError> {
    match data.as_object() {
        Some(map) if !map.is_empty() => Ok(map),
        _ => Err(ValidationError::MissingBody),
    }
}

fn parse_date(data: &Map<String, Value>, field: &'static str) -> Result<NaiveDate, ValidationError> {
    match &data[field] {
        Value::String(raw) => parse_date_str(field, raw),
        other => Err(ValidationError::InvalidDateFormat {
            field,
            value: other.to_string(),
        }),
    }
}

fn parse_number(data: &Map<String, Value>, field: &'static str) -> Result<Decimal, ValidationError> {
    let value = match &data[field] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    value
        .and_then(decimal_from_f64)
        .ok_or(ValidationError::InvalidNumber(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "scan_date": "2024-10-01",
            "harvest_date": "2024-10-11",
            "growth_rate": 1000.0,
            "min_diameter": 5.0,
            "max_diameter": 20.0
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut body = valid_body();
        body[field] = value;
        body
    }

    fn without(field: &str) -> Value {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove(field);
        body
    }

    #[test]
    fn test_valid_parameters() {
        let params = validate_parameters(&valid_body()).unwrap();
        assert_eq!(params.days_delta(), 10);
        assert_eq!(params.growth_rate(), Decimal::from(1000));
        assert_eq!(params.growth_volume(), Decimal::from(10_000));
        assert_eq!(params.min_diameter(), Decimal::from(5));
        assert_eq!(params.max_diameter(), Decimal::from(20));
    }

    #[test]
    fn test_body_must_be_object() {
        assert_eq!(validate_parameters(&Value::Null), Err(ValidationError::MissingBody));
        assert_eq!(validate_parameters(&json!([1, 2])), Err(ValidationError::MissingBody));
    }

    #[test]
    fn test_empty_object_is_missing_body() {
        assert_eq!(validate_parameters(&json!({})), Err(ValidationError::MissingBody));
        assert_eq!(
            validate_parameters(&json!({"unrelated": 1})),
            Err(ValidationError::MissingParameter("scan_date"))
        );
    }

    #[test]
    fn test_each_missing_field() {
        for field in REQUIRED_FIELDS {
            assert_eq!(
                validate_parameters(&without(field)),
                Err(ValidationError::MissingParameter(field))
            );
        }
    }

    #[test]
    fn test_missing_field_beats_negative_rate() {
        let mut body = with("growth_rate", json!(-5));
        body.as_object_mut().unwrap().remove("scan_date");
        assert_eq!(
            validate_parameters(&body),
            Err(ValidationError::MissingParameter("scan_date"))
        );
    }

    #[test]
    fn test_bad_date_format() {
        assert_eq!(
            validate_parameters(&with("scan_date", json!("10/01/2024"))),
            Err(ValidationError::InvalidDateFormat {
                field: "scan_date",
                value: "10/01/2024".to_string(),
            })
        );
        assert_eq!(
            validate_parameters(&with("harvest_date", json!(20241011))),
            Err(ValidationError::InvalidDateFormat {
                field: "harvest_date",
                value: "20241011".to_string(),
            })
        );
        assert_eq!(
            validate_parameters(&with("harvest_date", json!("2024-02-30"))),
            Err(ValidationError::InvalidDateFormat {
                field: "harvest_date",
                value: "2024-02-30".to_string(),
            })
        );
    }

    #[test]
    fn test_null_date_is_a_format_error() {
        assert_eq!(
            validate_parameters(&with("scan_date", Value::Null)),
            Err(ValidationError::InvalidDateFormat {
                field: "scan_date",
                value: "null".to_string(),
            })
        );
    }

    #[test]
    fn test_date_order() {
        let body = json!({
            "scan_date": "2024-10-11",
            "harvest_date": "2024-10-01",
            "growth_rate": 1000.0,
            "min_diameter": 5.0,
            "max_diameter": 20.0
        });
        assert_eq!(validate_parameters(&body), Err(ValidationError::InvalidDateOrder));

        let same_day = with("harvest_date", json!("2024-10-01"));
        assert_eq!(validate_parameters(&same_day), Err(ValidationError::InvalidDateOrder));
    }

    #[test]
    fn test_date_order_checked_before_numbers() {
        let mut body = with("harvest_date", json!("2024-09-01"));
        body["growth_rate"] = json!("fast");
        assert_eq!(validate_parameters(&body), Err(ValidationError::InvalidDateOrder));
    }

    #[test]
    fn test_non_numeric_values() {
        assert_eq!(
            validate_parameters(&with("growth_rate", json!("fast"))),
            Err(ValidationError::InvalidNumber("growth_rate"))
        );
        assert_eq!(
            validate_parameters(&with("min_diameter", json!(true))),
            Err(ValidationError::InvalidNumber("min_diameter"))
        );
        // Booleans are not coerced to 0 or 1
        assert_eq!(
            validate_parameters(&with("growth_rate", json!(true))),
            Err(ValidationError::InvalidNumber("growth_rate"))
        );
        assert_eq!(
            validate_parameters(&with("max_diameter", Value::Null)),
            Err(ValidationError::InvalidNumber("max_diameter"))
        );
        assert_eq!(
            validate_parameters(&with("growth_rate", json!("NaN"))),
            Err(ValidationError::InvalidNumber("growth_rate"))
        );
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let params = validate_parameters(&with("growth_rate", json!(" 12.5 "))).unwrap();
        assert_eq!(params.growth_rate(), Decimal::new(125, 1));
    }

    #[test]
    fn test_negative_growth_rate() {
        assert_eq!(
            validate_parameters(&with("growth_rate", json!(-0.5))),
            Err(ValidationError::NegativeGrowthRate)
        );
    }

    #[test]
    fn test_negative_diameter() {
        assert_eq!(
            validate_parameters(&with("min_diameter", json!(-1))),
            Err(ValidationError::NegativeDiameter)
        );
    }

    #[test]
    fn test_inverted_diameter_range() {
        let mut body = with("min_diameter", json!(20));
        body["max_diameter"] = json!(5);
        assert_eq!(validate_parameters(&body), Err(ValidationError::InvalidDiameterRange));

        let equal = with("min_diameter", json!(20.0));
        assert_eq!(validate_parameters(&equal), Err(ValidationError::InvalidDiameterRange));
    }

    #[test]
    fn test_out_of_range_rate_is_not_a_number() {
        assert_eq!(
            validate_parameters(&with("growth_rate", json!(1e300))),
            Err(ValidationError::InvalidNumber("growth_rate"))
        );
    }

    #[test]
    fn test_float_rate_converts_exactly() {
        let params = validate_parameters(&with("growth_rate", json!(0.1))).unwrap();
        assert_eq!(params.growth_rate(), Decimal::new(1, 1));
        assert_eq!(params.growth_volume(), Decimal::ONE);
    }

    #[test]
    fn test_num_bins_default_and_bounds() {
        assert_eq!(validate_num_bins(&valid_body()), Ok(DEFAULT_HISTOGRAM_BINS));
        assert_eq!(validate_num_bins(&with("num_bins", Value::Null)), Ok(20));
        assert_eq!(validate_num_bins(&with("num_bins", json!(5))), Ok(5));
        assert_eq!(validate_num_bins(&with("num_bins", json!("8"))), Ok(8));
        assert_eq!(validate_num_bins(&with("num_bins", json!(1000))), Ok(1000));

        for bad in [json!(0), json!(-3), json!(2.5), json!(1001), json!("many"), json!([])] {
            assert_eq!(
                validate_num_bins(&with("num_bins", bad)),
                Err(ValidationError::InvalidBinCount)
            );
        }
    }

    #[test]
    fn test_echo_reports_normalized_values() {
        let echo = validate_parameters(&valid_body()).unwrap().echo().with_bins(12);
        let json = serde_json::to_value(&echo).unwrap();

        assert_eq!(json["scan_date"], json!("2024-10-01"));
        assert_eq!(json["harvest_date"], json!("2024-10-11"));
        assert_eq!(json["days_delta"], json!(10));
        assert_eq!(json["total_growth_per_fruit"], json!(10000.0));
        assert_eq!(json["growth_rate"], json!(1000.0));
        assert_eq!(json["num_bins"], json!(12));
    }

    #[test]
    fn test_error_codes_and_fields() {
        let err = ValidationError::MissingParameter("growth_rate");
        assert_eq!(err.code(), "MISSING_PARAMETER");
        assert_eq!(err.field(), Some("growth_rate"));
        assert_eq!(err.to_string(), "Missing required parameter: growth_rate");
        assert_eq!(ValidationError::NegativeDiameter.field(), None);
    }
}
