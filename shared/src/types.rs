//! Common types used across the platform

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates of a scanned fruit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    #[serde(with = "rust_decimal::serde::float")]
    pub latitude: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Inclusive band of average diameters in millimeters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DiameterRange {
    #[serde(with = "rust_decimal::serde::float")]
    pub min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max: Decimal,
}

impl DiameterRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Check whether a diameter falls inside the band, both ends inclusive
    pub fn contains(&self, diameter: Decimal) -> bool {
        diameter >= self.min && diameter <= self.max
    }
}

/// Scan and harvest dates bounding a projection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarvestWindow {
    pub scan_date: NaiveDate,
    pub harvest_date: NaiveDate,
}

impl HarvestWindow {
    pub fn new(scan_date: NaiveDate, harvest_date: NaiveDate) -> Self {
        Self {
            scan_date,
            harvest_date,
        }
    }

    /// Whole days between scan and harvest
    pub fn days(&self) -> i64 {
        (self.harvest_date - self.scan_date).num_days()
    }
}
