//! Harvest volume projections

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FruitRecord;
use crate::validation::ValidationError;

/// Projected harvest volume for one scanned fruit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarvestEstimate {
    pub fruit_id: i32,
    #[serde(rename = "lat", with = "rust_decimal::serde::float")]
    pub latitude: Decimal,
    #[serde(rename = "long", with = "rust_decimal::serde::float")]
    pub longitude: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub original_volume: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub predicted_harvest_volume: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_diameter: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub major_mm: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub minor_mm: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub subminor_mm: Decimal,
}

/// Linear growth applied uniformly over a harvest window
///
/// The growth volume (`days_delta * growth_rate`) is computed once on
/// construction and added to every projected record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthProjection {
    days_delta: i64,
    growth_rate: Decimal,
    growth_volume: Decimal,
}

impl GrowthProjection {
    /// Returns `None` when the growth volume does not fit in a `Decimal`
    pub fn new(days_delta: i64, growth_rate: Decimal) -> Option<Self> {
        let growth_volume = Decimal::from(days_delta).checked_mul(growth_rate)?;
        Some(Self {
            days_delta,
            growth_rate,
            growth_volume,
        })
    }

    pub fn days_delta(&self) -> i64 {
        self.days_delta
    }

    /// Cubic millimeters gained per day
    pub fn growth_rate(&self) -> Decimal {
        self.growth_rate
    }

    /// Cubic millimeters gained over the whole window
    pub fn growth_volume(&self) -> Decimal {
        self.growth_volume
    }

    /// Project a single record to harvest time
    pub fn project(&self, fruit: &FruitRecord) -> Result<HarvestEstimate, ValidationError> {
        let predicted_harvest_volume = fruit
            .predicted_harvest_volume(self.growth_volume)
            .ok_or(ValidationError::GrowthVolumeOverflow)?;

        Ok(HarvestEstimate {
            fruit_id: fruit.id,
            latitude: fruit.position.latitude,
            longitude: fruit.position.longitude,
            original_volume: fruit.volume_mm,
            predicted_harvest_volume,
            average_diameter: fruit.average_diam_mm,
            major_mm: fruit.major_mm,
            minor_mm: fruit.minor_mm,
            subminor_mm: fruit.subminor_mm,
        })
    }

    /// Project every record, preserving input order
    ///
    /// Fails as a whole if any projected volume overflows.
    pub fn estimate(
        &self,
        fruits: &[FruitRecord],
    ) -> Result<Vec<HarvestEstimate>, ValidationError> {
        fruits.iter().map(|fruit| self.project(fruit)).collect()
    }
}
