//! Scanned fruit records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::GpsCoordinates;

/// A scanned fruit as persisted by the ingestion pipeline
///
/// `volume_mm` and `average_diam_mm` are derived from the three axes when the
/// record is written and are read back as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FruitRecord {
    pub id: i32,
    pub position: GpsCoordinates,
    pub major_mm: Decimal,
    pub minor_mm: Decimal,
    pub subminor_mm: Decimal,
    /// Volume at scan time in cubic millimeters
    pub volume_mm: Decimal,
    /// Mean of the three axes in millimeters
    pub average_diam_mm: Decimal,
}

impl FruitRecord {
    /// Volume expected at harvest after adding the accrued growth
    ///
    /// `None` when the sum does not fit in a `Decimal`.
    pub fn predicted_harvest_volume(&self, growth_volume: Decimal) -> Option<Decimal> {
        self.volume_mm.checked_add(growth_volume)
    }
}
