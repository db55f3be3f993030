//! Summary statistics over predicted harvest volumes

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::HarvestEstimate;
use crate::validation::ValidationError;

/// Count, mean, sum and extremes of predicted volume plus mean diameter
///
/// Every field is zero when nothing matched; none is ever null.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HarvestStatistics {
    pub count: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_predicted_volume: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_predicted_volume: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_diameter: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub min_predicted_volume: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max_predicted_volume: Decimal,
}

impl HarvestStatistics {
    /// Statistics for an empty match
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derive statistics from estimates that are already materialized
    pub fn from_estimates(estimates: &[HarvestEstimate]) -> Result<Self, ValidationError> {
        let acc = estimates
            .iter()
            .try_fold(StatisticsAccumulator::default(), |mut acc, estimate| {
                acc.push(estimate.predicted_harvest_volume, estimate.average_diameter)?;
                Ok::<_, ValidationError>(acc)
            })?;
        Ok(acc.finish())
    }

    /// Build statistics from the columns of a store-side aggregate
    ///
    /// Aggregate functions yield NULL over zero rows, so any missing column
    /// or a zero count collapses to [`HarvestStatistics::empty`].
    pub fn from_aggregate(
        count: i64,
        average_predicted_volume: Option<Decimal>,
        total_predicted_volume: Option<Decimal>,
        average_diameter: Option<Decimal>,
        min_predicted_volume: Option<Decimal>,
        max_predicted_volume: Option<Decimal>,
    ) -> Self {
        match (
            count,
            average_predicted_volume,
            total_predicted_volume,
            average_diameter,
            min_predicted_volume,
            max_predicted_volume,
        ) {
            (count, Some(average), Some(total), Some(diameter), Some(min), Some(max))
                if count > 0 =>
            {
                Self {
                    count,
                    average_predicted_volume: average,
                    total_predicted_volume: total,
                    average_diameter: diameter,
                    min_predicted_volume: min,
                    max_predicted_volume: max,
                }
            }
            _ => Self::empty(),
        }
    }
}

/// Single-pass accumulator shared by in-memory aggregation paths
#[derive(Debug, Clone, Default)]
pub struct StatisticsAccumulator {
    count: i64,
    total_volume: Decimal,
    total_diameter: Decimal,
    min_volume: Option<Decimal>,
    max_volume: Option<Decimal>,
}

impl StatisticsAccumulator {
    /// Add one record; running totals that leave the `Decimal` range fail
    /// with [`ValidationError::GrowthVolumeOverflow`] and leave `self` unchanged
    pub fn push(
        &mut self,
        predicted_volume: Decimal,
        average_diameter: Decimal,
    ) -> Result<(), ValidationError> {
        let total_volume = self
            .total_volume
            .checked_add(predicted_volume)
            .ok_or(ValidationError::GrowthVolumeOverflow)?;
        let total_diameter = self
            .total_diameter
            .checked_add(average_diameter)
            .ok_or(ValidationError::GrowthVolumeOverflow)?;

        self.count += 1;
        self.total_volume = total_volume;
        self.total_diameter = total_diameter;
        self.min_volume = Some(
            self.min_volume
                .map_or(predicted_volume, |m| m.min(predicted_volume)),
        );
        self.max_volume = Some(
            self.max_volume
                .map_or(predicted_volume, |m| m.max(predicted_volume)),
        );
        Ok(())
    }

    pub fn finish(self) -> HarvestStatistics {
        let (Some(min), Some(max)) = (self.min_volume, self.max_volume) else {
            return HarvestStatistics::empty();
        };
        let count = Decimal::from(self.count);

        HarvestStatistics {
            count: self.count,
            average_predicted_volume: self.total_volume / count,
            total_predicted_volume: self.total_volume,
            average_diameter: self.total_diameter / count,
            min_predicted_volume: min,
            max_predicted_volume: max,
        }
    }
}

/// Statistics returned with an estimate listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstimateSummary {
    #[serde(flatten)]
    pub statistics: HarvestStatistics,
    pub days_between_scan_and_harvest: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_growth_per_fruit: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn estimate(predicted: &str, diameter: &str) -> HarvestEstimate {
        HarvestEstimate {
            fruit_id: 1,
            latitude: Decimal::ZERO,
            longitude: Decimal::ZERO,
            original_volume: dec(predicted),
            predicted_harvest_volume: dec(predicted),
            average_diameter: dec(diameter),
            major_mm: Decimal::ZERO,
            minor_mm: Decimal::ZERO,
            subminor_mm: Decimal::ZERO,
        }
    }

    #[test]
    fn test_from_estimates() {
        let stats = HarvestStatistics::from_estimates(&[
            estimate("100", "10"),
            estimate("300", "14"),
            estimate("200", "12"),
        ])
        .unwrap();

        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_predicted_volume, dec("600"));
        assert_eq!(stats.average_predicted_volume, dec("200"));
        assert_eq!(stats.average_diameter, dec("12"));
        assert_eq!(stats.min_predicted_volume, dec("100"));
        assert_eq!(stats.max_predicted_volume, dec("300"));
    }

    #[test]
    fn test_from_estimates_empty_is_all_zero() {
        let stats = HarvestStatistics::from_estimates(&[]).unwrap();
        assert_eq!(stats, HarvestStatistics::empty());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.average_predicted_volume, Decimal::ZERO);
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let huge = "70000000000000000000000005000";
        let result =
            HarvestStatistics::from_estimates(&[estimate(huge, "10"), estimate(huge, "12")]);
        assert_eq!(result, Err(ValidationError::GrowthVolumeOverflow));

        let mut acc = StatisticsAccumulator::default();
        acc.push(dec(huge), dec("10")).unwrap();
        assert!(acc.push(dec(huge), dec("12")).is_err());
        assert_eq!(acc.finish().count, 1);
    }

    #[test]
    fn test_from_aggregate_null_columns() {
        let stats = HarvestStatistics::from_aggregate(0, None, None, None, None, None);
        assert_eq!(stats, HarvestStatistics::empty());
    }

    #[test]
    fn test_from_aggregate_populated() {
        let stats = HarvestStatistics::from_aggregate(
            2,
            Some(dec("150")),
            Some(dec("300")),
            Some(dec("11")),
            Some(dec("100")),
            Some(dec("200")),
        );
        assert_eq!(stats.count, 2);
        assert_eq!(stats.total_predicted_volume, dec("300"));
    }

    #[test]
    fn test_empty_serializes_zeros_not_nulls() {
        let json = serde_json::to_value(HarvestStatistics::empty()).unwrap();
        assert_eq!(json["count"], serde_json::json!(0));
        assert_eq!(json["average_predicted_volume"], serde_json::json!(0.0));
        assert_eq!(json["max_predicted_volume"], serde_json::json!(0.0));
    }

    #[test]
    fn test_summary_flattens_statistics() {
        let summary = EstimateSummary {
            statistics: HarvestStatistics::empty(),
            days_between_scan_and_harvest: 10,
            total_growth_per_fruit: dec("10000"),
        };
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["count"], serde_json::json!(0));
        assert_eq!(json["days_between_scan_and_harvest"], serde_json::json!(10));
        assert_eq!(json["total_growth_per_fruit"], serde_json::json!(10000.0));
    }
}
