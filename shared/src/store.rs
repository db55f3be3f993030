//! Read-only access to scanned fruit records

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{FruitRecord, HarvestStatistics, StatisticsAccumulator};
use crate::types::DiameterRange;

/// Failures reaching or querying the record store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Connection refused, timed out, or pool exhausted
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but the query failed
    #[error("Record store query failed: {0}")]
    Query(String),

    /// An aggregate over projected volumes left the representable range
    #[error("Record store aggregate out of range: {0}")]
    OutOfRange(String),
}

/// Query capabilities the estimator needs from a record store
///
/// Implementations compare diameters in decimal arithmetic so records on the
/// range boundary are never misclassified.
#[async_trait]
pub trait FruitStore: Send + Sync {
    /// Every record whose `average_diam_mm` lies in `range`, inclusive
    async fn select_by_diameter(&self, range: &DiameterRange)
        -> Result<Vec<FruitRecord>, StoreError>;

    /// Statistics of `volume_mm + growth_volume` over the same selection,
    /// computed without materializing the records
    ///
    /// Fails with [`StoreError::OutOfRange`] when a projected volume or the
    /// total does not fit in a `Decimal`.
    async fn aggregate_predicted(
        &self,
        range: &DiameterRange,
        growth_volume: Decimal,
    ) -> Result<HarvestStatistics, StoreError>;

    /// Cheap connectivity check
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Store over an in-memory record list, in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryFruitStore {
    records: Vec<FruitRecord>,
}

impl MemoryFruitStore {
    pub fn new(records: Vec<FruitRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[FruitRecord] {
        &self.records
    }

    fn matching<'a>(&'a self, range: &'a DiameterRange) -> impl Iterator<Item = &'a FruitRecord> {
        self.records
            .iter()
            .filter(move |fruit| range.contains(fruit.average_diam_mm))
    }
}

impl FromIterator<FruitRecord> for MemoryFruitStore {
    fn from_iter<I: IntoIterator<Item = FruitRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl FruitStore for MemoryFruitStore {
    async fn select_by_diameter(
        &self,
        range: &DiameterRange,
    ) -> Result<Vec<FruitRecord>, StoreError> {
        Ok(self.matching(range).cloned().collect())
    }

    async fn aggregate_predicted(
        &self,
        range: &DiameterRange,
        growth_volume: Decimal,
    ) -> Result<HarvestStatistics, StoreError> {
        let mut acc = StatisticsAccumulator::default();
        for fruit in self.matching(range) {
            let predicted = fruit
                .predicted_harvest_volume(growth_volume)
                .ok_or_else(|| StoreError::OutOfRange(format!("fruit {}", fruit.id)))?;
            acc.push(predicted, fruit.average_diam_mm)
                .map_err(|e| StoreError::OutOfRange(e.to_string()))?;
        }
        Ok(acc.finish())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GpsCoordinates;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn fruit(id: i32, volume: &str, diameter: &str) -> FruitRecord {
        FruitRecord {
            id,
            position: GpsCoordinates::new(Decimal::ZERO, Decimal::ZERO),
            major_mm: dec(diameter),
            minor_mm: dec(diameter),
            subminor_mm: dec(diameter),
            volume_mm: dec(volume),
            average_diam_mm: dec(diameter),
        }
    }

    fn store() -> MemoryFruitStore {
        vec![
            fruit(1, "1000", "4.99"),
            fruit(2, "2000", "5.00"),
            fruit(3, "3000", "12.5"),
            fruit(4, "4000", "20.00"),
            fruit(5, "5000", "20.01"),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_select_is_inclusive_on_both_ends() {
        let range = DiameterRange::new(dec("5"), dec("20"));
        let selected = store().select_by_diameter(&range).await.unwrap();

        let ids: Vec<i32> = selected.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_select_decimal_boundary() {
        // 0.1 + 0.2 would miss 0.3 in binary floating point
        let store: MemoryFruitStore = vec![fruit(1, "10", "0.3")].into_iter().collect();
        let range = DiameterRange::new(dec("0.1") + dec("0.2"), dec("1"));
        assert_eq!(store.select_by_diameter(&range).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_aggregate_predicted() {
        let range = DiameterRange::new(dec("5"), dec("20"));
        let stats = store().aggregate_predicted(&range, dec("100")).await.unwrap();

        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_predicted_volume, dec("9300"));
        assert_eq!(stats.average_predicted_volume, dec("3100"));
        assert_eq!(stats.min_predicted_volume, dec("2100"));
        assert_eq!(stats.max_predicted_volume, dec("4100"));
        assert_eq!(stats.average_diameter, dec("12.5"));
    }

    #[tokio::test]
    async fn test_aggregate_no_match_is_zero() {
        let range = DiameterRange::new(dec("50"), dec("60"));
        let stats = store().aggregate_predicted(&range, dec("100")).await.unwrap();
        assert_eq!(stats, HarvestStatistics::empty());
    }

    #[tokio::test]
    async fn test_aggregate_overflow_is_out_of_range() {
        let range = DiameterRange::new(dec("5"), dec("20"));
        let growth = dec("70000000000000000000000000000");

        let err = store().aggregate_predicted(&range, growth).await.unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange(_)));
    }

    #[tokio::test]
    async fn test_ping() {
        assert!(MemoryFruitStore::default().ping().await.is_ok());
    }
}
