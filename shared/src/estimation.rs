//! Composition of store access, projection and aggregation

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{HarvestEstimate, HarvestStatistics};
use crate::store::{FruitStore, StoreError};
use crate::types::DiameterRange;
use crate::validation::{HarvestParameters, ValidationError};

/// Failures while estimating over a record store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EstimationError {
    fn from(err: StoreError) -> Self {
        match err {
            // Store-side aggregation overflowed on the projected volumes
            StoreError::OutOfRange(_) => {
                EstimationError::Validation(ValidationError::GrowthVolumeOverflow)
            }
            other => EstimationError::Store(other),
        }
    }
}

/// Where summary statistics come from
#[derive(Debug, Clone, Copy)]
pub enum StatisticsBasis<'a> {
    /// Push the aggregation down to the store
    Store {
        range: &'a DiameterRange,
        growth_volume: Decimal,
    },
    /// Reuse estimates that are already materialized
    Estimates(&'a [HarvestEstimate]),
}

impl<'a> StatisticsBasis<'a> {
    pub fn pushed_down(params: &'a HarvestParameters) -> Self {
        StatisticsBasis::Store {
            range: params.diameter_range(),
            growth_volume: params.growth_volume(),
        }
    }
}

/// Compute summary statistics from either basis
///
/// Both bases agree on the same dataset up to rounding of the averages, and
/// both report overflow as [`ValidationError::GrowthVolumeOverflow`].
pub async fn compute_statistics(
    store: &dyn FruitStore,
    basis: StatisticsBasis<'_>,
) -> Result<HarvestStatistics, EstimationError> {
    match basis {
        StatisticsBasis::Store {
            range,
            growth_volume,
        } => Ok(store.aggregate_predicted(range, growth_volume).await?),
        StatisticsBasis::Estimates(estimates) => {
            Ok(HarvestStatistics::from_estimates(estimates)?)
        }
    }
}

/// Select matching records and project each one to harvest time
pub async fn calculate_harvest_estimates(
    store: &dyn FruitStore,
    params: &HarvestParameters,
) -> Result<Vec<HarvestEstimate>, EstimationError> {
    let fruits = store.select_by_diameter(params.diameter_range()).await?;
    Ok(params.projection().estimate(&fruits)?)
}

/// Estimates and their statistics from a single store round-trip
pub async fn harvest_statistics_with_details(
    store: &dyn FruitStore,
    params: &HarvestParameters,
) -> Result<(HarvestStatistics, Vec<HarvestEstimate>), EstimationError> {
    let estimates = calculate_harvest_estimates(store, params).await?;
    let statistics = compute_statistics(store, StatisticsBasis::Estimates(&estimates)).await?;
    Ok((statistics, estimates))
}
