//! Harvest estimation service: validates requests and composes projection,
//! statistics and histogram views over the fruit record store

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use shared::{
    build_histogram, compute_statistics, harvest_statistics_with_details, validate_num_bins,
    validate_parameters, EstimateSummary, FruitStore, HarvestEstimate, HarvestParameters,
    HarvestStatistics, HistogramBin, ParameterEcho, StatisticsBasis,
};

use crate::error::AppResult;

/// Harvest estimation service
#[derive(Clone)]
pub struct HarvestEstimationService {
    store: Arc<dyn FruitStore>,
}

/// Per-fruit estimates with their summary
#[derive(Debug, Clone, Serialize)]
pub struct EstimateListing {
    pub fruits: Vec<HarvestEstimate>,
    pub statistics: EstimateSummary,
    pub parameters: ParameterEcho,
}

/// Histogram of predicted volumes with their summary
#[derive(Debug, Clone, Serialize)]
pub struct HistogramView {
    pub histogram: Vec<HistogramBin>,
    pub statistics: HarvestStatistics,
    pub parameters: ParameterEcho,
}

/// Summary statistics alone
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsView {
    pub statistics: HarvestStatistics,
    pub parameters: ParameterEcho,
}

impl HarvestEstimationService {
    /// Create a new HarvestEstimationService instance
    pub fn new(store: Arc<dyn FruitStore>) -> Self {
        Self { store }
    }

    /// List every matching fruit with its projected harvest volume
    pub async fn estimate(&self, data: &Value) -> AppResult<EstimateListing> {
        let params = validate_parameters(data)?;
        log_parameters("estimate", &params);

        let (statistics, fruits) =
            harvest_statistics_with_details(self.store.as_ref(), &params).await?;

        tracing::info!(
            "Estimated {} fruits over {} days",
            statistics.count,
            params.days_delta()
        );

        Ok(EstimateListing {
            fruits,
            statistics: EstimateSummary {
                statistics,
                days_between_scan_and_harvest: params.days_delta(),
                total_growth_per_fruit: params.growth_volume(),
            },
            parameters: params.echo(),
        })
    }

    /// Bucket projected volumes into a histogram
    pub async fn histogram(&self, data: &Value) -> AppResult<HistogramView> {
        let params = validate_parameters(data)?;
        let num_bins = validate_num_bins(data)?;
        log_parameters("histogram", &params);

        let (statistics, fruits) =
            harvest_statistics_with_details(self.store.as_ref(), &params).await?;

        let volumes: Vec<_> = fruits.iter().map(|f| f.predicted_harvest_volume).collect();
        let histogram = build_histogram(&volumes, num_bins);

        tracing::info!(
            "Built {} histogram bins from {} fruits",
            histogram.len(),
            statistics.count
        );

        Ok(HistogramView {
            histogram,
            statistics,
            parameters: params.echo().with_bins(num_bins),
        })
    }

    /// Summary statistics aggregated inside the store
    pub async fn statistics(&self, data: &Value) -> AppResult<StatisticsView> {
        let params = validate_parameters(data)?;
        log_parameters("statistics", &params);

        let statistics =
            compute_statistics(self.store.as_ref(), StatisticsBasis::pushed_down(&params)).await?;

        Ok(StatisticsView {
            statistics,
            parameters: params.echo(),
        })
    }
}

fn log_parameters(operation: &str, params: &HarvestParameters) {
    tracing::debug!(
        "{} request: {} -> {} ({} days), rate {} mm3/day, diameter {}..={} mm",
        operation,
        params.scan_date(),
        params.harvest_date(),
        params.days_delta(),
        params.growth_rate(),
        params.min_diameter(),
        params.max_diameter()
    );
}
