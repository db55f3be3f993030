//! Equal-width histogram of predicted volumes

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default number of bins when the caller does not ask for one
pub const DEFAULT_HISTOGRAM_BINS: u32 = 20;

/// Largest bin count accepted from callers
pub const MAX_HISTOGRAM_BINS: u32 = 1000;

/// One histogram bucket; boundaries and percentage rounded to 2 places
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistogramBin {
    #[serde(with = "rust_decimal::serde::float")]
    pub bin_start: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub bin_end: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub bin_center: Decimal,
    pub count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
}

/// Bucket values into `num_bins` equal-width bins spanning `[min, max]`
///
/// Bin `i` covers `[start_i, start_{i+1})`; the last bin is closed and ends
/// exactly at the maximum so it always holds it. When every value is equal
/// the width falls back to 1. Empty input (or zero bins) yields no bins.
pub fn build_histogram(values: &[Decimal], num_bins: u32) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };
    if num_bins == 0 {
        return Vec::new();
    }

    let width = if max > min {
        (max - min) / Decimal::from(num_bins)
    } else {
        Decimal::ONE
    };

    let starts: Vec<Decimal> = (0..num_bins)
        .map(|i| min + width * Decimal::from(i))
        .collect();
    let last = starts.len() - 1;
    let end_of = |i: usize| -> Decimal {
        if i < last {
            starts[i + 1]
        } else if max > min {
            max
        } else {
            starts[i] + width
        }
    };

    // starts[0] == min, so every value lands at index >= 0
    let mut counts = vec![0u64; starts.len()];
    for value in values {
        let index = starts.partition_point(|start| start <= value) - 1;
        counts[index] += 1;
    }

    let total = Decimal::from(values.len());
    let hundred = Decimal::ONE_HUNDRED;

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let start = starts[i];
            HistogramBin {
                bin_start: start.round_dp(2),
                bin_end: end_of(i).round_dp(2),
                bin_center: (start + width / Decimal::TWO).round_dp(2),
                count,
                percentage: (Decimal::from(count) / total * hundred).round_dp(2),
            }
        })
        .collect()
}
