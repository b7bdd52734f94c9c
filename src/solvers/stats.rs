//! Descriptive statistics for a single data set.

use serde::Serialize;

use super::round10;
use crate::error::{CalcError, Result};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    /// Every value sharing the highest frequency, empty when no value repeats.
    pub mode: Vec<f64>,
    /// Population variance.
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

/// Linearly interpolated percentile of sorted data.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let idx = p / 100.0 * (sorted.len() - 1) as f64;
    let (lower, upper) = (idx.floor() as usize, idx.ceil() as usize);
    sorted[lower] + (sorted[upper] - sorted[lower]) * (idx - lower as f64)
}

/// Values with the highest frequency above one, in ascending order.
fn modes(sorted: &[f64]) -> Vec<f64> {
    let runs: Vec<(f64, usize)> = sorted
        .chunk_by(|a, b| a == b)
        .map(|run| (run[0], run.len()))
        .collect();
    let max_freq = runs.iter().map(|&(_, freq)| freq).max().unwrap_or(0);
    if max_freq <= 1 {
        return Vec::new();
    }
    runs.into_iter()
        .filter(|&(_, freq)| freq == max_freq)
        .map(|(value, _)| value)
        .collect()
}

pub fn descriptive_stats(data: &[f64]) -> Result<DescriptiveStats> {
    if data.is_empty() {
        return Err(CalcError::InsufficientData("Data set is empty".into()));
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();

    let sum: f64 = sorted.iter().sum();
    let mean = sum / n as f64;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };
    let q1 = percentile(&sorted, 25.0);
    let q3 = percentile(&sorted, 75.0);

    Ok(DescriptiveStats {
        count: n,
        sum: round10(sum),
        mean: round10(mean),
        median: round10(median),
        mode: modes(&sorted),
        variance: round10(variance),
        std_dev: round10(variance.sqrt()),
        min: sorted[0],
        max: sorted[n - 1],
        q1: round10(q1),
        q3: round10(q3),
        iqr: round10(q3 - q1),
    })
}
