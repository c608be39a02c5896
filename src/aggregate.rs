// Metric Reasoning - Metric evaluation engine
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Window aggregation.
//!
//! Reduces every sample of every series in a window to one value plus a
//! dispersion estimate. The noise estimate is the population standard
//! deviation of the contributing values: non-negative, and zero only when
//! all values are equal. Trend, volatility and confidence all divide by it.

use crate::error::{ReasoningError, Result};
use crate::sample::FilteredSeries;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reduction applied to a window's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    #[default]
    Mean,
    Median,
    Last,
    P95,
    Sum,
}

impl AggregationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::Mean => "mean",
            AggregationMethod::Median => "median",
            AggregationMethod::Last => "last",
            AggregationMethod::P95 => "p95",
            AggregationMethod::Sum => "sum",
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationMethod {
    type Err = ReasoningError;

    /// Empty input selects `mean`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "mean" => Ok(AggregationMethod::Mean),
            "median" => Ok(AggregationMethod::Median),
            "last" => Ok(AggregationMethod::Last),
            "p95" => Ok(AggregationMethod::P95),
            "sum" => Ok(AggregationMethod::Sum),
            _ => Err(ReasoningError::UnknownAggregation(s.to_string())),
        }
    }
}

/// Summary of one window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AggregationStats {
    /// Value selected by the aggregation method.
    pub aggregated_value: f64,
    /// Population standard deviation of the window values.
    pub noise_estimate: f64,
    pub sample_count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    /// Name of the method that produced `aggregated_value`.
    pub aggregation: String,
}

impl AggregationStats {
    /// Zero-valued stats for a window with no samples.
    pub fn empty(method: AggregationMethod) -> Self {
        Self {
            aggregation: method.as_str().to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

/// Reduces a window to [`AggregationStats`].
///
/// The evaluator is generic over this so callers can substitute or observe
/// aggregation.
pub trait Aggregator {
    fn aggregate(&self, series: &[FilteredSeries], method: AggregationMethod) -> AggregationStats;
}

/// Default aggregator over all samples of all series in the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowAggregator;

impl Aggregator for WindowAggregator {
    fn aggregate(&self, series: &[FilteredSeries], method: AggregationMethod) -> AggregationStats {
        aggregate(series, method)
    }
}

/// Aggregate a window with the given method.
pub fn aggregate(series: &[FilteredSeries], method: AggregationMethod) -> AggregationStats {
    let values: Vec<f64> = series.iter().flat_map(FilteredSeries::values).collect();
    if values.is_empty() {
        return AggregationStats::empty(method);
    }

    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    let mean = sum / n;

    let mut sorted = values.clone();
    sorted.sort_by(f64::total_cmp);
    let median = median_of_sorted(&sorted);
    let p95 = percentile_of_sorted(&sorted, 0.95);
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    // Equal values have zero spread regardless of rounding in the mean
    let noise = if min == max {
        0.0
    } else {
        population_std(&values, mean)
    };

    let aggregated_value = match method {
        AggregationMethod::Mean => mean,
        AggregationMethod::Median => median,
        AggregationMethod::Last => last_value(series).unwrap_or(mean),
        AggregationMethod::P95 => p95,
        AggregationMethod::Sum => sum,
    };

    AggregationStats {
        aggregated_value,
        noise_estimate: noise,
        sample_count: values.len(),
        min,
        max,
        mean,
        median,
        p95,
        aggregation: method.as_str().to_string(),
    }
}

/// Aggregate using a method name; unknown names are a configuration error.
pub fn aggregate_by_name(series: &[FilteredSeries], method: &str) -> Result<AggregationStats> {
    let method = method.parse::<AggregationMethod>()?;
    Ok(aggregate(series, method))
}

/// Two-pass population standard deviation.
fn population_std(values: &[f64], mean: f64) -> f64 {
    let n = values.len() as f64;
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / n).sqrt()
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Nearest-rank percentile.
fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    let rank = (q * n as f64).ceil() as usize;
    sorted[rank.clamp(1, n) - 1]
}

/// Value of the most recent sample across all series (later series win ties).
fn last_value(series: &[FilteredSeries]) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for sample in series.iter().flat_map(|s| s.samples.iter()) {
        match best {
            Some((ts, _)) if sample.timestamp < ts => {}
            _ => best = Some((sample.timestamp, sample.value)),
        }
    }
    best.map(|(_, v)| v)
}
