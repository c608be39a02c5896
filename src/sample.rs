// Metric Reasoning - Metric evaluation engine
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Samples, labeled series and time-window slicing.
//!
//! Raw series arrive in the telemetry wire shape: each point is a
//! `[timestamp, "value"]` pair. Parsing is per pair, so one bad point never
//! discards the rest of its series.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single timestamped observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since the UNIX epoch.
    pub timestamp: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: f64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Series labels (`__name__`, `nodeid`, ...).
pub type Labels = BTreeMap<String, String>;

/// A labeled series exactly as the telemetry backend returned it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSeries {
    #[serde(default, rename = "metric")]
    pub labels: Labels,
    /// Untyped `[ts, value]` pairs; malformed pairs are tolerated here and
    /// dropped during filtering.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl RawSeries {
    pub fn new(labels: Labels) -> Self {
        Self {
            labels,
            values: Vec::new(),
        }
    }

    /// Build an unlabeled series from already-numeric samples.
    pub fn from_samples(samples: &[(f64, f64)]) -> Self {
        let mut series = Self::default();
        for &(ts, value) in samples {
            series = series.with_point(ts, &value.to_string());
        }
        series
    }

    /// Builder: add a label.
    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Builder: append a `[ts, "value"]` pair.
    pub fn with_point(mut self, timestamp: f64, value: &str) -> Self {
        self.values
            .push(vec![Value::from(timestamp), Value::from(value)]);
        self
    }

    /// Number of pairs, parseable or not.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A labeled, chronologically ordered series of parsed samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteredSeries {
    pub labels: Labels,
    pub samples: Vec<Sample>,
}

impl FilteredSeries {
    pub fn new(labels: Labels, samples: Vec<Sample>) -> Self {
        Self { labels, samples }
    }

    /// Unlabeled series from `(timestamp, value)` tuples.
    pub fn from_samples(samples: &[(f64, f64)]) -> Self {
        Self {
            labels: Labels::new(),
            samples: samples.iter().map(|&(t, v)| Sample::new(t, v)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate over the sample values in order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.value)
    }
}

/// Parse a timestamp that may be a JSON number or a numeric string.
fn parse_timestamp(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a value that may be a string (the Prometheus encoding) or a number.
fn parse_value(raw: &Value) -> Option<f64> {
    match raw {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Parse one raw pair. `None` for short pairs, unparseable members, or
/// non-finite numbers (Prometheus emits `NaN` and `+Inf` as strings).
pub fn parse_pair(pair: &[Value]) -> Option<Sample> {
    let timestamp = parse_timestamp(pair.first()?)?;
    let value = parse_value(pair.get(1)?)?;
    if !timestamp.is_finite() || !value.is_finite() {
        return None;
    }
    Some(Sample { timestamp, value })
}

/// Keep the pairs with `start <= timestamp <= end`.
///
/// Unparseable pairs are dropped silently. Series left empty are omitted
/// from the result.
pub fn filter_by_time(series: &[RawSeries], start: f64, end: f64) -> Vec<FilteredSeries> {
    series
        .iter()
        .filter_map(|raw| {
            let mut samples: Vec<Sample> = raw
                .values
                .iter()
                .filter_map(|pair| parse_pair(pair))
                .filter(|s| s.timestamp >= start && s.timestamp <= end)
                .collect();

            if samples.is_empty() {
                return None;
            }

            // Stable: duplicates keep their arrival order.
            samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

            Some(FilteredSeries {
                labels: raw.labels.clone(),
                samples,
            })
        })
        .collect()
}

/// Total sample count across all series.
pub fn sample_count(series: &[FilteredSeries]) -> usize {
    series.iter().map(FilteredSeries::len).sum()
}

/// Fraction of the expected samples present in the window, in `[0, 1]`.
pub fn estimate_coverage(
    series: &[FilteredSeries],
    window_sec: f64,
    expected_interval_sec: f64,
) -> f64 {
    let interval = if expected_interval_sec <= 0.0 {
        1.0
    } else {
        expected_interval_sec
    };

    let expected = (window_sec / interval).max(1.0);
    let actual = sample_count(series) as f64;

    let coverage = actual / expected;
    if coverage.is_nan() {
        return 0.0;
    }
    coverage.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_inclusive_bounds() {
        let raw = RawSeries::from_samples(&[(10.0, 1.0), (20.0, 2.0), (30.0, 3.0), (40.0, 4.0)]);
        let out = filter_by_time(&[raw], 20.0, 30.0);

        assert_eq!(out.len(), 1);
        let values: Vec<f64> = out[0].values().collect();
        assert_eq!(values, vec![2.0, 3.0]);
    }

    #[test]
    fn test_filter_drops_bad_pairs_not_series() {
        let raw = RawSeries {
            labels: Labels::new(),
            values: vec![
                vec![json!(1.0), json!("5")],
                vec![json!("oops"), json!("6")],
                vec![json!(2.0), json!("not-a-number")],
                vec![json!(3.0)],
                vec![json!("4"), json!("7.5")],
                vec![json!(null), json!("8")],
            ],
        };

        let out = filter_by_time(&[raw], 0.0, 10.0);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].samples,
            vec![Sample::new(1.0, 5.0), Sample::new(4.0, 7.5)]
        );
    }

    #[test]
    fn test_filter_drops_non_finite_values() {
        let raw = RawSeries::default()
            .with_point(1.0, "40")
            .with_point(2.0, "NaN")
            .with_point(3.0, "+Inf")
            .with_point(4.0, "-Inf")
            .with_point(5.0, "42");

        let out = filter_by_time(&[raw], 0.0, 10.0);
        let values: Vec<f64> = out[0].values().collect();
        assert_eq!(values, vec![40.0, 42.0]);

        let only_nan = RawSeries::default().with_point(1.0, "NaN");
        assert!(filter_by_time(&[only_nan], 0.0, 10.0).is_empty());
    }

    #[test]
    fn test_filter_omits_empty_series() {
        let a = RawSeries::from_samples(&[(1.0, 1.0)]).with_label("nodeid", "a");
        let b = RawSeries::from_samples(&[(100.0, 1.0)]).with_label("nodeid", "b");

        let out = filter_by_time(&[a, b], 0.0, 10.0);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].labels.get("nodeid").map(String::as_str), Some("a"));
    }

    #[test]
    fn test_filter_orders_chronologically_keeps_duplicates() {
        let raw = RawSeries::from_samples(&[(3.0, 3.0), (1.0, 1.0), (3.0, 4.0), (2.0, 2.0)]);
        let out = filter_by_time(&[raw], 0.0, 10.0);

        let values: Vec<f64> = out[0].values().collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_coverage() {
        let series = vec![FilteredSeries::from_samples(&[(0.0, 1.0), (15.0, 1.0)])];
        assert!((estimate_coverage(&series, 60.0, 15.0) - 0.5).abs() < 1e-12);

        // Clamped at 1
        let dense = vec![FilteredSeries::from_samples(
            &(0..10).map(|i| (i as f64, 1.0)).collect::<Vec<_>>(),
        )];
        assert_eq!(estimate_coverage(&dense, 60.0, 15.0), 1.0);

        // Counts across series
        let two = vec![
            FilteredSeries::from_samples(&[(0.0, 1.0)]),
            FilteredSeries::from_samples(&[(0.0, 1.0)]),
        ];
        assert!((estimate_coverage(&two, 60.0, 15.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_coverage_interval_floor() {
        let series = vec![FilteredSeries::from_samples(&[(0.0, 1.0), (1.0, 1.0)])];
        // Non-positive interval floors to 1s: 2 of 4 expected
        assert!((estimate_coverage(&series, 4.0, 0.0) - 0.5).abs() < 1e-12);
        assert!((estimate_coverage(&series, 4.0, -3.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_coverage_expected_count_floor() {
        // Window shorter than one interval still expects one sample
        let series = vec![FilteredSeries::from_samples(&[(0.0, 1.0)])];
        assert_eq!(estimate_coverage(&series, 5.0, 60.0), 1.0);
        assert_eq!(estimate_coverage(&[], 5.0, 60.0), 0.0);
    }

    #[test]
    fn test_raw_series_json_shape() {
        let raw: RawSeries = serde_json::from_value(json!({
            "metric": {"__name__": "cpu_usage", "nodeid": "uk-sa2341-hnode-v0-a1a0"},
            "values": [[1700000000, "12.5"], [1700000015.5, "13"]]
        }))
        .unwrap();

        assert_eq!(raw.len(), 2);
        let out = filter_by_time(&[raw], 0.0, f64::MAX);
        assert_eq!(out[0].samples[1], Sample::new(1_700_000_015.5, 13.0));
    }
}
