// Metric Reasoning - Metric evaluation engine
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Evaluation orchestration.
//!
//! One call per `(metric, node, tick)`:
//!
//! 1. Slice the current window `[now - W, now]` and the previous window
//!    `[now - 2W, now - W]` out of the raw series.
//! 2. Gate on coverage of the current window. Below the policy minimum the
//!    result is `unknown` with confidence 0.2 and nothing else is computed.
//! 3. Aggregate both windows, then classify trend and state, combine them
//!    into a conclusion, score confidence and project the crossing.
//!
//! The evaluator holds no state between calls and performs no I/O.

use crate::aggregate::{AggregationMethod, AggregationStats, Aggregator, WindowAggregator};
use crate::conclusion::{combine, Conclusion};
use crate::confidence::{confidence, trend_consistency, LOW_COVERAGE_CONFIDENCE};
use crate::error::Result;
use crate::policy::EvaluationPolicy;
use crate::projection::{project_crossing, ProjectionStats};
use crate::sample::{estimate_coverage, filter_by_time, FilteredSeries, RawSeries};
use crate::state::{classify_state, HealthState};
use crate::trend::{classify_trend_with, signal_strength, Trend};
use serde::{Deserialize, Serialize};

/// Result of one evaluation. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricEvaluation {
    #[serde(rename = "MetricID")]
    pub metric_id: String,
    /// Logical end of the evaluated window, seconds since the UNIX epoch.
    pub evaluated_at: f64,
    pub agg_now: f64,
    pub stats_now: AggregationStats,
    pub state: HealthState,
    pub trend: Trend,
    pub conclusion: Conclusion,
    pub confidence: f64,
    #[serde(default)]
    pub projection: Option<ProjectionStats>,
}

impl MetricEvaluation {
    /// The record returned when coverage is below the policy minimum.
    pub fn insufficient(metric_id: &str, evaluated_at: f64, method: AggregationMethod) -> Self {
        Self {
            metric_id: metric_id.to_string(),
            evaluated_at,
            agg_now: 0.0,
            stats_now: AggregationStats::empty(method),
            state: HealthState::Unknown,
            trend: Trend::Unknown,
            conclusion: Conclusion::Unknown,
            confidence: LOW_COVERAGE_CONFIDENCE,
            projection: None,
        }
    }

    /// Whether the evaluation reached a known state.
    pub fn is_conclusive(&self) -> bool {
        self.state != HealthState::Unknown
    }

    /// `evaluated_at` as a UTC timestamp.
    #[cfg(feature = "timestamps")]
    pub fn evaluated_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let secs = self.evaluated_at.floor();
        let nanos = ((self.evaluated_at - secs) * 1e9) as u32;
        chrono::DateTime::from_timestamp(secs as i64, nanos)
    }
}

/// Runs the evaluation pipeline with a pluggable aggregator.
#[derive(Debug, Clone, Default)]
pub struct Evaluator<A: Aggregator = WindowAggregator> {
    aggregator: A,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            aggregator: WindowAggregator,
        }
    }
}

impl<A: Aggregator> Evaluator<A> {
    /// Evaluator using a custom aggregator.
    pub fn with_aggregator(aggregator: A) -> Self {
        Self { aggregator }
    }

    pub fn aggregator(&self) -> &A {
        &self.aggregator
    }

    /// Evaluate one metric at logical time `now`.
    ///
    /// `raw` should cover at least `[now - 2W, now]`. A policy that fails
    /// [`EvaluationPolicy::validate`] is an error; low coverage is not.
    pub fn evaluate(
        &self,
        metric_id: &str,
        raw: &[RawSeries],
        now: f64,
        policy: &EvaluationPolicy,
    ) -> Result<MetricEvaluation> {
        policy.validate()?;
        let method = policy.aggregation_method()?;
        let window = policy.window_sec;

        let now_window = filter_by_time(raw, now - window, now);
        let prev_window = filter_by_time(raw, now - 2.0 * window, now - window);

        let coverage = estimate_coverage(&now_window, window, policy.expected_interval_sec);
        if coverage < policy.min_coverage_pct {
            trace_eval!(
                "{}: coverage {:.3} below {:.3}, skipping",
                metric_id,
                coverage,
                policy.min_coverage_pct
            );
            return Ok(MetricEvaluation::insufficient(metric_id, now, method));
        }

        let stats_now = self.aggregator.aggregate(&now_window, method);
        let stats_prev = self.aggregator.aggregate(&prev_window, method);

        let trend = classify_trend_with(
            &stats_now,
            &stats_prev,
            policy.trend_sensitivity,
            policy.volatility,
        );
        let state = classify_state(stats_now.aggregated_value, &policy.thresholds, policy.direction);
        let conclusion = combine(state, trend);

        let signal = signal_strength(&stats_now, &stats_prev);
        let consistency = trend_consistency(&chronological_values(&now_window));
        let confidence = confidence(coverage, signal, consistency, state);

        let projection = project_crossing(
            stats_now.aggregated_value,
            stats_prev.aggregated_value,
            window,
            &policy.thresholds,
            policy.direction,
        );

        trace_eval!(
            "{}: value={} state={} trend={} conclusion={} confidence={:.3}",
            metric_id,
            stats_now.aggregated_value,
            state,
            trend,
            conclusion,
            confidence
        );

        Ok(MetricEvaluation {
            metric_id: metric_id.to_string(),
            evaluated_at: now,
            agg_now: stats_now.aggregated_value,
            stats_now,
            state,
            trend,
            conclusion,
            confidence,
            projection,
        })
    }
}

/// Evaluate with the default aggregator.
pub fn evaluate(
    metric_id: &str,
    raw: &[RawSeries],
    now: f64,
    policy: &EvaluationPolicy,
) -> Result<MetricEvaluation> {
    Evaluator::new().evaluate(metric_id, raw, now, policy)
}

/// All samples of the window merged in timestamp order.
fn chronological_values(series: &[FilteredSeries]) -> Vec<f64> {
    let mut samples: Vec<_> = series.iter().flat_map(|s| s.samples.iter()).collect();
    samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    samples.into_iter().map(|s| s.value).collect()
}
