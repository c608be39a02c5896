// Reasoning Service - Prometheus metrics definitions
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Prometheus metrics exposed by the evaluator.

use lazy_static::lazy_static;
use metric_reasoning::MetricEvaluation;
use prometheus::{
    register_counter_vec, register_gauge_vec, CounterVec, Encoder, GaugeVec, TextEncoder,
};

lazy_static! {
    // ============================================================
    // Per (node, metric) evaluation results
    // ============================================================

    /// Aggregated value of the current window.
    pub static ref AGGREGATED_VALUE: GaugeVec = register_gauge_vec!(
        "reasoning_aggregated_value",
        "Aggregated value of the current window",
        &["node", "metric"]
    ).unwrap();

    /// Health state code.
    pub static ref STATE: GaugeVec = register_gauge_vec!(
        "reasoning_state",
        "Health state (0=Healthy, 1=Warning, 2=Critical, 3=Unknown)",
        &["node", "metric"]
    ).unwrap();

    /// Confidence of the evaluation.
    pub static ref CONFIDENCE: GaugeVec = register_gauge_vec!(
        "reasoning_confidence",
        "Confidence of the latest evaluation (0-1)",
        &["node", "metric"]
    ).unwrap();

    /// Projected seconds until the warning level, -1 when none.
    pub static ref PROJECTION_ETA_SECONDS: GaugeVec = register_gauge_vec!(
        "reasoning_projection_eta_seconds",
        "Projected seconds until the warning threshold (-1 = no projection)",
        &["node", "metric"]
    ).unwrap();

    // ============================================================
    // Counters
    // ============================================================

    /// Evaluations by outcome (conclusive, inconclusive, error).
    pub static ref EVALUATIONS_TOTAL: CounterVec = register_counter_vec!(
        "reasoning_evaluations_total",
        "Evaluations run, by outcome",
        &["outcome"]
    ).unwrap();

    /// Failed fetches from the sample source.
    pub static ref FETCH_FAILURES_TOTAL: CounterVec = register_counter_vec!(
        "reasoning_fetch_failures_total",
        "Failed sample fetches, by metric",
        &["metric"]
    ).unwrap();
}

/// Evaluation outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Conclusive,
    Inconclusive,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Conclusive => "conclusive",
            Outcome::Inconclusive => "inconclusive",
            Outcome::Error => "error",
        }
    }
}

impl From<&MetricEvaluation> for Outcome {
    fn from(eval: &MetricEvaluation) -> Self {
        if eval.is_conclusive() {
            Outcome::Conclusive
        } else {
            Outcome::Inconclusive
        }
    }
}

/// Publish one evaluation.
pub fn record_evaluation(node: &str, metric: &str, eval: &MetricEvaluation) {
    let labels = [node, metric];
    AGGREGATED_VALUE.with_label_values(&labels).set(eval.agg_now);
    STATE
        .with_label_values(&labels)
        .set(eval.state.code() as f64);
    CONFIDENCE.with_label_values(&labels).set(eval.confidence);
    PROJECTION_ETA_SECONDS
        .with_label_values(&labels)
        .set(eval.projection.map(|p| p.eta_sec).unwrap_or(-1.0));

    record_outcome(Outcome::from(eval));
}

/// Count an evaluation outcome.
pub fn record_outcome(outcome: Outcome) {
    EVALUATIONS_TOTAL
        .with_label_values(&[outcome.as_str()])
        .inc();
}

/// Count a failed fetch.
pub fn record_fetch_failure(metric: &str) {
    FETCH_FAILURES_TOTAL.with_label_values(&[metric]).inc();
}

/// Encode all metrics to Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
