// Metric Reasoning - Metric evaluation engine
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! # Metric Reasoning
//!
//! Turns raw time-series samples for an infrastructure metric into a
//! judgement: a robust aggregate, a short-term trend, a health state, a
//! confidence score and a projected time to the next threshold.
//!
//! ## Key Features
//!
//! - **Coverage gating**: sparse windows degrade to `unknown` instead of
//!   producing precise-looking numbers
//! - **Noise-normalized trends**: deltas are compared to the window's own
//!   dispersion, with a volatility override
//! - **Directional thresholds**: `higher_is_worse`, `lower_is_worse` and
//!   `range` policies
//! - **Pure**: no I/O, no shared state, safe to run per metric in parallel
//!
//! ## Quick Start
//!
//! ```rust
//! use metric_reasoning::{evaluate, EvaluationPolicy, HealthState, RawSeries};
//!
//! let series = RawSeries::from_samples(&[
//!     (885.0, 38.0),
//!     (900.0, 40.0),
//!     (945.0, 40.0),
//!     (960.0, 42.0),
//!     (975.0, 95.0),
//! ]);
//!
//! let policy = EvaluationPolicy::default();
//! let eval = evaluate("cpu_usage", &[series], 1000.0, &policy).unwrap();
//!
//! assert_eq!(eval.agg_now, 59.0);
//! assert_eq!(eval.state, HealthState::Healthy);
//! ```
//!
//! ## Modules
//!
//! - [`sample`]: Samples, series and window slicing
//! - [`aggregate`]: Window aggregation and noise estimate
//! - [`trend`]: Trend classification
//! - [`state`]: Health state classification
//! - [`confidence`]: Confidence scoring
//! - [`projection`]: Time-to-threshold projection
//! - [`conclusion`]: `(state, trend)` conclusions
//! - [`evaluator`]: The evaluation pipeline
//! - [`policy`]: Per-metric policy
//! - [`prom`]: Prometheus response decoding

// Debug tracing, compiled out without the `logging` feature.
#[cfg(feature = "logging")]
macro_rules! trace_eval {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! trace_eval {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

// Modules
pub mod aggregate;
pub mod conclusion;
pub mod confidence;
pub mod error;
pub mod evaluator;
pub mod policy;
pub mod projection;
pub mod prom;
pub mod sample;
pub mod state;
pub mod trend;

// Re-exports for convenient access
pub use aggregate::{
    aggregate, aggregate_by_name, AggregationMethod, AggregationStats, Aggregator,
    WindowAggregator,
};
pub use conclusion::{combine, Conclusion};
pub use confidence::{confidence, trend_consistency};
pub use error::{ReasoningError, Result};
pub use evaluator::{evaluate, Evaluator, MetricEvaluation};
pub use policy::EvaluationPolicy;
pub use projection::{project_crossing, ProjectionKind, ProjectionStats};
pub use prom::parse_query_response;
pub use sample::{estimate_coverage, filter_by_time, FilteredSeries, Labels, RawSeries, Sample};
pub use state::{classify_state, HealthState, StateDirection, StateThresholds};
pub use trend::{classify_trend, classify_trend_with, signal_strength, Trend, VolatilityOverride};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Floor applied to noise before it is used as a divisor.
pub const NOISE_EPSILON: f64 = 1e-10;
