// Metric Reasoning - Metric evaluation engine
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Per-metric evaluation policy.

use crate::aggregate::AggregationMethod;
use crate::error::{ReasoningError, Result};
use crate::trend::VolatilityOverride;
use serde::{Deserialize, Serialize};

pub use crate::state::{StateDirection, StateThresholds};

/// Everything the evaluator needs to know about one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationPolicy {
    /// Window length in seconds.
    pub window_sec: f64,

    /// Expected scrape interval in seconds.
    pub expected_interval_sec: f64,

    /// Minimum coverage fraction before the window is evaluated.
    pub min_coverage_pct: f64,

    /// Aggregation method name (`mean`, `median`, `last`, `p95`, `sum`).
    pub aggregation: String,

    /// Multiplier on the noise floor for trend calls.
    pub trend_sensitivity: f64,

    /// Volatility override settings.
    pub volatility: VolatilityOverride,

    /// Threshold levels.
    pub thresholds: StateThresholds,

    /// Which side of the thresholds is bad.
    pub direction: StateDirection,
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        Self {
            window_sec: 60.0,
            expected_interval_sec: 15.0,
            min_coverage_pct: 0.3,
            aggregation: AggregationMethod::Mean.as_str().to_string(),
            trend_sensitivity: 1.0,
            volatility: VolatilityOverride::default(),
            thresholds: StateThresholds::default(),
            direction: StateDirection::HigherIsWorse,
        }
    }
}

impl EvaluationPolicy {
    /// Policy with the given thresholds and defaults elsewhere.
    pub fn new(thresholds: StateThresholds, direction: StateDirection) -> Self {
        Self {
            thresholds,
            direction,
            ..Default::default()
        }
    }

    /// Builder: set window length.
    pub fn with_window(mut self, window_sec: f64) -> Self {
        self.window_sec = window_sec;
        self
    }

    /// Builder: set expected scrape interval.
    pub fn with_expected_interval(mut self, interval_sec: f64) -> Self {
        self.expected_interval_sec = interval_sec;
        self
    }

    /// Builder: set minimum coverage.
    pub fn with_min_coverage(mut self, pct: f64) -> Self {
        self.min_coverage_pct = pct;
        self
    }

    /// Builder: set aggregation method name.
    pub fn with_aggregation(mut self, method: &str) -> Self {
        self.aggregation = method.to_string();
        self
    }

    /// Builder: set trend sensitivity.
    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.trend_sensitivity = sensitivity;
        self
    }

    /// Builder: set volatility override.
    pub fn with_volatility(mut self, volatility: VolatilityOverride) -> Self {
        self.volatility = volatility;
        self
    }

    /// Parsed aggregation method.
    pub fn aggregation_method(&self) -> Result<AggregationMethod> {
        self.aggregation.parse()
    }

    /// Check the policy for configuration errors.
    pub fn validate(&self) -> Result<()> {
        if !(self.window_sec > 0.0) || !self.window_sec.is_finite() {
            return Err(ReasoningError::InvalidPolicy(format!(
                "window_sec must be positive, got {}",
                self.window_sec
            )));
        }

        if !(0.0..=1.0).contains(&self.min_coverage_pct) {
            return Err(ReasoningError::InvalidPolicy(format!(
                "min_coverage_pct must be in [0, 1], got {}",
                self.min_coverage_pct
            )));
        }

        if self.volatility.enabled && !(self.volatility.ratio > 0.0) {
            return Err(ReasoningError::InvalidPolicy(format!(
                "volatility ratio must be positive, got {}",
                self.volatility.ratio
            )));
        }

        self.aggregation_method()?;

        if !self.thresholds.matches(self.direction) {
            return Err(ReasoningError::InvalidThresholds {
                direction: self.direction.to_string(),
                reason: "threshold shape does not match direction".to_string(),
            });
        }

        if let StateThresholds::Band {
            low_warning,
            high_warning,
            low_critical,
            high_critical,
        } = self.thresholds
        {
            StateThresholds::band(low_warning, high_warning, low_critical, high_critical)?;
        }

        Ok(())
    }
}
