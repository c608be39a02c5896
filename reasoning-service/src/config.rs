// Reasoning Service - Metric evaluator daemon
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Service configuration.
//!
//! Loaded from a JSON file; every field has a default so a partial file is
//! enough. The metric catalog maps a metric key (`cpu`, `memory`, ...) to
//! its Prometheus series and threshold levels.

use crate::error::{Result, ServiceError};
use metric_reasoning::{
    EvaluationPolicy, ReasoningError, StateDirection, StateThresholds, VolatilityOverride,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Master configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listen port.
    pub port: u16,

    /// Seconds between evaluation ticks.
    pub period_secs: u64,

    /// Upper bound on one sample fetch, in seconds.
    pub fetch_timeout_secs: u64,

    /// Prometheus base URL.
    pub prometheus_url: String,

    /// Nodes to evaluate.
    pub nodes: Vec<String>,

    /// Metric catalog keyed by metric name.
    pub metrics: BTreeMap<String, MetricConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "cpu".to_string(),
            MetricConfig::new("trx_soc_cpu_usage", 0.0, 70.0, 90.0),
        );
        metrics.insert(
            "memory".to_string(),
            MetricConfig::new("trx_memory_ddr_used", 0.0, 70.0, 90.0),
        );

        Self {
            port: 9100,
            period_secs: 30,
            fetch_timeout_secs: 10,
            prometheus_url: "http://localhost:9090".to_string(),
            nodes: Vec::new(),
            metrics,
        }
    }
}

impl ServiceConfig {
    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: ServiceConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Build and validate every metric policy.
    pub fn policies(&self) -> Result<BTreeMap<String, EvaluationPolicy>> {
        self.metrics
            .iter()
            .map(|(key, metric)| -> Result<(String, EvaluationPolicy)> {
                let policy = metric
                    .policy()
                    .map_err(|e| ServiceError::Config(format!("metric {}: {}", key, e)))?;
                Ok((key.clone(), policy))
            })
            .collect()
    }

    /// Check the whole configuration.
    pub fn validate(&self) -> Result<()> {
        if self.period_secs == 0 {
            return Err(ServiceError::Config("period_secs must be positive".to_string()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ServiceError::Config(
                "fetch_timeout_secs must be positive".to_string(),
            ));
        }
        if self.metrics.is_empty() {
            return Err(ServiceError::Config("metric catalog is empty".to_string()));
        }
        self.policies()?;
        Ok(())
    }
}

/// Four levels for `range` metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandLevels {
    pub low_warning: f64,
    pub high_warning: f64,
    pub low_critical: f64,
    pub high_critical: f64,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    /// Prometheus series name.
    pub metric: String,

    pub min: f64,
    pub medium: f64,
    pub max: f64,

    /// Band levels, required when `state_direction` is `range`.
    pub band: Option<BandLevels>,

    /// `higher_is_worse` (default), `lower_is_worse` or `range`.
    pub state_direction: String,

    pub trend_sensitivity: f64,

    /// Scrape step in seconds.
    pub step: f64,

    pub window_sec: Option<f64>,
    pub expected_interval_sec: Option<f64>,
    pub min_coverage_pct: Option<f64>,
    pub aggregation: Option<String>,
    pub volatility_ratio: Option<f64>,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            metric: String::new(),
            min: 0.0,
            medium: 70.0,
            max: 90.0,
            band: None,
            state_direction: String::new(),
            trend_sensitivity: 1.0,
            step: 15.0,
            window_sec: None,
            expected_interval_sec: None,
            min_coverage_pct: None,
            aggregation: None,
            volatility_ratio: None,
        }
    }
}

impl MetricConfig {
    pub fn new(metric: &str, min: f64, medium: f64, max: f64) -> Self {
        Self {
            metric: metric.to_string(),
            min,
            medium,
            max,
            ..Default::default()
        }
    }

    /// Build the evaluation policy. Thresholds are mapped here, once.
    pub fn policy(&self) -> std::result::Result<EvaluationPolicy, ReasoningError> {
        let direction: StateDirection = self.state_direction.parse()?;

        let thresholds = match direction {
            StateDirection::Range => {
                let band = self.band.ok_or_else(|| ReasoningError::InvalidThresholds {
                    direction: direction.to_string(),
                    reason: "band levels missing".to_string(),
                })?;
                StateThresholds::band(
                    band.low_warning,
                    band.high_warning,
                    band.low_critical,
                    band.high_critical,
                )?
            }
            _ => StateThresholds::from_levels(direction, self.min, self.medium, self.max)?,
        };

        let defaults = EvaluationPolicy::default();
        let step_interval = if self.step > 0.0 {
            self.step
        } else {
            defaults.expected_interval_sec
        };
        let sensitivity = if self.trend_sensitivity > 0.0 {
            self.trend_sensitivity
        } else {
            1.0
        };

        let policy = EvaluationPolicy {
            window_sec: self.window_sec.unwrap_or(defaults.window_sec),
            expected_interval_sec: self.expected_interval_sec.unwrap_or(step_interval),
            min_coverage_pct: self.min_coverage_pct.unwrap_or(defaults.min_coverage_pct),
            aggregation: self
                .aggregation
                .clone()
                .unwrap_or_else(|| defaults.aggregation.clone()),
            trend_sensitivity: sensitivity,
            volatility: match self.volatility_ratio {
                Some(ratio) => VolatilityOverride {
                    enabled: true,
                    ratio,
                },
                None => defaults.volatility,
            },
            thresholds,
            direction,
        };

        policy.validate()?;
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.metrics["cpu"].metric, "trx_soc_cpu_usage");
    }

    #[test]
    fn test_higher_is_worse_mapping() {
        let policy = MetricConfig::new("cpu", 0.0, 70.0, 90.0).policy().unwrap();
        assert_eq!(policy.thresholds, StateThresholds::scale(70.0, 90.0));
        assert_eq!(policy.direction, StateDirection::HigherIsWorse);
        assert_eq!(policy.expected_interval_sec, 15.0);
    }

    #[test]
    fn test_lower_is_worse_mapping() {
        let metric = MetricConfig {
            state_direction: "lower_is_worse".to_string(),
            ..MetricConfig::new("rssi", -105.0, -90.0, 0.0)
        };
        let policy = metric.policy().unwrap();
        assert_eq!(policy.thresholds, StateThresholds::scale(-90.0, -105.0));
    }

    #[test]
    fn test_range_requires_band() {
        let mut metric = MetricConfig {
            state_direction: "range".to_string(),
            ..MetricConfig::new("temp", 0.0, 0.0, 0.0)
        };
        assert!(metric.policy().is_err());

        metric.band = Some(BandLevels {
            low_warning: 10.0,
            high_warning: 40.0,
            low_critical: 0.0,
            high_critical: 50.0,
        });
        let policy = metric.policy().unwrap();
        assert_eq!(policy.direction, StateDirection::Range);
    }

    #[test]
    fn test_step_fallback_and_sensitivity_floor() {
        let metric = MetricConfig {
            step: 30.0,
            trend_sensitivity: 0.0,
            ..MetricConfig::new("cpu", 0.0, 70.0, 90.0)
        };
        let policy = metric.policy().unwrap();
        assert_eq!(policy.expected_interval_sec, 30.0);
        assert_eq!(policy.trend_sensitivity, 1.0);

        let metric = MetricConfig {
            expected_interval_sec: Some(5.0),
            ..metric
        };
        assert_eq!(metric.policy().unwrap().expected_interval_sec, 5.0);
    }

    #[test]
    fn test_bad_direction_and_aggregation() {
        let metric = MetricConfig {
            state_direction: "sideways".to_string(),
            ..MetricConfig::new("cpu", 0.0, 70.0, 90.0)
        };
        assert!(matches!(
            metric.policy(),
            Err(ReasoningError::UnknownDirection(_))
        ));

        let mut config = ServiceConfig::default();
        config.metrics.get_mut("cpu").unwrap().aggregation = Some("mode".to_string());
        assert!(matches!(config.validate(), Err(ServiceError::Config(_))));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "port": 9200,
                "nodes": ["uk-sa2341-hnode-v0-a1a0"],
                "metrics": {{
                    "rssi": {{"metric": "trx_rssi", "min": -105, "medium": -90, "max": 0,
                              "state_direction": "lower_is_worse", "aggregation": "median"}}
                }}
            }}"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = ServiceConfig::load(file.path()).unwrap();
        assert_eq!(config.port, 9200);
        assert_eq!(config.period_secs, 30);
        assert_eq!(config.nodes.len(), 1);
        assert_eq!(config.metrics.len(), 1);

        let policies = config.policies().unwrap();
        assert_eq!(policies["rssi"].aggregation, "median");
        assert_eq!(policies["rssi"].direction, StateDirection::LowerIsWorse);
    }

    #[test]
    fn test_zero_period_rejected() {
        let config = ServiceConfig {
            period_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
