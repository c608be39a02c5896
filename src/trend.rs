// Metric Reasoning - Metric evaluation engine
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Short-term trend classification (current window vs previous window).

use crate::aggregate::AggregationStats;
use crate::NOISE_EPSILON;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ratio of noise to magnitude above which a window is called volatile.
pub const DEFAULT_VOLATILITY_RATIO: f64 = 0.5;

/// Direction of movement between two consecutive windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Stable,
    Increasing,
    Decreasing,
    Volatile,
    /// Not classified (insufficient coverage).
    Unknown,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Stable => "stable",
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Volatile => "volatile",
            Trend::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Volatility override settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityOverride {
    pub enabled: bool,
    /// `noise / |value|` above this is volatile.
    pub ratio: f64,
}

impl Default for VolatilityOverride {
    fn default() -> Self {
        Self {
            enabled: true,
            ratio: DEFAULT_VOLATILITY_RATIO,
        }
    }
}

/// Classify with the default volatility override (enabled, ratio 0.5).
pub fn classify_trend(now: &AggregationStats, prev: &AggregationStats, sensitivity: f64) -> Trend {
    classify_trend_with(now, prev, sensitivity, VolatilityOverride::default())
}

/// Classify the move from `prev` to `now`, normalized by the current noise.
pub fn classify_trend_with(
    now: &AggregationStats,
    prev: &AggregationStats,
    sensitivity: f64,
    volatility: VolatilityOverride,
) -> Trend {
    let sensitivity = if sensitivity <= 0.0 || sensitivity.is_nan() {
        1.0
    } else {
        sensitivity
    };

    let delta = now.aggregated_value - prev.aggregated_value;

    let noise = now.noise_estimate;
    if noise.is_nan() || noise == f64::INFINITY {
        return Trend::Stable;
    }
    let noise = noise + NOISE_EPSILON;

    let magnitude = now.aggregated_value.abs();
    if volatility.enabled && magnitude > NOISE_EPSILON && noise / magnitude > volatility.ratio {
        return Trend::Volatile;
    }

    let threshold = sensitivity * noise;
    if delta.abs() < threshold {
        Trend::Stable
    } else if delta > 0.0 {
        Trend::Increasing
    } else {
        Trend::Decreasing
    }
}

/// `|delta| / max(noise, epsilon)`: size of the move relative to normal variation.
pub fn signal_strength(now: &AggregationStats, prev: &AggregationStats) -> f64 {
    let delta = now.aggregated_value - prev.aggregated_value;
    let strength = delta.abs() / now.noise_estimate.max(NOISE_EPSILON);
    if strength.is_nan() {
        0.0
    } else {
        strength
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(value: f64, noise: f64) -> AggregationStats {
        AggregationStats {
            aggregated_value: value,
            noise_estimate: noise,
            sample_count: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_increasing_and_decreasing() {
        assert_eq!(
            classify_trend(&stats(12.0, 1.0), &stats(10.0, 1.0), 1.0),
            Trend::Increasing
        );
        assert_eq!(
            classify_trend(&stats(8.0, 1.0), &stats(10.0, 1.0), 1.0),
            Trend::Decreasing
        );
    }

    #[test]
    fn test_stable_within_noise() {
        assert_eq!(
            classify_trend(&stats(10.5, 1.0), &stats(10.0, 1.0), 1.0),
            Trend::Stable
        );
    }

    #[test]
    fn test_sensitivity_scales_threshold() {
        let now = stats(12.0, 1.0);
        let prev = stats(10.0, 1.0);
        assert_eq!(classify_trend(&now, &prev, 3.0), Trend::Stable);
        assert_eq!(classify_trend(&now, &prev, 1.5), Trend::Increasing);
    }

    #[test]
    fn test_non_positive_sensitivity_defaults_to_one() {
        let now = stats(11.5, 1.0);
        let prev = stats(10.0, 1.0);
        assert_eq!(classify_trend(&now, &prev, 0.0), Trend::Increasing);
        assert_eq!(classify_trend(&now, &prev, -4.0), Trend::Increasing);
    }

    #[test]
    fn test_volatility_dominates_delta() {
        let now = stats(1.0, 0.6);
        assert_eq!(classify_trend(&now, &stats(1.0, 0.0), 1.0), Trend::Volatile);
        assert_eq!(classify_trend(&now, &stats(-50.0, 0.0), 1.0), Trend::Volatile);
        assert_eq!(classify_trend(&now, &stats(50.0, 0.0), 1.0), Trend::Volatile);
    }

    #[test]
    fn test_volatility_override_disabled() {
        let off = VolatilityOverride {
            enabled: false,
            ratio: 0.5,
        };
        assert_eq!(
            classify_trend_with(&stats(1.0, 0.6), &stats(1.0, 0.0), 1.0, off),
            Trend::Stable
        );
    }

    #[test]
    fn test_zero_magnitude_skips_volatility() {
        // |value| <= epsilon never triggers the ratio check
        assert_eq!(
            classify_trend(&stats(0.0, 0.1), &stats(0.0, 0.1), 1.0),
            Trend::Stable
        );
    }

    #[test]
    fn test_degenerate_noise_is_stable() {
        assert_eq!(
            classify_trend(&stats(100.0, f64::NAN), &stats(0.0, 0.0), 1.0),
            Trend::Stable
        );
        assert_eq!(
            classify_trend(&stats(100.0, f64::INFINITY), &stats(0.0, 0.0), 1.0),
            Trend::Stable
        );
    }

    #[test]
    fn test_identical_constant_windows_are_stable() {
        let w = stats(5.0, 0.0);
        assert_eq!(classify_trend(&w, &w, 1.0), Trend::Stable);
    }

    #[test]
    fn test_signal_strength() {
        assert!((signal_strength(&stats(12.0, 2.0), &stats(10.0, 0.0)) - 1.0).abs() < 1e-12);
        // Zero noise clamps to epsilon rather than dividing by zero
        let s = signal_strength(&stats(1.0, 0.0), &stats(0.0, 0.0));
        assert!(s.is_finite() && s > 1e9);
        assert_eq!(signal_strength(&stats(5.0, 0.0), &stats(5.0, 0.0)), 0.0);
    }

    #[test]
    fn test_trend_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Trend::Volatile).unwrap(), "\"volatile\"");
        assert_eq!(Trend::Increasing.to_string(), "increasing");
    }
}
