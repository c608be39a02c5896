// Metric Reasoning - Metric evaluation engine
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Health state classification against directional thresholds.

use crate::error::{ReasoningError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which side of the thresholds is bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateDirection {
    /// Larger values are worse (CPU, memory, temperature).
    #[default]
    HigherIsWorse,
    /// Smaller values are worse (signal strength, battery).
    LowerIsWorse,
    /// Values outside a band are worse.
    Range,
}

impl StateDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateDirection::HigherIsWorse => "higher_is_worse",
            StateDirection::LowerIsWorse => "lower_is_worse",
            StateDirection::Range => "range",
        }
    }
}

impl fmt::Display for StateDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateDirection {
    type Err = ReasoningError;

    /// Empty input selects `higher_is_worse`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "higher_is_worse" => Ok(StateDirection::HigherIsWorse),
            "lower_is_worse" => Ok(StateDirection::LowerIsWorse),
            "range" => Ok(StateDirection::Range),
            other => Err(ReasoningError::UnknownDirection(other.to_string())),
        }
    }
}

/// Threshold levels for one metric. Built once with the policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateThresholds {
    /// Two-point scale for `higher_is_worse` / `lower_is_worse`.
    Scale { warning: f64, critical: f64 },
    /// Four-point band for `range`.
    Band {
        low_warning: f64,
        high_warning: f64,
        low_critical: f64,
        high_critical: f64,
    },
}

impl Default for StateThresholds {
    fn default() -> Self {
        StateThresholds::Scale {
            warning: 70.0,
            critical: 90.0,
        }
    }
}

impl StateThresholds {
    /// Two-point scale.
    pub fn scale(warning: f64, critical: f64) -> Self {
        StateThresholds::Scale { warning, critical }
    }

    /// Four-point band; requires `low_critical <= low_warning <= high_warning <= high_critical`.
    pub fn band(
        low_warning: f64,
        high_warning: f64,
        low_critical: f64,
        high_critical: f64,
    ) -> Result<Self> {
        let ordered = low_critical <= low_warning
            && low_warning <= high_warning
            && high_warning <= high_critical;
        if !ordered {
            return Err(ReasoningError::InvalidThresholds {
                direction: StateDirection::Range.to_string(),
                reason: format!(
                    "expected low_critical <= low_warning <= high_warning <= high_critical, got {} {} {} {}",
                    low_critical, low_warning, high_warning, high_critical
                ),
            });
        }
        Ok(StateThresholds::Band {
            low_warning,
            high_warning,
            low_critical,
            high_critical,
        })
    }

    /// Map a metric's configured `{min, medium, max}` levels onto a scale.
    ///
    /// `higher_is_worse`: warning = medium, critical = max.
    /// `lower_is_worse`: warning = medium, critical = min.
    /// `range` has no three-level form and needs [`StateThresholds::band`].
    pub fn from_levels(direction: StateDirection, min: f64, medium: f64, max: f64) -> Result<Self> {
        match direction {
            StateDirection::HigherIsWorse => Ok(Self::scale(medium, max)),
            StateDirection::LowerIsWorse => Ok(Self::scale(medium, min)),
            StateDirection::Range => Err(ReasoningError::InvalidThresholds {
                direction: direction.to_string(),
                reason: "range direction requires band levels".to_string(),
            }),
        }
    }

    /// Whether this threshold shape is usable with `direction`.
    pub fn matches(&self, direction: StateDirection) -> bool {
        matches!(
            (direction, self),
            (StateDirection::HigherIsWorse, StateThresholds::Scale { .. })
                | (StateDirection::LowerIsWorse, StateThresholds::Scale { .. })
                | (StateDirection::Range, StateThresholds::Band { .. })
        )
    }

    /// Warning level of a scale; `None` for bands.
    pub fn warning(&self) -> Option<f64> {
        match self {
            StateThresholds::Scale { warning, .. } => Some(*warning),
            StateThresholds::Band { .. } => None,
        }
    }
}

/// Health classification of the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Warning,
    Critical,
    #[default]
    Unknown,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Healthy => "healthy",
            HealthState::Warning => "warning",
            HealthState::Critical => "critical",
            HealthState::Unknown => "unknown",
        }
    }

    /// Numeric code for gauges: 0 healthy, 1 warning, 2 critical, 3 unknown.
    pub fn code(&self) -> u8 {
        match self {
            HealthState::Healthy => 0,
            HealthState::Warning => 1,
            HealthState::Critical => 2,
            HealthState::Unknown => 3,
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `value` against `thresholds` in the given direction.
///
/// Non-finite values, and a threshold shape that does not fit the
/// direction, give `Unknown`.
pub fn classify_state(
    value: f64,
    thresholds: &StateThresholds,
    direction: StateDirection,
) -> HealthState {
    if !value.is_finite() {
        return HealthState::Unknown;
    }

    match (direction, *thresholds) {
        (StateDirection::HigherIsWorse, StateThresholds::Scale { warning, critical }) => {
            if value >= critical {
                HealthState::Critical
            } else if value >= warning {
                HealthState::Warning
            } else {
                HealthState::Healthy
            }
        }
        (StateDirection::LowerIsWorse, StateThresholds::Scale { warning, critical }) => {
            if value <= critical {
                HealthState::Critical
            } else if value <= warning {
                HealthState::Warning
            } else {
                HealthState::Healthy
            }
        }
        (
            StateDirection::Range,
            StateThresholds::Band {
                low_warning,
                high_warning,
                low_critical,
                high_critical,
            },
        ) => {
            if value < low_critical || value > high_critical {
                HealthState::Critical
            } else if value < low_warning || value > high_warning {
                HealthState::Warning
            } else {
                HealthState::Healthy
            }
        }
        (direction, _) => {
            trace_eval!("threshold shape does not fit direction {}", direction);
            HealthState::Unknown
        }
    }
}
