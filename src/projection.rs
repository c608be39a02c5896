// Metric Reasoning - Metric evaluation engine
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Time-to-threshold projection.
//!
//! Linear extrapolation of the window-to-window slope toward the warning
//! level. Only `higher_is_worse` and `lower_is_worse` project; a `range`
//! band has two boundaries on each side and is not projected.

use crate::state::{StateDirection, StateThresholds};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which boundary a projection targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    ToWarning,
}

impl ProjectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionKind::ToWarning => "to_warning",
        }
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A projected threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectionStats {
    #[serde(rename = "Type")]
    pub kind: ProjectionKind,
    /// Seconds until the crossing at the current slope.
    pub eta_sec: f64,
}

/// Project when `value_now` reaches the warning level.
///
/// `None` when inputs are not finite, the window is empty, the value has
/// already crossed, the slope points away from the threshold, or the
/// direction is `range`.
pub fn project_crossing(
    value_now: f64,
    value_prev: f64,
    window_sec: f64,
    thresholds: &StateThresholds,
    direction: StateDirection,
) -> Option<ProjectionStats> {
    if !value_now.is_finite() || !value_prev.is_finite() || !(window_sec > 0.0) {
        return None;
    }

    let slope = (value_now - value_prev) / window_sec;

    let eta_sec = match (direction, thresholds) {
        (StateDirection::HigherIsWorse, StateThresholds::Scale { warning, .. }) => {
            if value_now >= *warning || slope <= 0.0 {
                return None;
            }
            (warning - value_now) / slope
        }
        (StateDirection::LowerIsWorse, StateThresholds::Scale { warning, .. }) => {
            if value_now <= *warning || slope >= 0.0 {
                return None;
            }
            (value_now - warning) / slope.abs()
        }
        _ => return None,
    };

    if !eta_sec.is_finite() {
        return None;
    }

    Some(ProjectionStats {
        kind: ProjectionKind::ToWarning,
        eta_sec,
    })
}
