// Metric Reasoning - Metric evaluation engine
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Semantic conclusion from `(state, trend)`.

use crate::state::HealthState;
use crate::trend::Trend;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the state and trend together mean for an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Ok,
    Degrading,
    Recovering,
    RiskRising,
    Persistent,
    Unknown,
}

impl Conclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conclusion::Ok => "ok",
            Conclusion::Degrading => "degrading",
            Conclusion::Recovering => "recovering",
            Conclusion::RiskRising => "risk_rising",
            Conclusion::Persistent => "persistent",
            Conclusion::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combine a state and a trend.
pub fn combine(state: HealthState, trend: Trend) -> Conclusion {
    match (state, trend) {
        (HealthState::Critical, Trend::Decreasing) => Conclusion::Recovering,
        (HealthState::Critical, _) => Conclusion::Degrading,

        (HealthState::Warning, Trend::Increasing) => Conclusion::RiskRising,
        (HealthState::Warning, Trend::Decreasing) => Conclusion::Recovering,
        (HealthState::Warning, _) => Conclusion::Persistent,

        (HealthState::Healthy, Trend::Increasing) => Conclusion::RiskRising,
        (HealthState::Healthy, _) => Conclusion::Ok,

        (HealthState::Unknown, _) => Conclusion::Unknown,
    }
}
