// Metric Reasoning - Metric evaluation engine
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Confidence scoring.
//!
//! `0.5 * coverage + 0.3 * saturated signal + 0.2 * trend consistency`,
//! discounted to 40% when the state is unknown.

use crate::state::HealthState;
use crate::NOISE_EPSILON;

/// Weight of sample coverage.
pub const COVERAGE_WEIGHT: f64 = 0.5;
/// Weight of signal-to-noise strength.
pub const SIGNAL_WEIGHT: f64 = 0.3;
/// Weight of trend consistency.
pub const CONSISTENCY_WEIGHT: f64 = 0.2;
/// Multiplier applied when the state is unknown.
pub const UNKNOWN_STATE_DISCOUNT: f64 = 0.4;
/// Confidence reported when coverage gates the evaluation.
pub const LOW_COVERAGE_CONFIDENCE: f64 = 0.2;

fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Combine the three evidence components into a score in `[0, 1]`.
pub fn confidence(
    coverage_pct: f64,
    signal_strength: f64,
    consistency_score: f64,
    state: HealthState,
) -> f64 {
    let cov = clamp01(coverage_pct);
    let sig = clamp01(signal_strength / (signal_strength + 1.0));
    let con = clamp01(consistency_score);

    let mut base = COVERAGE_WEIGHT * cov + SIGNAL_WEIGHT * sig + CONSISTENCY_WEIGHT * con;
    if state == HealthState::Unknown {
        base *= UNKNOWN_STATE_DISCOUNT;
    }

    clamp01(base)
}

/// `|corr(index, value)|` over the window's values in order.
///
/// Fewer than three values, or a flat series, score zero.
pub fn trend_consistency(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return 0.0;
    }

    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut ss_x = 0.0;
    let mut ss_y = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        ss_x += dx * dx;
        ss_y += dy * dy;
    }

    if ss_x / nf < NOISE_EPSILON || ss_y / nf < NOISE_EPSILON {
        return 0.0;
    }

    clamp01((cov / (ss_x * ss_y).sqrt()).abs())
}
