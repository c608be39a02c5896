// Metric Reasoning - Metric evaluation engine
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Error types for the reasoning engine.
//!
//! Only configuration problems and malformed upstream payloads are errors.
//! Low coverage and numeric degeneracy degrade the evaluation instead.

use thiserror::Error;

/// Result type alias for reasoning operations
pub type Result<T> = std::result::Result<T, ReasoningError>;

/// Main error type for reasoning operations
#[derive(Error, Debug)]
pub enum ReasoningError {
    /// Aggregation method name not in {mean, median, last, p95, sum}
    #[error("Unknown aggregation method: {0}")]
    UnknownAggregation(String),

    /// State direction name not recognized
    #[error("Unknown state direction: {0}")]
    UnknownDirection(String),

    /// Policy fails validation
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// Threshold shape does not match the direction, or levels are out of order
    #[error("Invalid thresholds for {direction}: {reason}")]
    InvalidThresholds { direction: String, reason: String },

    /// Telemetry response is structurally wrong
    #[error("Malformed telemetry response: {0}")]
    MalformedResponse(String),

    /// JSON decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
