// Reasoning Service - Metric evaluator daemon
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Service error types.

use crate::store::StoreError;
use metric_reasoning::ReasoningError;
use thiserror::Error;

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors raised at the service boundary.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Policy or response decoding error from the core.
    #[error("Reasoning error: {0}")]
    Reasoning(#[from] ReasoningError),

    /// Key/value store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Telemetry backend request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Fetch did not finish in time.
    #[error("Fetch timed out after {0}ms")]
    Timeout(u64),

    /// Query string not understood by the source.
    #[error("Unsupported query: {0}")]
    Query(String),

    /// Bad configuration file or flags.
    #[error("Config error: {0}")]
    Config(String),

    #[cfg(feature = "replay")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reasoning_error() {
        let err: ServiceError = ReasoningError::UnknownDirection("up".to_string()).into();
        assert!(matches!(err, ServiceError::Reasoning(_)));
        assert!(err.to_string().contains("up"));
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(
            ServiceError::Timeout(500).to_string(),
            "Fetch timed out after 500ms"
        );
    }
}
