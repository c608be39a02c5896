// Metric Reasoning - Metric evaluation engine
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Prometheus HTTP API response decoding.

use crate::error::{ReasoningError, Result};
use crate::sample::{Labels, RawSeries};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<Data>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Data {
    result_type: String,
    #[serde(default)]
    result: Vec<ResultEntry>,
}

#[derive(Debug, Deserialize)]
struct ResultEntry {
    #[serde(default)]
    metric: Labels,
    #[serde(default)]
    values: Vec<Vec<Value>>,
    #[serde(default)]
    value: Option<Vec<Value>>,
}

/// Decode a `query` or `query_range` response body into raw series.
pub fn parse_query_response(body: &str) -> Result<Vec<RawSeries>> {
    let envelope: Envelope = serde_json::from_str(body)?;

    if envelope.status != "success" {
        return Err(ReasoningError::MalformedResponse(format!(
            "status {}: {}",
            envelope.status,
            envelope.error.unwrap_or_default()
        )));
    }

    let data = envelope
        .data
        .ok_or_else(|| ReasoningError::MalformedResponse("missing data".to_string()))?;

    match data.result_type.as_str() {
        "matrix" => Ok(data
            .result
            .into_iter()
            .map(|entry| RawSeries {
                labels: entry.metric,
                values: entry.values,
            })
            .collect()),
        "vector" => Ok(data
            .result
            .into_iter()
            .map(|entry| RawSeries {
                labels: entry.metric,
                values: entry.value.into_iter().collect(),
            })
            .collect()),
        other => Err(ReasoningError::MalformedResponse(format!(
            "unsupported result type {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::filter_by_time;

    #[test]
    fn test_matrix() {
        let body = r#"{
            "status": "success",
            "data": {
                "resultType": "matrix",
                "result": [
                    {"metric": {"__name__": "cpu", "nodeid": "n1"},
                     "values": [[100, "1.5"], [115, "2"], ["130", "NaN?"]]}
                ]
            }
        }"#;

        let series = parse_query_response(body).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].labels["nodeid"], "n1");
        assert_eq!(series[0].len(), 3);

        // The bad pair is dropped at filtering, not here
        let filtered = filter_by_time(&series, 0.0, 1000.0);
        assert_eq!(filtered[0].len(), 2);
    }

    #[test]
    fn test_vector() {
        let body = r#"{"status":"success","data":{"resultType":"vector",
            "result":[{"metric":{"nodeid":"n2"},"value":[1700000000.5,"42"]}]}}"#;

        let series = parse_query_response(body).unwrap();
        let filtered = filter_by_time(&series, 0.0, f64::MAX);
        assert_eq!(filtered[0].samples[0].value, 42.0);
    }

    #[test]
    fn test_empty_result() {
        let body = r#"{"status":"success","data":{"resultType":"matrix","result":[]}}"#;
        assert!(parse_query_response(body).unwrap().is_empty());
    }

    #[test]
    fn test_error_status() {
        let body = r#"{"status":"error","errorType":"bad_data","error":"parse error"}"#;
        let err = parse_query_response(body).unwrap_err();
        assert!(matches!(err, ReasoningError::MalformedResponse(_)));
        assert!(err.to_string().contains("parse error"));
    }

    #[test]
    fn test_scalar_rejected() {
        let body = r#"{"status":"success","data":{"resultType":"scalar","result":[]}}"#;
        assert!(matches!(
            parse_query_response(body),
            Err(ReasoningError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_query_response("not json"),
            Err(ReasoningError::Json(_))
        ));
    }
}
