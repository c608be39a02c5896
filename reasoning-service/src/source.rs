// Reasoning Service - Metric evaluator daemon
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Sample sources.
//!
//! A source answers range queries of the form `series{nodeid="<node>"}` with
//! raw series in the Prometheus wire shape, and supplies the clock the
//! scheduler evaluates against.

use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use metric_reasoning::{parse_query_response, RawSeries};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Label carrying the node identity.
pub const NODE_LABEL: &str = "nodeid";

/// Something that can return raw samples for a query and time range.
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// Samples of `query` in `[start, end]` at `step` seconds resolution.
    async fn fetch(&self, query: &str, start: f64, end: f64, step: f64) -> Result<Vec<RawSeries>>;

    /// Current time, seconds since the UNIX epoch.
    fn now(&self) -> f64 {
        Utc::now().timestamp_millis() as f64 / 1000.0
    }
}

/// Range query selecting one series on one node.
pub fn node_query(series: &str, node: &str) -> String {
    format!("{}{{{}=\"{}\"}}", series, NODE_LABEL, node)
}

/// Split a query built by [`node_query`] back into `(series, node)`.
pub fn parse_node_query(query: &str) -> Option<(&str, &str)> {
    let (series, rest) = query.split_once('{')?;
    let selector = rest.strip_suffix('}')?;
    let (label, value) = selector.split_once('=')?;
    if label.trim() != NODE_LABEL {
        return None;
    }
    let node = value.trim().strip_prefix('"')?.strip_suffix('"')?;
    Some((series.trim(), node))
}

/// Prometheus HTTP API source.
pub struct PrometheusSource {
    client: Client,
    base_url: String,
}

impl PrometheusSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SampleSource for PrometheusSource {
    async fn fetch(&self, query: &str, start: f64, end: f64, step: f64) -> Result<Vec<RawSeries>> {
        let url = format!("{}/api/v1/query_range", self.base_url);
        debug!(%url, query, start, end, step, "Querying Prometheus");

        // Error statuses still carry a JSON body with the reason.
        let body = self
            .client
            .get(&url)
            .query(&[
                ("query", query.to_string()),
                ("start", format!("{:.3}", start)),
                ("end", format!("{:.3}", end)),
                ("step", format!("{}s", step.max(1.0))),
            ])
            .send()
            .await?
            .text()
            .await?;

        Ok(parse_query_response(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use axum::{extract::Query, routing::get, Router};
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    #[test]
    fn test_node_query_roundtrip() {
        let q = node_query("trx_soc_cpu_usage", "uk-sa2341-hnode-v0-a1a0");
        assert_eq!(q, "trx_soc_cpu_usage{nodeid=\"uk-sa2341-hnode-v0-a1a0\"}");
        assert_eq!(
            parse_node_query(&q),
            Some(("trx_soc_cpu_usage", "uk-sa2341-hnode-v0-a1a0"))
        );
    }

    #[test]
    fn test_parse_node_query_rejects_other_selectors() {
        assert_eq!(parse_node_query("cpu"), None);
        assert_eq!(parse_node_query("cpu{job=\"x\"}"), None);
        assert_eq!(parse_node_query("cpu{nodeid=x}"), None);
    }

    async fn fake_prometheus(body: &'static str) -> String {
        let app = Router::new().route(
            "/api/v1/query_range",
            get(move |Query(params): Query<HashMap<String, String>>| async move {
                assert!(params.contains_key("query"));
                assert!(params.contains_key("start"));
                assert!(params["step"].ends_with('s'));
                body
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_prometheus_fetch() {
        let url = fake_prometheus(
            r#"{"status":"success","data":{"resultType":"matrix","result":[
                {"metric":{"nodeid":"n1"},"values":[[100,"1"],[115,"2"]]}]}}"#,
        )
        .await;

        let source = PrometheusSource::new(&url, Duration::from_secs(5)).unwrap();
        let series = source
            .fetch(&node_query("cpu", "n1"), 0.0, 200.0, 15.0)
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].len(), 2);
    }

    #[tokio::test]
    async fn test_prometheus_error_body() {
        let url =
            fake_prometheus(r#"{"status":"error","errorType":"bad_data","error":"bad query"}"#)
                .await;

        let source = PrometheusSource::new(&url, Duration::from_secs(5)).unwrap();
        let err = source.fetch("cpu", 0.0, 1.0, 1.0).await.unwrap_err();
        assert!(matches!(err, ServiceError::Reasoning(_)));
    }

    #[tokio::test]
    async fn test_prometheus_unreachable() {
        let source =
            PrometheusSource::new("http://127.0.0.1:1/", Duration::from_millis(500)).unwrap();
        assert_eq!(source.base_url(), "http://127.0.0.1:1");
        let err = source.fetch("cpu", 0.0, 1.0, 1.0).await.unwrap_err();
        assert!(matches!(err, ServiceError::Http(_)));
    }
}
