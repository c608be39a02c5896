// Reasoning Service - Metric evaluator daemon
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! HTTP surface.

use crate::metrics::encode_metrics;
use crate::scheduler::SchedulerStats;
use crate::store::{stats_key, Store};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use metric_reasoning::MetricEvaluation;
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

/// Application state shared across handlers.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub stats: Arc<SchedulerStats>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, stats: Arc<SchedulerStats>) -> Self {
        Self {
            store,
            stats,
            start_time: Instant::now(),
        }
    }
}

/// Build the router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/status", get(status_handler))
        .route(
            "/v1/reasoning/stats/nodes/:node/metrics/:metric",
            get(algo_stats_handler),
        )
        .with_state(state)
}

/// Root handler - shows a simple HTML page.
async fn root_handler() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Reasoning Service</title></head>
<body>
    <h1>Reasoning Service</h1>
    <p>Metric evaluation: aggregate, trend, health state, confidence and projection.</p>
    <ul>
        <li><a href="/metrics">/metrics</a> - Prometheus metrics</li>
        <li><a href="/health">/health</a> - Health check</li>
        <li><a href="/ready">/ready</a> - Readiness check</li>
        <li><a href="/status">/status</a> - Status information (JSON)</li>
        <li><code>/v1/reasoning/stats/nodes/{node}/metrics/{metric}</code> - Latest evaluation</li>
    </ul>
</body>
</html>"#,
    )
}

/// Metrics handler - returns Prometheus text format.
async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        encode_metrics(),
    )
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Ready once the first tick has finished.
async fn ready_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.stats.ticks.load(Ordering::SeqCst) > 0 {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
    }
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    ticks: u64,
    evaluations: u64,
    skipped: u64,
    failures: u64,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        ticks: state.stats.ticks.load(Ordering::SeqCst),
        evaluations: state.stats.evaluations.load(Ordering::SeqCst),
        skipped: state.stats.skipped.load(Ordering::SeqCst),
        failures: state.stats.failures.load(Ordering::SeqCst),
    })
}

/// Latest evaluation for a node and metric.
async fn algo_stats_handler(
    State(state): State<Arc<AppState>>,
    Path((node, metric)): Path<(String, String)>,
) -> Result<Json<MetricEvaluation>, (StatusCode, String)> {
    let key = stats_key(&node, &metric);

    let raw = match state.store.get(&key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                format!("no evaluation for {} on {}", metric, node),
            ))
        }
        Err(e) => {
            error!(key = %key, error = %e, "Store read failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    serde_json::from_str(&raw).map(Json).map_err(|e| {
        error!(key = %key, error = %e, "Stored evaluation is undecodable");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}
