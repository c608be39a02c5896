// Reasoning Service - Metric evaluator daemon
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! # Reasoning Service
//!
//! Periodically evaluates every configured `(node, metric)` pair, stores
//! the latest `MetricEvaluation` per pair and exposes it over REST and as
//! Prometheus gauges.
//!
//! ## Usage
//!
//! ```bash
//! # Against a Prometheus server
//! reasoning-service --config reasoning.json --prometheus-url http://prometheus:9090
//!
//! # Replay a CSV dataset ten times faster than real time
//! reasoning-service --csv dataset.csv --speed 10.0 --period-secs 5
//! ```

mod api;
mod config;
mod error;
mod metrics;
mod scheduler;
mod source;
mod store;
mod window;

#[cfg(feature = "replay")]
mod replay;

use clap::Parser;
use config::ServiceConfig;
use error::{Result, ServiceError};
use scheduler::Scheduler;
use source::{PrometheusSource, SampleSource};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use store::MemoryStore;
use tokio::net::TcpListener;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "replay")]
use replay::ReplaySource;

/// Metric reasoning evaluator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Prometheus base URL (overrides config)
    #[arg(long)]
    prometheus_url: Option<String>,

    /// CSV dataset to replay instead of querying Prometheus
    #[arg(short, long)]
    csv: Option<PathBuf>,

    /// Replay speed multiplier (1.0 = real-time)
    #[arg(short, long, default_value = "1.0")]
    speed: f64,

    /// Seconds between evaluation ticks (overrides config)
    #[arg(long)]
    period_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Reasoning Service v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ServiceConfig::load(path)?,
        None => {
            info!("No config file given, using the built-in catalog");
            ServiceConfig::default()
        }
    };

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(url) = args.prometheus_url.clone() {
        config.prometheus_url = url;
    }
    if let Some(period) = args.period_secs {
        config.period_secs = period;
    }

    let (source, nodes) = build_source(&args, &config)?;
    if nodes.is_empty() {
        return Err(ServiceError::Config("no nodes to evaluate".to_string()));
    }

    let store = Arc::new(MemoryStore::new());
    let scheduler = Scheduler::new(&config, &nodes, source, store.clone())?;
    info!(
        "Evaluating {} pairs ({} nodes x {} metrics)",
        scheduler.jobs().len(),
        nodes.len(),
        config.metrics.len()
    );
    let state = Arc::new(api::AppState::new(store, scheduler.stats()));

    tokio::spawn(scheduler.run());

    let app = api::router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting server on http://{}", addr);
    info!("Metrics endpoint: http://{}/metrics", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Pick the sample source and the node list it serves.
fn build_source(
    args: &Args,
    config: &ServiceConfig,
) -> Result<(Arc<dyn SampleSource>, Vec<String>)> {
    #[cfg(feature = "replay")]
    if let Some(csv_path) = &args.csv {
        let replay = ReplaySource::from_csv(csv_path, args.speed)?;
        let nodes = if config.nodes.is_empty() {
            replay.nodes()
        } else {
            config.nodes.clone()
        };
        return Ok((Arc::new(replay), nodes));
    }

    #[cfg(not(feature = "replay"))]
    if args.csv.is_some() {
        tracing::warn!("Replay feature not enabled, ignoring --csv argument");
    }

    let source = PrometheusSource::new(
        &config.prometheus_url,
        Duration::from_secs(config.fetch_timeout_secs),
    )?;
    info!("Querying Prometheus at {}", source.base_url());
    Ok((Arc::new(source), config.nodes.clone()))
}
