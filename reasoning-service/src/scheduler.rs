// Reasoning Service - Metric evaluator daemon
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Periodic evaluation of every `(node, metric)` pair.
//!
//! Each tick spawns one task per pair. A task advances the pair's window,
//! fetches `[now - 2W, now]` under a timeout, evaluates, persists the
//! result and publishes gauges. The window is recorded only after the
//! result is stored, so a failed pair is retried on the next tick. A
//! failing pair is logged and counted; it never stops the rest of the batch.

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::metrics::{record_evaluation, record_fetch_failure, record_outcome, Outcome};
use crate::source::{node_query, SampleSource};
use crate::store::{stats_key, Store};
use crate::window::WindowTracker;
use metric_reasoning::{EvaluationPolicy, Evaluator, MetricEvaluation};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// One `(node, metric)` pair to evaluate.
#[derive(Debug, Clone)]
pub struct Job {
    pub node: String,
    /// Catalog key, used in store keys and labels.
    pub metric: String,
    /// Range query for the source.
    pub query: String,
    /// Query resolution in seconds.
    pub step: f64,
    pub policy: EvaluationPolicy,
}

/// Counters shared with the HTTP surface.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    pub ticks: AtomicU64,
    pub evaluations: AtomicU64,
    pub skipped: AtomicU64,
    pub failures: AtomicU64,
}

/// Summary of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub evaluated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Drives evaluations on a fixed period.
pub struct Scheduler {
    source: Arc<dyn SampleSource>,
    store: Arc<dyn Store>,
    jobs: Vec<Arc<Job>>,
    period: Duration,
    fetch_timeout: Duration,
    stats: Arc<SchedulerStats>,
}

impl Scheduler {
    /// One job per configured node and catalog metric.
    pub fn new(
        config: &ServiceConfig,
        nodes: &[String],
        source: Arc<dyn SampleSource>,
        store: Arc<dyn Store>,
    ) -> Result<Self> {
        config.validate()?;
        let policies = config.policies()?;

        let mut jobs = Vec::new();
        for node in nodes {
            for (key, metric) in &config.metrics {
                let policy = policies
                    .get(key)
                    .cloned()
                    .ok_or_else(|| ServiceError::Config(format!("no policy for {}", key)))?;
                jobs.push(Arc::new(Job {
                    node: node.clone(),
                    metric: key.clone(),
                    query: node_query(&metric.metric, node),
                    step: policy.expected_interval_sec,
                    policy,
                }));
            }
        }

        Ok(Self {
            source,
            store,
            jobs,
            period: Duration::from_secs(config.period_secs),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            stats: Arc::new(SchedulerStats::default()),
        })
    }

    /// Builder: override the fetch timeout.
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn jobs(&self) -> &[Arc<Job>] {
        &self.jobs
    }

    pub fn stats(&self) -> Arc<SchedulerStats> {
        Arc::clone(&self.stats)
    }

    /// Tick forever.
    pub async fn run(self) {
        info!(
            "Scheduler started: {} jobs every {}s",
            self.jobs.len(),
            self.period.as_secs()
        );

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let now = self.source.now();
            let report = self.tick(now).await;
            info!(
                evaluated = report.evaluated,
                skipped = report.skipped,
                failed = report.failed,
                "Tick complete"
            );
        }
    }

    /// Evaluate every job at logical time `now`.
    pub async fn tick(&self, now: f64) -> TickReport {
        let mut set = JoinSet::new();

        for job in &self.jobs {
            let job = Arc::clone(job);
            let source = Arc::clone(&self.source);
            let store = Arc::clone(&self.store);
            let fetch_timeout = self.fetch_timeout;

            set.spawn(async move {
                let result =
                    run_job(&job, source.as_ref(), store.as_ref(), now, fetch_timeout).await;
                (job, result)
            });
        }

        let mut report = TickReport::default();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((job, Ok(Some(eval)))) => {
                    record_evaluation(&job.node, &job.metric, &eval);
                    info!(
                        node = %job.node,
                        metric = %job.metric,
                        state = %eval.state,
                        trend = %eval.trend,
                        conclusion = %eval.conclusion,
                        confidence = eval.confidence,
                        evaluated_at = %eval
                            .evaluated_at_utc()
                            .map(|t| t.to_rfc3339())
                            .unwrap_or_default(),
                        "Evaluated"
                    );
                    report.evaluated += 1;
                }
                Ok((job, Ok(None))) => {
                    debug!(node = %job.node, metric = %job.metric, "Window already evaluated");
                    report.skipped += 1;
                }
                Ok((job, Err(e))) => {
                    warn!(node = %job.node, metric = %job.metric, error = %e, "Evaluation failed");
                    record_outcome(Outcome::Error);
                    report.failed += 1;
                }
                Err(e) => {
                    error!("Evaluation task panicked: {}", e);
                    record_outcome(Outcome::Error);
                    report.failed += 1;
                }
            }
        }

        self.stats.ticks.fetch_add(1, Ordering::SeqCst);
        self.stats
            .evaluations
            .fetch_add(report.evaluated as u64, Ordering::SeqCst);
        self.stats
            .skipped
            .fetch_add(report.skipped as u64, Ordering::SeqCst);
        self.stats
            .failures
            .fetch_add(report.failed as u64, Ordering::SeqCst);

        report
    }
}

/// Evaluate one job; `None` when its window was already evaluated.
async fn run_job(
    job: &Job,
    source: &dyn SampleSource,
    store: &dyn Store,
    now: f64,
    fetch_timeout: Duration,
) -> Result<Option<MetricEvaluation>> {
    let Some(window) =
        WindowTracker::advance(store, &job.node, &job.metric, now, job.policy.window_sec)?
    else {
        return Ok(None);
    };

    let (start, end) = window.fetch_range();
    let fetched = match timeout(fetch_timeout, source.fetch(&job.query, start, end, job.step)).await
    {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Timeout(fetch_timeout.as_millis() as u64)),
    };
    let raw = fetched.map_err(|e| {
        record_fetch_failure(&job.metric);
        e
    })?;

    let eval = Evaluator::new().evaluate(&job.metric, &raw, window.end, &job.policy)?;
    store.put(&stats_key(&job.node, &job.metric), serde_json::to_string(&eval)?)?;
    WindowTracker::commit(store, &job.node, &job.metric, &window)?;

    Ok(Some(eval))
}
