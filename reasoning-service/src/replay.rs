// Reasoning Service - Metric evaluator daemon
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Dataset replay source.
//!
//! Serves samples from a CSV file with the header
//! `timestamp_sec,node,metric,value`, where `metric` is the series name.
//! The replay clock starts at the first timestamp and advances at
//! `speed` times wall-clock rate.

use crate::error::{Result, ServiceError};
use crate::source::{parse_node_query, SampleSource, NODE_LABEL};
use async_trait::async_trait;
use metric_reasoning::RawSeries;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Deserialize)]
struct Row {
    timestamp_sec: f64,
    node: String,
    metric: String,
    value: String,
}

/// Dataset summary.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInfo {
    pub node_count: usize,
    pub series_count: usize,
    pub sample_count: usize,
    pub first_timestamp: f64,
    pub last_timestamp: f64,
}

/// Sample source backed by a CSV dataset.
pub struct ReplaySource {
    /// `(series, node)` -> chronologically ordered `(ts, value)`.
    series: BTreeMap<(String, String), Vec<(f64, String)>>,
    first_timestamp: f64,
    last_timestamp: f64,
    speed: f64,
    started: Instant,
}

impl ReplaySource {
    /// Load a dataset from `path`.
    pub fn from_csv(path: impl AsRef<Path>, speed: f64) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)?;

        let mut series: BTreeMap<(String, String), Vec<(f64, String)>> = BTreeMap::new();
        for record in reader.deserialize() {
            let row: Row = record?;
            series
                .entry((row.metric, row.node))
                .or_default()
                .push((row.timestamp_sec, row.value));
        }

        if series.is_empty() {
            return Err(ServiceError::Config(format!(
                "replay dataset {} is empty",
                path.display()
            )));
        }

        let mut first_timestamp = f64::INFINITY;
        let mut last_timestamp = f64::NEG_INFINITY;
        for samples in series.values_mut() {
            samples.sort_by(|a, b| a.0.total_cmp(&b.0));
            if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
                first_timestamp = first_timestamp.min(first.0);
                last_timestamp = last_timestamp.max(last.0);
            }
        }

        let source = Self {
            series,
            first_timestamp,
            last_timestamp,
            speed: if speed > 0.0 { speed } else { 1.0 },
            started: Instant::now(),
        };

        let info = source.dataset_info();
        info!(
            "Loaded dataset: {} nodes, {} series, {} samples, {}s span",
            info.node_count,
            info.series_count,
            info.sample_count,
            info.last_timestamp - info.first_timestamp
        );

        Ok(source)
    }

    /// Nodes present in the dataset.
    pub fn nodes(&self) -> Vec<String> {
        let nodes: BTreeSet<&String> = self.series.keys().map(|(_, node)| node).collect();
        nodes.into_iter().cloned().collect()
    }

    pub fn dataset_info(&self) -> DatasetInfo {
        DatasetInfo {
            node_count: self.nodes().len(),
            series_count: self.series.len(),
            sample_count: self.series.values().map(Vec::len).sum(),
            first_timestamp: self.first_timestamp,
            last_timestamp: self.last_timestamp,
        }
    }

    /// Replay time after `elapsed_secs` of wall-clock time.
    fn replay_time(&self, elapsed_secs: f64) -> f64 {
        (self.first_timestamp + elapsed_secs * self.speed).min(self.last_timestamp)
    }
}

#[async_trait]
impl SampleSource for ReplaySource {
    async fn fetch(&self, query: &str, start: f64, end: f64, _step: f64) -> Result<Vec<RawSeries>> {
        let (name, node) =
            parse_node_query(query).ok_or_else(|| ServiceError::Query(query.to_string()))?;

        let Some(samples) = self.series.get(&(name.to_string(), node.to_string())) else {
            return Ok(Vec::new());
        };

        let mut raw = RawSeries::default()
            .with_label("__name__", name)
            .with_label(NODE_LABEL, node);
        for (ts, value) in samples.iter().filter(|(ts, _)| *ts >= start && *ts <= end) {
            raw = raw.with_point(*ts, value);
        }

        Ok(vec![raw])
    }

    fn now(&self) -> f64 {
        self.replay_time(self.started.elapsed().as_secs_f64())
    }
}
