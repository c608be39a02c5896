// Reasoning Service - Metric evaluator daemon
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Key/value store for window bookkeeping and evaluation results.
//!
//! Keys are `<node>/<metric>/algo_stats` for the latest evaluation and
//! `<node>/<metric>/window` for the last evaluated window.

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Store failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Minimal get/put contract.
pub trait Store: Send + Sync {
    /// Value under `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite `key`.
    fn put(&self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Key of the latest evaluation for `(node, metric)`.
pub fn stats_key(node: &str, metric: &str) -> String {
    format!("{}/{}/algo_stats", node, metric)
}

/// Key of the last evaluated window for `(node, metric)`.
pub fn window_key(node: &str, metric: &str) -> String {
    format!("{}/{}/window", node, metric)
}
