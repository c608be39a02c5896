// Reasoning Service - Metric evaluator daemon
// Copyright (c) 2025 Ukama Inc.
//
// Licensed under the Mozilla Public License, v. 2.0.
// See LICENSE file for details.

//! Rolling window bookkeeping.

use crate::store::{window_key, Store, StoreError};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// An evaluated window, `start` and `end` in seconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

impl Window {
    /// Range to fetch so both the current and previous window are present.
    pub fn fetch_range(&self) -> (f64, f64) {
        let len = self.end - self.start;
        (self.end - 2.0 * len, self.end)
    }
}

/// Advances the persisted window for each `(node, metric)`.
pub struct WindowTracker;

impl WindowTracker {
    /// Next window ending at `now`, or `None` if `now` was already covered.
    ///
    /// Nothing is written; call [`WindowTracker::commit`] once the window's
    /// evaluation is stored so a failed window is evaluated again.
    pub fn advance(
        store: &dyn Store,
        node: &str,
        metric: &str,
        now: f64,
        window_sec: f64,
    ) -> Result<Option<Window>, StoreError> {
        let key = window_key(node, metric);

        if let Some(raw) = store.get(&key)? {
            match serde_json::from_str::<Window>(&raw) {
                Ok(prev) if now <= prev.end => return Ok(None),
                Ok(_) => {}
                Err(e) => warn!(key = %key, error = %e, "Discarding undecodable window"),
            }
        }

        Ok(Some(Window {
            start: now - window_sec,
            end: now,
        }))
    }

    /// Record `window` as evaluated for `(node, metric)`.
    pub fn commit(
        store: &dyn Store,
        node: &str,
        metric: &str,
        window: &Window,
    ) -> Result<(), StoreError> {
        let encoded =
            serde_json::to_string(window).map_err(|e| StoreError::Backend(e.to_string()))?;
        store.put(&window_key(node, metric), encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn advance_and_commit(store: &MemoryStore, node: &str, metric: &str, now: f64) -> Option<Window> {
        let w = WindowTracker::advance(store, node, metric, now, 60.0).unwrap()?;
        WindowTracker::commit(store, node, metric, &w).unwrap();
        Some(w)
    }

    #[test]
    fn test_commit_persists() {
        let store = MemoryStore::new();
        let w = WindowTracker::advance(&store, "n1", "cpu", 1000.0, 60.0)
            .unwrap()
            .unwrap();
        assert_eq!(w, Window { start: 940.0, end: 1000.0 });
        assert_eq!(w.fetch_range(), (880.0, 1000.0));
        assert!(store.get(&window_key("n1", "cpu")).unwrap().is_none());

        WindowTracker::commit(&store, "n1", "cpu", &w).unwrap();
        let raw = store.get(&window_key("n1", "cpu")).unwrap().unwrap();
        let persisted: Window = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, w);
    }

    #[test]
    fn test_uncommitted_window_is_offered_again() {
        let store = MemoryStore::new();
        let first = WindowTracker::advance(&store, "n1", "cpu", 1000.0, 60.0).unwrap();
        let again = WindowTracker::advance(&store, "n1", "cpu", 1000.0, 60.0).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_repeated_tick_is_skipped() {
        let store = MemoryStore::new();
        advance_and_commit(&store, "n1", "cpu", 1000.0);
        assert!(advance_and_commit(&store, "n1", "cpu", 1000.0).is_none());
        assert!(advance_and_commit(&store, "n1", "cpu", 990.0).is_none());

        let next = advance_and_commit(&store, "n1", "cpu", 1030.0).unwrap();
        assert_eq!(next.start, 970.0);
    }

    #[test]
    fn test_pairs_are_independent() {
        let store = MemoryStore::new();
        advance_and_commit(&store, "n1", "cpu", 1000.0);
        assert!(advance_and_commit(&store, "n2", "cpu", 1000.0).is_some());
        assert!(advance_and_commit(&store, "n1", "memory", 1000.0).is_some());
    }

    #[test]
    fn test_corrupt_window_is_replaced() {
        let store = MemoryStore::new();
        store
            .put(&window_key("n1", "cpu"), "not json".to_string())
            .unwrap();
        assert!(advance_and_commit(&store, "n1", "cpu", 1000.0).is_some());
        assert!(advance_and_commit(&store, "n1", "cpu", 1000.0).is_none());
    }
}
