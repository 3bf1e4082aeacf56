// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for catalog-search.
//!
//! Uses the `metrics` crate facade; the host application installs the
//! exporter (Prometheus, OTEL, etc.).
//!
//! # Metric Naming Convention
//! - `catalog_search_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `kind`: scene, marker, studio
//! - `operation`: search, index, update, materialize
//! - `status`: success, error, degraded

use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};

use crate::search::DocumentKind;

/// Record a search request outcome
pub fn record_search_query(kind: DocumentKind, status: &'static str) {
    counter!(
        "catalog_search_queries_total",
        "kind" => kind.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record operation latency
pub fn record_latency(kind: DocumentKind, operation: &'static str, duration: Duration) {
    histogram!(
        "catalog_search_operation_seconds",
        "kind" => kind.to_string(),
        "operation" => operation
    )
    .record(duration.as_secs_f64());
}

/// Record number of entities returned for one page
pub fn record_search_results(kind: DocumentKind, count: usize) {
    histogram!("catalog_search_results", "kind" => kind.to_string()).record(count as f64);
}

/// Hits the engine returned that no longer exist in the entity store
pub fn record_hydration_misses(kind: DocumentKind, count: usize) {
    if count > 0 {
        counter!("catalog_search_hydration_misses_total", "kind" => kind.to_string()).increment(count as u64);
    }
}

/// Record a write to the index engine (bulk slice or update)
pub fn record_flush(kind: DocumentKind, operation: &'static str, count: usize, success: bool) {
    let status = if success { "success" } else { "error" };
    counter!(
        "catalog_search_flushes_total",
        "kind" => kind.to_string(),
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    if success {
        histogram!("catalog_search_flush_size", "kind" => kind.to_string(), "operation" => operation)
            .record(count as f64);
    }
}

/// Total documents currently known to be indexed by the last full build
pub fn set_indexed_documents(kind: DocumentKind, count: usize) {
    gauge!("catalog_search_indexed_documents", "kind" => kind.to_string()).set(count as f64);
}

/// Record a lifecycle transition
pub fn set_index_state(kind: DocumentKind, state: &str) {
    counter!(
        "catalog_search_state_transitions_total",
        "kind" => kind.to_string(),
        "state" => state.to_string()
    )
    .increment(1);
}

/// Record a background reindex batch outcome
pub fn record_reindex(kind: DocumentKind, count: usize, success: bool) {
    let status = if success { "success" } else { "error" };
    counter!("catalog_search_reindex_batches_total", "kind" => kind.to_string(), "status" => status).increment(1);
    if success {
        counter!("catalog_search_reindexed_documents_total", "kind" => kind.to_string()).increment(count as u64);
    }
}

/// A timing guard that records latency on drop
pub struct LatencyTimer {
    kind: DocumentKind,
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    #[must_use]
    pub fn new(kind: DocumentKind, operation: &'static str) -> Self {
        Self { kind, operation, start: Instant::now() }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.kind, self.operation, self.start.elapsed());
    }
}
