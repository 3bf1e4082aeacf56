// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Background document refresh.
//!
//! Derived document fields (view counts, relevance score, related names)
//! change without the entity itself changing. Writers call
//! [`ReindexHandle::schedule`] with the affected IDs; a single worker task
//! coalesces queued IDs and refreshes them with `update` calls, retrying
//! transient engine failures. The search path never writes.
//!
//! ```text
//! schedule(id) ─→ mpsc ─→ worker: drain ≤ batch_size IDs (deduped)
//!                                   └─→ retry(update_ids)
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::SearchService;
use crate::materialize::Materializer;
use crate::metrics;
use crate::resilience::{retry, RetryConfig};

/// Cheap, cloneable sender side of a [`ReindexJob`].
///
/// The job stops once every handle is dropped and the queue is drained.
#[derive(Clone)]
pub struct ReindexHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl ReindexHandle {
    /// Queue `id` for a refresh. Returns `false` if the job has stopped.
    pub fn schedule(&self, id: impl Into<String>) -> bool {
        self.tx.send(id.into()).is_ok()
    }

    /// Queue several IDs. Returns `false` if the job has stopped.
    pub fn schedule_all<I, S>(&self, ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter().all(|id| self.schedule(id))
    }
}

pub struct ReindexJob<M: Materializer> {
    service: Arc<SearchService<M>>,
    rx: mpsc::UnboundedReceiver<String>,
    retry: RetryConfig,
    batch_size: usize,
}

impl<M: Materializer> ReindexJob<M> {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(service: Arc<SearchService<M>>, retry: RetryConfig) -> (ReindexHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let batch_size = service.config().reindex_batch_size.max(1);
        let job = Self { service, rx, retry, batch_size };
        (ReindexHandle { tx }, tokio::spawn(job.run()))
    }

    async fn run(mut self) {
        let kind = self.service.kind();
        info!(%kind, batch_size = self.batch_size, "Reindex job started");

        while let Some(first) = self.rx.recv().await {
            let ids = self.coalesce(first);
            self.refresh(ids).await;
        }

        info!(%kind, "Reindex job stopped");
    }

    /// `first` plus whatever is already queued, up to `batch_size` distinct IDs
    fn coalesce(&mut self, first: String) -> Vec<String> {
        let mut ids = vec![first];
        while ids.len() < self.batch_size {
            match self.rx.try_recv() {
                Ok(id) => {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                Err(_) => break,
            }
        }
        ids
    }

    async fn refresh(&self, ids: Vec<String>) {
        let kind = self.service.kind();
        let (service, batch) = (&self.service, ids.as_slice());

        match retry("reindex", &self.retry, move || async move { service.update_ids(batch).await }).await {
            Ok(count) => {
                metrics::record_reindex(kind, count, true);
                debug!(%kind, count, "Documents refreshed");
            }
            Err(e) => {
                metrics::record_reindex(kind, 0, false);
                error!(%kind, ids = ids.len(), error = %e, "Dropping reindex batch after retries");
            }
        }
    }
}
