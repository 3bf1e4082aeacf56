// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Entity → index writes.
//!
//! ```text
//! index_all(entities)
//!     for each entity (input order)
//!         materialize ─→ SliceBatcher ─(full slice)─→ handle.index()
//!     trailing partial slice ──────────────────────→ handle.index()
//!
//! update_some(entities)
//!     materialize all ─→ one handle.update()
//! ```
//!
//! Slices are flushed one at a time; a failed slice stops ingestion and is
//! reported with the input positions it covered.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use super::types::SyncError;
use crate::batching::{FlushBatch, SliceBatcher};
use crate::entity::Entity;
use crate::materialize::{Materializer, SearchDocument};
use crate::metrics;
use crate::search::{IndexHandle, IndexedDocument};

/// Writes materialized documents of one kind into one index.
pub struct Synchronizer<M: Materializer> {
    materializer: Arc<M>,
    handle: Arc<dyn IndexHandle>,
    slice_size: usize,
}

impl<M: Materializer> Synchronizer<M> {
    pub fn new(materializer: Arc<M>, handle: Arc<dyn IndexHandle>, slice_size: usize) -> Self {
        Self { materializer, handle, slice_size }
    }

    /// Bulk-index `entities`, returning how many documents were indexed.
    pub async fn index_all(&self, entities: &[M::Entity]) -> Result<usize, SyncError> {
        let kind = self.materializer.schema().kind;
        let start = Instant::now();
        let mut batcher = SliceBatcher::new(self.slice_size);
        let mut indexed = 0;

        for entity in entities {
            let doc = self.materialize(entity).await?;
            if let Some(reason) = batcher.push(doc) {
                if let Some(batch) = batcher.take_batch(reason) {
                    indexed += self.flush(batch).await?;
                }
            }
        }
        if let Some(batch) = batcher.finish() {
            indexed += self.flush(batch).await?;
        }

        info!(%kind, indexed, elapsed_ms = start.elapsed().as_millis() as u64, "Bulk indexing done");
        Ok(indexed)
    }

    /// Regenerate and replace the documents of `entities` in one call.
    pub async fn update_some(&self, entities: &[M::Entity]) -> Result<(), SyncError> {
        let kind = self.materializer.schema().kind;
        if entities.is_empty() {
            return Ok(());
        }

        let mut docs = Vec::with_capacity(entities.len());
        for entity in entities {
            docs.push(self.materialize(entity).await?);
        }

        let count = docs.len();
        let _timer = metrics::LatencyTimer::new(kind, "update");
        match self.handle.update(docs).await {
            Ok(()) => {
                metrics::record_flush(kind, "update", count, true);
                debug!(%kind, count, "Documents updated");
                Ok(())
            }
            Err(source) => {
                metrics::record_flush(kind, "update", count, false);
                error!(%kind, count, error = %source, "Document update failed");
                Err(SyncError::Update { kind, count, source })
            }
        }
    }

    async fn materialize(&self, entity: &M::Entity) -> Result<IndexedDocument, SyncError> {
        let kind = self.materializer.schema().kind;
        let wrap = |source| SyncError::Materialize { kind, id: entity.id().to_string(), source };
        let doc = self.materializer.materialize(entity).await.map_err(wrap)?;
        doc.to_indexed().map_err(wrap)
    }

    async fn flush(&self, batch: FlushBatch<IndexedDocument>) -> Result<usize, SyncError> {
        let kind = self.materializer.schema().kind;
        let count = batch.items.len();
        let range = batch.range;
        let _timer = metrics::LatencyTimer::new(kind, "index");

        match self.handle.index(batch.items).await {
            Ok(()) => {
                metrics::record_flush(kind, "index", count, true);
                info!(%kind, count, start = range.start, reason = %batch.reason, "Indexed slice");
                Ok(count)
            }
            Err(source) => {
                metrics::record_flush(kind, "index", count, false);
                error!(%kind, start = range.start, end = range.end, error = %source, "Slice indexing failed");
                Err(SyncError::Flush { kind, range, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Scene;
    use crate::materialize::SceneMaterializer;
    use crate::search::{IndexClient, InMemoryIndex, InMemoryIndexClient, SCENE_SCHEMA};
    use crate::storage::InMemoryCatalog;

    async fn setup(slice_size: usize) -> (Synchronizer<SceneMaterializer>, Arc<InMemoryIndex>) {
        let stores = InMemoryCatalog::new();
        let client = InMemoryIndexClient::new();
        let handle = client.create_index("scenes", &SCENE_SCHEMA.field_list()).await.unwrap();
        let index = client.get("scenes").unwrap();
        let materializer = Arc::new(SceneMaterializer::new(stores.catalog()));
        (Synchronizer::new(materializer, handle, slice_size), index)
    }

    fn scenes(n: usize) -> Vec<Scene> {
        (0..n).map(|i| Scene::new(format!("sc_{i}"), format!("Scene {i}"))).collect()
    }

    #[tokio::test]
    async fn test_slices_and_trailing_flush() {
        let (sync, index) = setup(3).await;
        assert_eq!(sync.index_all(&scenes(7)).await.unwrap(), 7);
        assert_eq!(index.index_calls(), vec![3, 3, 1]);
        assert_eq!(index.len(), 7);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let (sync, index) = setup(3).await;
        assert_eq!(sync.index_all(&[]).await.unwrap(), 0);
        assert!(index.index_calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_slice_reports_range() {
        let (sync, index) = setup(3).await;
        index.fail_index_on_call(2);

        match sync.index_all(&scenes(7)).await {
            Err(SyncError::Flush { range, .. }) => assert_eq!(range, 3..6),
            other => panic!("Expected flush error, got {other:?}"),
        }
        // First slice stays indexed, nothing after the failure is attempted
        assert_eq!(index.len(), 3);
        assert_eq!(index.index_calls(), vec![3, 3]);
    }

    #[tokio::test]
    async fn test_update_is_one_call() {
        let (sync, index) = setup(3).await;
        sync.update_some(&scenes(5)).await.unwrap();
        assert_eq!(index.update_calls(), vec![5]);

        sync.update_some(&[]).await.unwrap();
        assert_eq!(index.update_calls(), vec![5]);
    }

    #[tokio::test]
    async fn test_update_failure() {
        let (sync, index) = setup(3).await;
        index.set_fail_updates(true);
        let err = sync.update_some(&scenes(2)).await.unwrap_err();
        assert!(matches!(err, SyncError::Update { count: 2, .. }));
    }
}
