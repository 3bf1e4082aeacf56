// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Document materialization.
//!
//! A [`Materializer`] turns one source entity into its denormalized search
//! document by reading related records from the [`Catalog`](crate::storage::Catalog).
//! Documents are always regenerated whole; nothing is patched in place.
//!
//! ```text
//! Scene ──┬─ relations(label) ─→ labels.get_bulk ─→ labels, labelNames
//!         ├─ relations(actor) ─→ actors.get_bulk ─→ actors, actorNames
//!         ├─ studios.get ─────────────────────────→ studio, studioName
//!         ├─ views.view_count ────────────────────→ numViews
//!         └─ RelevanceScorer ─────────────────────→ score
//! ```

mod marker;
mod scene;
mod studio;

pub use marker::{MarkerDocument, MarkerMaterializer};
pub use scene::{SceneDocument, SceneMaterializer};
pub use studio::{StudioDocument, StudioMaterializer};

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::entity::{Entity, Scene};
use crate::search::{IndexSchema, IndexedDocument};
use crate::storage::{EntityStore, RelationKind, RelationStore, StorageError};

/// A materialized document ready to be sent to the index engine.
pub trait SearchDocument: Serialize + Send + Sync {
    fn id(&self) -> &str;

    /// Wire form. Object keys come out sorted (`serde_json::Map` is ordered by key).
    fn to_indexed(&self) -> Result<IndexedDocument, StorageError> {
        let body = serde_json::to_value(self)
            .map_err(|e| StorageError::Backend(format!("Failed to serialize document {}: {}", self.id(), e)))?;
        Ok(IndexedDocument { id: self.id().to_string(), body })
    }
}

/// Per-kind entity → document projection.
#[async_trait]
pub trait Materializer: Send + Sync + 'static {
    type Entity: Entity;
    type Document: SearchDocument;

    /// Schema of the index the documents go into
    fn schema(&self) -> &'static IndexSchema;

    /// Build the document for `entity`.
    ///
    /// Dangling references are left out of the document. A store failure
    /// (not a miss) is returned as an error.
    async fn materialize(&self, entity: &Self::Entity) -> Result<Self::Document, StorageError>;
}

/// Relevance score attached to scene documents.
pub trait RelevanceScorer: Send + Sync {
    fn score(&self, scene: &Scene, num_views: u64) -> f64;
}

/// `num_views + rating`, plus 5 for favorites
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultScorer;

impl RelevanceScorer for DefaultScorer {
    fn score(&self, scene: &Scene, num_views: u64) -> f64 {
        let favorite = if scene.favorite { 5.0 } else { 0.0 };
        num_views as f64 + f64::from(scene.rating) + favorite
    }
}

/// Drop `None` holes from a bulk fetch, keeping order
pub(crate) fn present<T>(fetched: Vec<Option<T>>) -> Vec<T> {
    fetched.into_iter().flatten().collect()
}

/// Entities related to `item_id`, in relation order, dangling IDs dropped.
///
/// Always reads the join records fresh; at most one `get_bulk`.
pub(crate) async fn load_related<T: Entity>(
    relations: &dyn RelationStore,
    store: &dyn EntityStore<T>,
    item_id: &str,
    kind: RelationKind,
) -> Result<Vec<T>, StorageError> {
    let ids = relations.related_ids(item_id, kind).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let fetched = store.get_bulk(&ids).await?;
    let found = present(fetched);
    if found.len() < ids.len() {
        debug!(item = %item_id, %kind, missing = ids.len() - found.len(), "Skipping dangling relations");
    }
    Ok(found)
}
