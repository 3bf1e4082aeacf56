// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use thiserror::Error;

use crate::entity::Entity;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Storage connection error: {0}")]
    Connection(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Source-of-truth store for one entity type.
///
/// `get_bulk` must preserve the order of `ids` and report misses as `None`
/// holes rather than shortening the result.
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<T>, StorageError>;
    async fn get_bulk(&self, ids: &[String]) -> Result<Vec<Option<T>>, StorageError>;
    async fn get_all(&self) -> Result<Vec<T>, StorageError>;
    async fn upsert(&self, item: T) -> Result<(), StorageError>;
    async fn remove(&self, id: &str) -> Result<(), StorageError>;
}

/// Kind of many-to-many join record attached to an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// label ↔ item
    Label,
    /// actor ↔ item
    Actor,
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Label => write!(f, "label"),
            Self::Actor => write!(f, "actor"),
        }
    }
}

/// Join records between items and their labels/actors.
#[async_trait]
pub trait RelationStore: Send + Sync {
    /// Current related IDs for `item_id`, in attachment order.
    async fn related_ids(&self, item_id: &str, kind: RelationKind) -> Result<Vec<String>, StorageError>;

    /// Replace the related set of `item_id`. Duplicate IDs are dropped.
    async fn set_related(&self, item_id: &str, kind: RelationKind, ids: &[String]) -> Result<(), StorageError>;
}

/// Pre-aggregated watch counts per scene.
#[async_trait]
pub trait ViewCounter: Send + Sync {
    async fn view_count(&self, scene_id: &str) -> Result<u64, StorageError>;
}
