// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

use super::traits::{EntityStore, RelationKind, RelationStore, StorageError, ViewCounter};
use crate::entity::Entity;

/// DashMap-backed entity store. `get_all` returns items in first-insert order.
pub struct InMemoryStore<T: Entity> {
    data: DashMap<String, T>,
    order: RwLock<Vec<String>>,
    bulk_calls: AtomicUsize,
    fail_reads: AtomicBool,
}

impl<T: Entity> InMemoryStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
            order: RwLock::new(Vec::new()),
            bulk_calls: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Build a store pre-populated with `items`
    pub fn with_items(items: impl IntoIterator<Item = T>) -> Self {
        let store = Self::new();
        for item in items {
            store.insert(item);
        }
        store
    }

    /// Synchronous insert for fixtures
    pub fn insert(&self, item: T) {
        let id = item.id().to_string();
        if self.data.insert(id.clone(), item).is_none() {
            self.order.write().push(id);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of `get_bulk` calls served so far
    #[must_use]
    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::Relaxed)
    }

    /// Make every read fail with a backend error (fault injection)
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    fn check_reads(&self) -> Result<(), StorageError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            Err(StorageError::Backend("injected read failure".into()))
        } else {
            Ok(())
        }
    }
}

impl<T: Entity> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for InMemoryStore<T> {
    async fn get(&self, id: &str) -> Result<Option<T>, StorageError> {
        self.check_reads()?;
        Ok(self.data.get(id).map(|r| r.value().clone()))
    }

    async fn get_bulk(&self, ids: &[String]) -> Result<Vec<Option<T>>, StorageError> {
        self.bulk_calls.fetch_add(1, Ordering::Relaxed);
        self.check_reads()?;
        Ok(ids
            .iter()
            .map(|id| self.data.get(id).map(|r| r.value().clone()))
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<T>, StorageError> {
        self.check_reads()?;
        let order = self.order.read();
        Ok(order
            .iter()
            .filter_map(|id| self.data.get(id).map(|r| r.value().clone()))
            .collect())
    }

    async fn upsert(&self, item: T) -> Result<(), StorageError> {
        self.insert(item);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StorageError> {
        if self.data.remove(id).is_some() {
            self.order.write().retain(|existing| existing != id);
        }
        Ok(())
    }
}

/// Join records kept per (item, kind)
#[derive(Default)]
pub struct InMemoryRelations {
    links: DashMap<(String, RelationKind), Vec<String>>,
}

impl InMemoryRelations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous attach for fixtures
    pub fn attach(&self, item_id: &str, kind: RelationKind, ids: &[&str]) {
        let mut entry = self.links.entry((item_id.to_string(), kind)).or_default();
        for id in ids {
            if !entry.iter().any(|existing| existing == id) {
                entry.push((*id).to_string());
            }
        }
    }
}

#[async_trait]
impl RelationStore for InMemoryRelations {
    async fn related_ids(&self, item_id: &str, kind: RelationKind) -> Result<Vec<String>, StorageError> {
        Ok(self
            .links
            .get(&(item_id.to_string(), kind))
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }

    async fn set_related(&self, item_id: &str, kind: RelationKind, ids: &[String]) -> Result<(), StorageError> {
        let mut deduped: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            if !deduped.contains(id) {
                deduped.push(id.clone());
            }
        }
        let key = (item_id.to_string(), kind);
        if deduped.is_empty() {
            self.links.remove(&key);
        } else {
            self.links.insert(key, deduped);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryViews {
    counts: DashMap<String, u64>,
}

impl InMemoryViews {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_view(&self, scene_id: &str) {
        *self.counts.entry(scene_id.to_string()).or_insert(0) += 1;
    }

    pub fn set_count(&self, scene_id: &str, count: u64) {
        self.counts.insert(scene_id.to_string(), count);
    }
}

#[async_trait]
impl ViewCounter for InMemoryViews {
    async fn view_count(&self, scene_id: &str) -> Result<u64, StorageError> {
        Ok(self.counts.get(scene_id).map(|r| *r.value()).unwrap_or(0))
    }
}
