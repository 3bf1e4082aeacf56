// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Bundle of read dependencies shared by the materializers.

use std::sync::Arc;

use super::memory::{InMemoryRelations, InMemoryStore, InMemoryViews};
use super::traits::{EntityStore, RelationStore, ViewCounter};
use crate::entity::{Actor, Label, Marker, Scene, Studio};

/// Handles to every store the search layer reads from.
#[derive(Clone)]
pub struct Catalog {
    pub scenes: Arc<dyn EntityStore<Scene>>,
    pub markers: Arc<dyn EntityStore<Marker>>,
    pub actors: Arc<dyn EntityStore<Actor>>,
    pub studios: Arc<dyn EntityStore<Studio>>,
    pub labels: Arc<dyn EntityStore<Label>>,
    pub relations: Arc<dyn RelationStore>,
    pub views: Arc<dyn ViewCounter>,
}

/// Concrete in-memory stores, keeping typed access for fixtures.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    pub scenes: Arc<InMemoryStore<Scene>>,
    pub markers: Arc<InMemoryStore<Marker>>,
    pub actors: Arc<InMemoryStore<Actor>>,
    pub studios: Arc<InMemoryStore<Studio>>,
    pub labels: Arc<InMemoryStore<Label>>,
    pub relations: Arc<InMemoryRelations>,
    pub views: Arc<InMemoryViews>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Erase to the trait-object view consumed by materializers
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        Catalog {
            scenes: self.scenes.clone(),
            markers: self.markers.clone(),
            actors: self.actors.clone(),
            studios: self.studios.clone(),
            labels: self.labels.clone(),
            relations: self.relations.clone(),
            views: self.views.clone(),
        }
    }
}
