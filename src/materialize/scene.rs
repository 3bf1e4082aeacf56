// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{load_related, DefaultScorer, Materializer, RelevanceScorer, SearchDocument};
use crate::entity::{names_with_aliases, Scene};
use crate::search::{IndexSchema, SCENE_SCHEMA};
use crate::storage::{Catalog, RelationKind, StorageError};

/// Denormalized scene as stored in the `scenes` index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub added_on: i64,
    pub name: String,
    pub actors: Vec<String>,
    pub labels: Vec<String>,
    pub actor_names: Vec<String>,
    pub label_names: Vec<String>,
    pub rating: u8,
    pub bookmark: Option<i64>,
    pub favorite: bool,
    pub num_views: u64,
    pub release_date: Option<i64>,
    pub duration: Option<f64>,
    pub studio: Option<String>,
    pub studio_name: Option<String>,
    /// Video height in pixels, 0 when unknown
    pub resolution: u32,
    pub size: Option<u64>,
    pub score: f64,
}

impl SearchDocument for SceneDocument {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct SceneMaterializer {
    catalog: Catalog,
    scorer: Arc<dyn RelevanceScorer>,
}

impl SceneMaterializer {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self::with_scorer(catalog, Arc::new(DefaultScorer))
    }

    #[must_use]
    pub fn with_scorer(catalog: Catalog, scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { catalog, scorer }
    }
}

#[async_trait]
impl Materializer for SceneMaterializer {
    type Entity = Scene;
    type Document = SceneDocument;

    fn schema(&self) -> &'static IndexSchema {
        &SCENE_SCHEMA
    }

    async fn materialize(&self, scene: &Scene) -> Result<SceneDocument, StorageError> {
        let catalog = &self.catalog;
        let labels = load_related(catalog.relations.as_ref(), catalog.labels.as_ref(), &scene.id, RelationKind::Label).await?;
        let actors = load_related(catalog.relations.as_ref(), catalog.actors.as_ref(), &scene.id, RelationKind::Actor).await?;
        let num_views = catalog.views.view_count(&scene.id).await?;

        let studio = match scene.studio.as_deref() {
            Some(studio_id) => {
                let found = catalog.studios.get(studio_id).await?;
                if found.is_none() {
                    debug!(scene = %scene.id, studio = %studio_id, "Scene references a missing studio");
                }
                found
            }
            None => None,
        };

        Ok(SceneDocument {
            id: scene.id.clone(),
            added_on: scene.added_on,
            name: scene.name.clone(),
            actors: actors.iter().map(|a| a.id.clone()).collect(),
            labels: labels.iter().map(|l| l.id.clone()).collect(),
            actor_names: names_with_aliases(actors.iter().map(|a| (a.name.as_str(), a.aliases.as_slice()))),
            label_names: names_with_aliases(labels.iter().map(|l| (l.name.as_str(), l.aliases.as_slice()))),
            rating: scene.rating,
            bookmark: scene.bookmark,
            favorite: scene.favorite,
            num_views,
            release_date: scene.release_date,
            duration: scene.meta.duration,
            studio: studio.as_ref().map(|s| s.id.clone()),
            studio_name: studio.map(|s| s.name),
            resolution: scene.meta.dimensions.map_or(0, |d| d.height),
            size: scene.meta.size,
            score: self.scorer.score(scene, num_views),
        })
    }
}
