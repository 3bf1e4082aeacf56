// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{load_related, Materializer, SearchDocument};
use crate::entity::{names_with_aliases, Studio};
use crate::search::{IndexSchema, STUDIO_SCHEMA};
use crate::storage::{Catalog, RelationKind, StorageError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub added_on: i64,
    pub name: String,
    pub aliases: Vec<String>,
    pub labels: Vec<String>,
    pub label_names: Vec<String>,
    pub rating: u8,
    pub bookmark: Option<i64>,
    pub favorite: bool,
    pub parent: Option<String>,
    pub parent_name: Option<String>,
}

impl SearchDocument for StudioDocument {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct StudioMaterializer {
    catalog: Catalog,
}

impl StudioMaterializer {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Materializer for StudioMaterializer {
    type Entity = Studio;
    type Document = StudioDocument;

    fn schema(&self) -> &'static IndexSchema {
        &STUDIO_SCHEMA
    }

    async fn materialize(&self, studio: &Studio) -> Result<StudioDocument, StorageError> {
        let catalog = &self.catalog;
        let labels = load_related(catalog.relations.as_ref(), catalog.labels.as_ref(), &studio.id, RelationKind::Label).await?;
        let parent = match studio.parent.as_deref() {
            Some(parent_id) => catalog.studios.get(parent_id).await?,
            None => None,
        };

        Ok(StudioDocument {
            id: studio.id.clone(),
            added_on: studio.added_on,
            name: studio.name.clone(),
            aliases: studio.aliases.clone(),
            labels: labels.iter().map(|l| l.id.clone()).collect(),
            label_names: names_with_aliases(labels.iter().map(|l| (l.name.as_str(), l.aliases.as_slice()))),
            rating: studio.rating,
            bookmark: studio.bookmark,
            favorite: studio.favorite,
            parent: parent.as_ref().map(|p| p.id.clone()),
            parent_name: parent.map(|p| p.name),
        })
    }
}
