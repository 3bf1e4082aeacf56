// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{load_related, Materializer, SearchDocument};
use crate::entity::{names_with_aliases, Marker};
use crate::search::{IndexSchema, MARKER_SCHEMA};
use crate::storage::{Catalog, RelationKind, StorageError};

/// Denormalized marker as stored in the `markers` index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub added_on: i64,
    pub name: String,
    pub labels: Vec<String>,
    pub label_names: Vec<String>,
    pub rating: u8,
    pub bookmark: Option<i64>,
    pub favorite: bool,
    /// `None` when the owning scene no longer exists
    pub scene: Option<String>,
    pub scene_name: Option<String>,
}

impl SearchDocument for MarkerDocument {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct MarkerMaterializer {
    catalog: Catalog,
}

impl MarkerMaterializer {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Materializer for MarkerMaterializer {
    type Entity = Marker;
    type Document = MarkerDocument;

    fn schema(&self) -> &'static IndexSchema {
        &MARKER_SCHEMA
    }

    async fn materialize(&self, marker: &Marker) -> Result<MarkerDocument, StorageError> {
        let catalog = &self.catalog;
        let labels = load_related(catalog.relations.as_ref(), catalog.labels.as_ref(), &marker.id, RelationKind::Label).await?;
        let scene = catalog.scenes.get(&marker.scene).await?;
        if scene.is_none() {
            debug!(marker = %marker.id, scene = %marker.scene, "Marker references a missing scene");
        }

        Ok(MarkerDocument {
            id: marker.id.clone(),
            added_on: marker.added_on,
            name: marker.name.clone(),
            labels: labels.iter().map(|l| l.id.clone()).collect(),
            label_names: names_with_aliases(labels.iter().map(|l| (l.name.as_str(), l.aliases.as_slice()))),
            rating: marker.rating,
            bookmark: marker.bookmark,
            favorite: marker.favorite,
            scene: scene.as_ref().map(|s| s.id.clone()),
            scene_name: scene.map(|s| s.name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Label, Scene};
    use crate::storage::InMemoryCatalog;

    fn fixture() -> (InMemoryCatalog, Marker) {
        let stores = InMemoryCatalog::new();
        stores.scenes.insert(Scene::new("sc_1", "Beach Day"));
        stores.labels.insert(Label::new("la_1", "Sunset", vec!["dusk".into()]));
        stores.relations.attach("mk_1", RelationKind::Label, &["la_1"]);

        let mut marker = Marker::new("mk_1", "Wave", "sc_1");
        marker.favorite = true;
        marker.bookmark = Some(5);
        (stores, marker)
    }

    #[tokio::test]
    async fn test_document_fields() {
        let (stores, marker) = fixture();
        let doc = MarkerMaterializer::new(stores.catalog()).materialize(&marker).await.unwrap();
        assert_eq!(doc.labels, vec!["la_1"]);
        assert_eq!(doc.label_names, vec!["Sunset", "dusk"]);
        assert_eq!(doc.scene.as_deref(), Some("sc_1"));
        assert_eq!(doc.scene_name.as_deref(), Some("Beach Day"));
        assert!(doc.favorite);
        assert_eq!(doc.bookmark, Some(5));
    }

    #[tokio::test]
    async fn test_wire_keys_match_schema() {
        let (stores, marker) = fixture();
        let doc = MarkerMaterializer::new(stores.catalog()).materialize(&marker).await.unwrap();
        let body = doc.to_indexed().unwrap().body;
        let mut keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
        let mut expected = MARKER_SCHEMA.document_fields.to_vec();
        keys.sort_unstable();
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }

    #[tokio::test]
    async fn test_missing_scene() {
        let (stores, mut marker) = fixture();
        marker.scene = "sc_gone".into();
        let doc = MarkerMaterializer::new(stores.catalog()).materialize(&marker).await.unwrap();
        assert_eq!(doc.scene, None);
        assert_eq!(doc.scene_name, None);
    }

    #[tokio::test]
    async fn test_materialization_is_pure() {
        let (stores, marker) = fixture();
        let materializer = MarkerMaterializer::new(stores.catalog());
        let a = serde_json::to_vec(&materializer.materialize(&marker).await.unwrap()).unwrap();
        let b = serde_json::to_vec(&materializer.materialize(&marker).await.unwrap()).unwrap();
        assert_eq!(a, b);
    }
}
