//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use catalog_search::entity::{Actor, Label, Marker, Scene, Studio};
use catalog_search::materialize::{MarkerMaterializer, SceneMaterializer, StudioMaterializer};
use catalog_search::search::InMemoryIndexClient;
use catalog_search::storage::{InMemoryCatalog, RelationKind};
use catalog_search::{RetryConfig, SearchConfig, SearchService};

/// A catalog plus an index client, wired into services on demand
pub struct Fixture {
    pub stores: InMemoryCatalog,
    pub client: Arc<InMemoryIndexClient>,
    pub config: SearchConfig,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        init_tracing();
        Self { stores: InMemoryCatalog::new(), client: Arc::new(InMemoryIndexClient::new()), config }
    }

    pub fn scene_service(&self) -> SearchService<SceneMaterializer> {
        SearchService::new(
            SceneMaterializer::new(self.stores.catalog()),
            self.client.clone(),
            self.stores.scenes.clone(),
            self.config.clone(),
        )
        .expect("scene schema is valid")
        .with_labels(self.stores.labels.clone())
        .with_create_retry(RetryConfig::immediate(1))
    }

    pub fn marker_service(&self) -> SearchService<MarkerMaterializer> {
        SearchService::new(
            MarkerMaterializer::new(self.stores.catalog()),
            self.client.clone(),
            self.stores.markers.clone(),
            self.config.clone(),
        )
        .expect("marker schema is valid")
        .with_labels(self.stores.labels.clone())
        .with_create_retry(RetryConfig::immediate(1))
    }

    pub fn studio_service(&self) -> SearchService<StudioMaterializer> {
        SearchService::new(
            StudioMaterializer::new(self.stores.catalog()),
            self.client.clone(),
            self.stores.studios.clone(),
            self.config.clone(),
        )
        .expect("studio schema is valid")
        .with_labels(self.stores.labels.clone())
        .with_create_retry(RetryConfig::immediate(1))
    }

    pub fn label(&self, id: &str, name: &str, aliases: &[&str]) {
        let aliases = aliases.iter().map(|a| a.to_string()).collect();
        self.stores.labels.insert(Label::new(id, name, aliases));
    }

    pub fn actor(&self, id: &str, name: &str) {
        self.stores.actors.insert(Actor::new(id, name, Vec::new()));
    }

    pub fn studio(&self, id: &str, name: &str) {
        self.stores.studios.insert(Studio::new(id, name));
    }

    pub fn scene(&self, scene: Scene) {
        self.stores.scenes.insert(scene);
    }

    pub fn marker(&self, marker: Marker) {
        self.stores.markers.insert(marker);
    }

    pub fn attach(&self, item: &str, kind: RelationKind, ids: &[&str]) {
        self.stores.relations.attach(item, kind, ids);
    }

    /// `n` plain scenes named "Scene {i}" with ids `sc_{i}`
    pub fn bulk_scenes(&self, n: usize) {
        for i in 0..n {
            self.scene(Scene::new(format!("sc_{i}"), format!("Scene {i}")));
        }
    }
}

pub fn scene(id: &str, name: &str, rating: u8, favorite: bool) -> Scene {
    let mut scene = Scene::new(id, name);
    scene.rating = rating;
    scene.favorite = favorite;
    scene
}

/// Compact log output for failing tests, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .with_test_writer()
        .try_init();
}
