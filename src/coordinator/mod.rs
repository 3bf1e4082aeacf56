// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search service coordinator.
//!
//! A [`SearchService`] owns one index (scenes, markers or studios): it builds
//! the index from the entity store, keeps documents fresh through
//! [`SearchService::update_some`], and answers free-form queries.
//!
//! # Lifecycle
//!
//! ```text
//! Created → Building → Ready
//!              ↓
//!            Failed → (build again)
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use catalog_search::{SearchConfig, SearchService, IndexState};
//! use catalog_search::entity::Scene;
//! use catalog_search::materialize::SceneMaterializer;
//! use catalog_search::search::InMemoryIndexClient;
//! use catalog_search::storage::InMemoryCatalog;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let stores = InMemoryCatalog::new();
//! stores.scenes.insert(Scene::new("sc_1", "Beach"));
//!
//! let service = SearchService::new(
//!     SceneMaterializer::new(stores.catalog()),
//!     Arc::new(InMemoryIndexClient::new()),
//!     stores.scenes.clone(),
//!     SearchConfig::default(),
//! )
//! .unwrap()
//! .with_labels(stores.labels.clone());
//!
//! assert_eq!(service.state(), IndexState::Created);
//! assert_eq!(service.build().await.unwrap(), 1);
//! assert_eq!(service.state(), IndexState::Ready);
//!
//! let page = service.search("beach", None).await.unwrap();
//! assert_eq!(page.items[0].name, "Beach");
//! # }
//! ```

mod reindex;
mod search_api;
mod synchronizer;
mod types;

pub use reindex::{ReindexHandle, ReindexJob};
pub use search_api::QueryError;
pub use synchronizer::Synchronizer;
pub use types::{IndexState, SearchError, SearchPage, SyncError};

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::SearchConfig;
use crate::entity::Label;
use crate::materialize::Materializer;
use crate::metrics;
use crate::resilience::{retry, RetryConfig};
use crate::search::{DocumentKind, FilterFamily, IndexClient, IndexHandle, IndexSchema, LabelResolver};
use crate::storage::EntityStore;

/// Search over one kind of entity.
///
/// `Send + Sync`; share it behind an `Arc`. Searches and updates may run
/// concurrently with each other and with a rebuild, which only swaps the
/// index handle once it completes.
pub struct SearchService<M: Materializer> {
    pub(super) config: SearchConfig,

    /// Lifecycle state (broadcast to watchers)
    pub(super) state: watch::Sender<IndexState>,
    pub(super) state_rx: watch::Receiver<IndexState>,

    /// Set once a build completes
    pub(super) handle: RwLock<Option<Arc<dyn IndexHandle>>>,

    pub(super) client: Arc<dyn IndexClient>,
    pub(super) materializer: Arc<M>,
    pub(super) store: Arc<dyn EntityStore<M::Entity>>,
    pub(super) labels: Option<LabelResolver>,

    /// Backoff for index creation
    pub(super) create_retry: RetryConfig,
}

impl<M: Materializer> SearchService<M> {
    /// Create a service in the `Created` state.
    ///
    /// Fails if the materializer's schema is inconsistent.
    pub fn new(
        materializer: M,
        client: Arc<dyn IndexClient>,
        store: Arc<dyn EntityStore<M::Entity>>,
        config: SearchConfig,
    ) -> Result<Self, SyncError> {
        let schema = materializer.schema();
        schema
            .validate()
            .map_err(|source| SyncError::Schema { kind: schema.kind, source })?;

        let (state_tx, state_rx) = watch::channel(IndexState::Created);
        Ok(Self {
            config,
            state: state_tx,
            state_rx,
            handle: RwLock::new(None),
            client,
            materializer: Arc::new(materializer),
            store,
            labels: None,
            create_retry: RetryConfig::build(),
        })
    }

    /// Resolve label names in queries against `labels`.
    ///
    /// Ignored for kinds that do not filter on labels.
    #[must_use]
    pub fn with_labels(mut self, labels: Arc<dyn EntityStore<Label>>) -> Self {
        if self.schema().uses(FilterFamily::IncludeLabels) {
            self.labels = Some(LabelResolver::new(labels, self.config.resolve_text_labels));
        }
        self
    }

    /// Override the backoff used when creating the index
    #[must_use]
    pub fn with_create_retry(mut self, config: RetryConfig) -> Self {
        self.create_retry = config;
        self
    }

    #[must_use]
    pub fn schema(&self) -> &'static IndexSchema {
        self.materializer.schema()
    }

    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        self.schema().kind
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> IndexState {
        *self.state_rx.borrow()
    }

    /// Watch lifecycle transitions
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<IndexState> {
        self.state_rx.clone()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.handle.read().is_some()
    }

    fn set_state(&self, state: IndexState) {
        let _ = self.state.send(state);
        metrics::set_index_state(self.kind(), &state.to_string());
    }

    /// Create the index and ingest every entity from the store.
    ///
    /// Returns the number of documents indexed. Calling it again rebuilds
    /// into a fresh index; the previous one keeps serving until it succeeds.
    #[tracing::instrument(skip(self), fields(kind = %self.kind()))]
    pub async fn build(&self) -> Result<usize, SyncError> {
        let start = Instant::now();
        let schema = self.schema();
        let kind = schema.kind;
        info!(index = schema.name, "Building search index");
        self.set_state(IndexState::Building);

        match self.build_inner(schema).await {
            Ok((handle, indexed)) => {
                *self.handle.write() = Some(handle);
                self.set_state(IndexState::Ready);
                metrics::set_indexed_documents(kind, indexed);
                info!(index = schema.name, indexed, elapsed_ms = start.elapsed().as_millis() as u64, "Search index ready");
                Ok(indexed)
            }
            Err(e) => {
                // A previous successful build keeps serving
                let fallback = if self.is_ready() { IndexState::Ready } else { IndexState::Failed };
                self.set_state(fallback);
                error!(index = schema.name, error = %e, "Search index build failed");
                Err(e)
            }
        }
    }

    async fn build_inner(&self, schema: &'static IndexSchema) -> Result<(Arc<dyn IndexHandle>, usize), SyncError> {
        let kind = schema.kind;
        let fields = schema.field_list();
        let (client, fields) = (&self.client, &fields);
        let handle = retry("create_index", &self.create_retry, move || client.create_index(schema.name, fields))
            .await
            .map_err(|source| SyncError::Create { kind, source })?;

        let entities = self
            .store
            .get_all()
            .await
            .map_err(|source| SyncError::Load { kind, source })?;
        info!(index = schema.name, count = entities.len(), "Loaded entities for indexing");

        let sync = Synchronizer::new(self.materializer.clone(), handle.clone(), self.config.slice_size);
        let indexed = sync.index_all(&entities).await?;
        Ok((handle, indexed))
    }

    fn synchronizer(&self) -> Result<Synchronizer<M>, SyncError> {
        let handle = self.handle.read().clone().ok_or(SyncError::NotBuilt(self.kind()))?;
        Ok(Synchronizer::new(self.materializer.clone(), handle, self.config.slice_size))
    }

    /// Bulk-index `entities` into the built index
    pub async fn index_all(&self, entities: &[M::Entity]) -> Result<usize, SyncError> {
        self.synchronizer()?.index_all(entities).await
    }

    /// Regenerate the documents of `entities` with one `update` call
    pub async fn update_some(&self, entities: &[M::Entity]) -> Result<(), SyncError> {
        self.synchronizer()?.update_some(entities).await
    }

    /// Load `ids` from the store and regenerate their documents.
    ///
    /// IDs that no longer exist are skipped. Returns how many were refreshed.
    pub async fn update_ids(&self, ids: &[String]) -> Result<usize, SyncError> {
        let kind = self.kind();
        let sync = self.synchronizer()?;
        let fetched = self
            .store
            .get_bulk(ids)
            .await
            .map_err(|source| SyncError::Load { kind, source })?;
        let entities: Vec<M::Entity> = fetched.into_iter().flatten().collect();
        if entities.len() < ids.len() {
            warn!(%kind, missing = ids.len() - entities.len(), "Skipping refresh of missing entities");
        }
        sync.update_some(&entities).await?;
        Ok(entities.len())
    }
}
