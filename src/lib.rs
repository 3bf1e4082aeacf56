// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Catalog Search
//!
//! Search synchronization and query compilation for a media catalog.
//!
//! ## Architecture
//!
//! The entity store is the source of truth. Each searchable kind (scenes,
//! markers, studios) gets a denormalized projection in a full-text index
//! engine, and queries are compiled from a free-form string into an engine
//! request:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Entity Store                          │
//! │  • Scenes, markers, studios, actors, labels                │
//! │  • Label/actor join records, view counts                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                    (Materializer per kind)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Synchronizer                            │
//! │  • Bulk build in fixed-size slices                         │
//! │  • Whole-document updates, background refresh              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Index Engine                             │
//! │  • Full-text match, filter tree, typed/shuffled sort       │
//! │  • Returns ordered IDs + totals                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                    (Hydration from the entity store)
//!                              ▼
//!                         SearchPage
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use catalog_search::{SearchConfig, SearchService};
//! use catalog_search::entity::{Label, Scene};
//! use catalog_search::materialize::SceneMaterializer;
//! use catalog_search::search::InMemoryIndexClient;
//! use catalog_search::storage::{InMemoryCatalog, RelationKind};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let stores = InMemoryCatalog::new();
//! let mut scene = Scene::new("sc_1", "Beach");
//! scene.favorite = true;
//! stores.scenes.insert(scene);
//! stores.labels.insert(Label::new("la_1", "outdoor", vec![]));
//! stores.relations.attach("sc_1", RelationKind::Label, &["la_1"]);
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
//! service.build().await.unwrap();
//!
//! let page = service.search("outdoor favorite:true", None).await.unwrap();
//! assert_eq!(page.total_count, 1);
//! assert_eq!(page.items[0].id, "sc_1");
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`coordinator`]: [`SearchService`] lifecycle, synchronization, search, background refresh
//! - [`search`]: query compiler, filter tree, sort spec, index engine contract
//! - [`materialize`]: entity → document projections
//! - [`storage`]: entity store contracts and in-memory implementations
//! - [`batching`]: fixed-size slice batcher
//! - [`resilience`]: retry with backoff
//! - [`metrics`]: `metrics` facade instrumentation

pub mod batching;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod materialize;
pub mod metrics;
pub mod resilience;
pub mod search;
pub mod storage;

pub use config::SearchConfig;
pub use coordinator::{
    IndexState, QueryError, ReindexHandle, ReindexJob, SearchError, SearchPage, SearchService, SyncError,
    Synchronizer,
};
pub use entity::Entity;
pub use metrics::LatencyTimer;
pub use resilience::retry::RetryConfig;
pub use storage::traits::StorageError;
