// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search API for SearchService
//!
//! ```text
//! search(raw, seed)
//!       │
//!       ├─→ compile(raw) → QueryOptions
//!       ├─→ LabelResolver (names → IDs)
//!       ├─→ filter tree + sort spec + skip/take
//!       ├─→ IndexHandle::search → ordered IDs + totals
//!       └─→ EntityStore::get_bulk → entities in hit order, misses dropped
//! ```
//!
//! Anything that goes wrong past the "is the index built" check is logged and
//! answered with an empty page.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::{SearchError, SearchPage};
use super::SearchService;
use crate::materialize::Materializer;
use crate::metrics;
use crate::search::{
    build_filters_for, build_sort, compile, IndexError, IndexHandle, QueryOptions, SearchRequest, SortError,
};
use crate::storage::StorageError;

/// Reasons a query could not be turned into an engine request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Label lookup failed: {0}")]
    Labels(#[from] StorageError),
    #[error(transparent)]
    Sort(#[from] SortError),
}

/// Internal: why a search degraded
#[derive(Error, Debug)]
enum Degraded {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("Index engine search failed: {0}")]
    Engine(#[from] IndexError),
    #[error("Hydration failed: {0}")]
    Hydrate(StorageError),
}

impl<M: Materializer> SearchService<M> {
    /// Search with a raw query string.
    ///
    /// `seed` orders `sortBy:$shuffle` results; `None` uses the configured
    /// default seed. Returns [`SearchError::NotBuilt`] before [`build`](Self::build)
    /// has succeeded. Every other failure yields an empty page.
    pub async fn search(&self, raw: &str, seed: Option<&str>) -> Result<SearchPage<M::Entity>, SearchError> {
        let kind = self.kind();
        let handle = self.handle.read().clone().ok_or(SearchError::NotBuilt(kind))?;

        let start = Instant::now();
        let _timer = metrics::LatencyTimer::new(kind, "search");

        match self.run_search(handle, raw, seed).await {
            Ok(page) => {
                metrics::record_search_query(kind, "success");
                metrics::record_search_results(kind, page.items.len());
                info!(
                    %kind,
                    results = page.items.len(),
                    total = page.total_count,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Search done"
                );
                Ok(page)
            }
            Err(e) => {
                metrics::record_search_query(kind, "degraded");
                warn!(%kind, query = %raw, error = %e, "Search failed, returning empty page");
                Ok(SearchPage::empty())
            }
        }
    }

    /// Compile `raw` and build the request that would be sent to the engine.
    ///
    /// Label names are resolved against the label store when one is attached.
    pub async fn prepare(&self, raw: &str, seed: Option<&str>) -> Result<SearchRequest, QueryError> {
        let options = self.resolve(compile(raw)).await?;
        Ok(self.request_for(&options, seed)?)
    }

    async fn resolve(&self, options: QueryOptions) -> Result<QueryOptions, StorageError> {
        match &self.labels {
            Some(resolver) => resolver.resolve(options).await,
            None => Ok(options),
        }
    }

    /// Engine request for already-resolved `options`
    pub fn request_for(&self, options: &QueryOptions, seed: Option<&str>) -> Result<SearchRequest, SortError> {
        let schema = self.schema();
        let page_size = self.config.page_size;
        let seed = seed.unwrap_or(&self.config.default_shuffle_seed);

        let sort = build_sort(options, &schema.sort, seed)?;
        let skip = options.skip.unwrap_or((options.page as usize).saturating_mul(page_size));
        let take = options.take.unwrap_or(page_size);

        Ok(SearchRequest {
            query: options.text.clone(),
            skip,
            take,
            filter: build_filters_for(options, schema.filters),
            sort,
        })
    }

    async fn run_search(
        &self,
        handle: Arc<dyn IndexHandle>,
        raw: &str,
        seed: Option<&str>,
    ) -> Result<SearchPage<M::Entity>, Degraded> {
        let kind = self.kind();
        let request = self.prepare(raw, seed).await?;
        debug!(%kind, query = %request.query, skip = request.skip, take = request.take, sort = ?request.sort, "Searching");

        let hits = handle.search(&request).await?;
        if hits.items.is_empty() {
            return Ok(SearchPage { total_count: hits.max_items, page_count: hits.num_pages, items: Vec::new() });
        }

        let fetched = self.store.get_bulk(&hits.items).await.map_err(Degraded::Hydrate)?;
        let items: Vec<M::Entity> = fetched.into_iter().flatten().collect();
        let misses = hits.items.len().saturating_sub(items.len());
        if misses > 0 {
            debug!(%kind, misses, "Dropping hits missing from the entity store");
        }
        metrics::record_hydration_misses(kind, misses);

        Ok(SearchPage { total_count: hits.max_items, page_count: hits.num_pages, items })
    }
}
