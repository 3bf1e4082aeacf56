// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Index engine contract.
//!
//! The engine owns tokenization, storage and filter/sort execution. This crate
//! talks to it through [`IndexClient`] (index lifecycle) and the
//! [`IndexHandle`] it returns (document writes and search).

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::filter::FilterNode;
use super::sort::SortSpec;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("Index engine unreachable: {0}")]
    Transport(String),
    #[error("Index '{index}' rejected the request: {reason}")]
    Rejected { index: String, reason: String },
}

/// A document in wire form, keyed by `_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub id: String,
    pub body: Value,
}

/// Search request sent to the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub skip: usize,
    pub take: usize,
    pub filter: FilterNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
}

/// Ordered hit IDs plus the engine's own totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHits {
    pub items: Vec<String>,
    pub max_items: u64,
    pub num_pages: u64,
}

/// Index lifecycle
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Create (or recreate) an index declaring `fields` as searchable.
    async fn create_index(&self, name: &str, fields: &[String]) -> Result<Arc<dyn IndexHandle>, IndexError>;
}

/// Connection to one created index
#[async_trait]
pub trait IndexHandle: Send + Sync {
    fn name(&self) -> &str;

    /// Insert or replace documents (bulk ingestion)
    async fn index(&self, docs: Vec<IndexedDocument>) -> Result<(), IndexError>;

    /// Replace documents that changed
    async fn update(&self, docs: Vec<IndexedDocument>) -> Result<(), IndexError>;

    async fn search(&self, request: &SearchRequest) -> Result<SearchHits, IndexError>;
}
