// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Public types for the search service.

use std::ops::Range;

use thiserror::Error;

use crate::search::{DocumentKind, IndexError, SchemaError};
use crate::storage::StorageError;

/// Index lifecycle state.
///
/// Use [`super::SearchService::state()`] to check the current state or
/// [`super::SearchService::state_receiver()`] to watch for changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// Constructed, index not created yet
    Created,
    /// Creating the index and ingesting every entity
    Building,
    /// Serving searches and updates
    Ready,
    /// Last build failed; `build()` may be called again
    Failed,
}

impl std::fmt::Display for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Building => write!(f, "Building"),
            Self::Ready => write!(f, "Ready"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// One page of hydrated search results.
///
/// `total_count` and `page_count` are the engine's numbers, reported as-is
/// even when some hits could not be hydrated.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage<T> {
    pub total_count: u64,
    pub page_count: u64,
    pub items: Vec<T>,
}

impl<T> SearchPage<T> {
    /// The page returned when a search degrades
    #[must_use]
    pub fn empty() -> Self {
        Self { total_count: 0, page_count: 0, items: Vec::new() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for SearchPage<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Errors surfaced by [`super::SearchService::search`].
///
/// Runtime failures degrade to an empty page; only misuse is reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("The {0} index has not been built")]
    NotBuilt(DocumentKind),
}

/// Errors from building or writing to an index.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("The {0} index has not been built")]
    NotBuilt(DocumentKind),

    #[error("Invalid {kind} schema: {source}")]
    Schema {
        kind: DocumentKind,
        #[source]
        source: SchemaError,
    },

    #[error("Failed to create the {kind} index: {source}")]
    Create {
        kind: DocumentKind,
        #[source]
        source: IndexError,
    },

    #[error("Failed to load {kind} entities: {source}")]
    Load {
        kind: DocumentKind,
        #[source]
        source: StorageError,
    },

    #[error("Failed to materialize {kind} '{id}': {source}")]
    Materialize {
        kind: DocumentKind,
        id: String,
        #[source]
        source: StorageError,
    },

    /// A bulk slice was rejected; entities before `range.start` are indexed
    #[error("Failed to index {kind} entities {}..{}: {source}", .range.start, .range.end)]
    Flush {
        kind: DocumentKind,
        range: Range<usize>,
        #[source]
        source: IndexError,
    },

    #[error("Failed to update {count} {kind} documents: {source}")]
    Update {
        kind: DocumentKind,
        count: usize,
        #[source]
        source: IndexError,
    },
}
