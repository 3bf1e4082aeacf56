// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Infrastructure
//!
//! Turns a free-form query string into an engine request and defines the
//! contract with the full-text index engine.
//!
//! # Architecture
//!
//! ```text
//! raw query ─→ compile() ─→ QueryOptions
//!                               ↓
//!                        LabelResolver (names → IDs)
//!                               ↓
//!              ┌────────────────┴───────────────┐
//!              ↓                                ↓
//!      build_filters_for()                build_sort()
//!        FilterNode tree                 Option<SortSpec>
//!              └────────────────┬───────────────┘
//!                               ↓
//!                 SearchRequest ─→ IndexHandle::search
//! ```
//!
//! # Query Language
//!
//! ```text
//! beach sunset              - free text
//! favorite:true             - favorites only
//! bookmark:true             - bookmarked only
//! rating:3                  - minimum rating
//! include:la_1,la_2         - any of these labels
//! exclude:la_3              - none of these labels
//! actors:ac_1               - any of these actors
//! studios:st_1              - any of these studios
//! duration.min:60           - duration bounds (seconds)
//! duration.max:600
//! sortBy:rating sortDir:asc - sort
//! sortBy:$shuffle           - seeded shuffle
//! page:2 skip:10 take:50    - paging
//! ```
//!
//! # Example
//!
//! ```rust
//! use catalog_search::search::{compile, SortDir};
//!
//! let options = compile("beach favorite:true sortBy:rating sortDir:asc");
//! assert_eq!(options.text, "beach");
//! assert!(options.favorite);
//! assert_eq!(options.sort_by.as_deref(), Some("rating"));
//! assert_eq!(options.sort_dir, SortDir::Asc);
//! ```

mod client;
mod filter;
mod label_resolver;
mod memory_index;
mod query_extractor;
mod schema;
mod sort;

pub use client::{IndexClient, IndexError, IndexHandle, IndexedDocument, SearchHits, SearchRequest};
pub use filter::{
    build_filters, build_filters_for, filter_actors, filter_bookmark, filter_duration,
    filter_exclude, filter_favorites, filter_include, filter_rating, filter_studios, FilterFamily,
    FilterGroup, FilterLeaf, FilterNode, FilterOperator, FilterValue, GroupOp, ALL_FAMILIES,
};
pub use label_resolver::LabelResolver;
pub use memory_index::{InMemoryIndex, InMemoryIndexClient};
pub use query_extractor::{compile, QueryOptions, SortDir, SHUFFLE_MARKER};
pub use schema::{DocumentKind, IndexSchema, SchemaError, MARKER_SCHEMA, SCENE_SCHEMA, STUDIO_SCHEMA};
pub use sort::{build_sort, SortError, SortFieldTable, SortFieldType, SortSpec, SortValueType};
