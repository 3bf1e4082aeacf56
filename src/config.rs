// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for the search service.
//!
//! # Example
//!
//! ```
//! use catalog_search::SearchConfig;
//!
//! let config = SearchConfig::default();
//! assert_eq!(config.slice_size, 5000);
//! assert_eq!(config.page_size, 24);
//!
//! let config = SearchConfig {
//!     slice_size: 500,
//!     resolve_text_labels: false,
//!     ..Default::default()
//! };
//! assert_eq!(config.default_shuffle_seed, "default");
//! ```

use serde::Deserialize;

/// Configuration for a [`SearchService`](crate::SearchService).
///
/// Every field has a default, so an empty document deserializes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchConfig {
    /// Documents per bulk `index` call during a full build
    #[serde(default = "default_slice_size")]
    pub slice_size: usize,

    /// Page size used for `page:N` and when no `take:` is given
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Shuffle seed when the caller does not pass one
    #[serde(default = "default_shuffle_seed")]
    pub default_shuffle_seed: String,

    /// Turn label names found in the text term into include filters
    #[serde(default = "default_resolve_text_labels")]
    pub resolve_text_labels: bool,

    /// Max IDs coalesced into one background `update` call
    #[serde(default = "default_reindex_batch_size")]
    pub reindex_batch_size: usize,
}

fn default_slice_size() -> usize { 5000 }
fn default_page_size() -> usize { 24 }
fn default_shuffle_seed() -> String { "default".to_string() }
fn default_resolve_text_labels() -> bool { true }
fn default_reindex_batch_size() -> usize { 100 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            slice_size: default_slice_size(),
            page_size: default_page_size(),
            default_shuffle_seed: default_shuffle_seed(),
            resolve_text_labels: default_resolve_text_labels(),
            reindex_batch_size: default_reindex_batch_size(),
        }
    }
}
