// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Label name resolution.
//!
//! Users type label names, the index stores label IDs. Before the filter tree
//! is built, include/exclude entries that are not known IDs are looked up by
//! name or alias, and (optionally) words of the text term that name a label
//! become include filters.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use super::query_extractor::QueryOptions;
use crate::entity::Label;
use crate::storage::{EntityStore, StorageError};

/// Lower-cased name/alias → label ID, plus the set of known IDs
struct LabelIndex {
    ids: HashSet<String>,
    by_name: HashMap<String, String>,
}

impl LabelIndex {
    fn new(labels: &[Label]) -> Self {
        let mut ids = HashSet::with_capacity(labels.len());
        let mut by_name = HashMap::new();
        for label in labels {
            ids.insert(label.id.clone());
            // First label wins on name collisions
            by_name.entry(label.name.to_lowercase()).or_insert_with(|| label.id.clone());
            for alias in &label.aliases {
                by_name.entry(alias.to_lowercase()).or_insert_with(|| label.id.clone());
            }
        }
        Self { ids, by_name }
    }

    fn resolve(&self, entry: &str) -> String {
        if self.ids.contains(entry) {
            return entry.to_string();
        }
        self.by_name
            .get(&entry.trim().to_lowercase())
            .cloned()
            .unwrap_or_else(|| entry.to_string())
    }

    fn lookup_name(&self, name: &str) -> Option<&String> {
        self.by_name.get(&name.trim().to_lowercase())
    }
}

pub struct LabelResolver {
    labels: Arc<dyn EntityStore<Label>>,
    from_text: bool,
}

impl LabelResolver {
    pub fn new(labels: Arc<dyn EntityStore<Label>>, from_text: bool) -> Self {
        Self { labels, from_text }
    }

    /// Rewrite label references in `options` to label IDs.
    ///
    /// Entries that match nothing are kept as given. The store is only read
    /// when there is something to resolve.
    pub async fn resolve(&self, mut options: QueryOptions) -> Result<QueryOptions, StorageError> {
        let text_pending = self.from_text && !options.text.trim().is_empty();
        if options.include_labels.is_empty() && options.exclude_labels.is_empty() && !text_pending {
            return Ok(options);
        }

        let labels = self.labels.get_all().await?;
        let index = LabelIndex::new(&labels);

        options.include_labels = dedupe(options.include_labels.iter().map(|e| index.resolve(e)));
        options.exclude_labels = dedupe(options.exclude_labels.iter().map(|e| index.resolve(e)));

        if text_pending {
            let text = options.text.clone();
            let candidates = std::iter::once(text.as_str()).chain(text.split_whitespace());
            for candidate in candidates {
                if let Some(id) = index.lookup_name(candidate) {
                    if !options.include_labels.contains(id) {
                        debug!(label = %id, name = %candidate, "Label resolved from query text");
                        options.include_labels.push(id.clone());
                    }
                }
            }
        }

        Ok(options)
    }
}

fn dedupe(ids: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
