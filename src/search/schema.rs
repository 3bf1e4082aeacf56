// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Index schemas
//!
//! One [`IndexSchema`] per document kind: the searchable field list declared
//! at index creation, the exhaustive document field list, the sort table and
//! the filter family sequence.
//!
//! ```text
//! scenes   fields: name labels actors studioName actorNames labelNames
//! markers  fields: name labelNames sceneName
//! studios  fields: name aliases labelNames parentName
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::filter::{FilterFamily, ALL_FAMILIES};
use super::sort::{SortFieldTable, SortFieldType};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{index}: field '{field}' is declared twice")]
    DuplicateField { index: &'static str, field: &'static str },
    #[error("{index}: searchable field '{field}' is not a document field")]
    UnknownSearchField { index: &'static str, field: &'static str },
    #[error("{index}: sort field '{field}' is not a document field")]
    UnknownSortField { index: &'static str, field: &'static str },
    #[error("{index}: sort table belongs to index '{table}'")]
    TableMismatch { index: &'static str, table: &'static str },
}

/// Kind of search document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Scene,
    Marker,
    Studio,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scene => write!(f, "scene"),
            Self::Marker => write!(f, "marker"),
            Self::Studio => write!(f, "studio"),
        }
    }
}

/// Static description of one index
#[derive(Debug, Clone, Copy)]
pub struct IndexSchema {
    pub kind: DocumentKind,
    /// Index name passed to `create_index`
    pub name: &'static str,
    /// Full-text searchable fields, in declaration order
    pub fields: &'static [&'static str],
    /// Every key a materialized document carries
    pub document_fields: &'static [&'static str],
    pub sort: SortFieldTable,
    /// Filter families applied to queries against this index, in order
    pub filters: &'static [FilterFamily],
}

impl IndexSchema {
    /// Check the schema is self-consistent. Called when a service is built.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.sort.index != self.name {
            return Err(SchemaError::TableMismatch { index: self.name, table: self.sort.index });
        }

        let mut seen = HashSet::new();
        for field in self.document_fields {
            if !seen.insert(*field) {
                return Err(SchemaError::DuplicateField { index: self.name, field: *field });
            }
        }
        for field in self.fields {
            if !seen.contains(field) {
                return Err(SchemaError::UnknownSearchField { index: self.name, field: *field });
            }
        }

        let mut sortable = HashSet::new();
        for (field, _) in self.sort.fields {
            if !seen.contains(field) {
                return Err(SchemaError::UnknownSortField { index: self.name, field: *field });
            }
            if !sortable.insert(*field) {
                return Err(SchemaError::DuplicateField { index: self.name, field: *field });
            }
        }
        Ok(())
    }

    /// Searchable field list as owned strings for `create_index`
    #[must_use]
    pub fn field_list(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.to_string()).collect()
    }

    /// Whether queries against this index apply `family`
    #[must_use]
    pub fn uses(&self, family: FilterFamily) -> bool {
        self.filters.contains(&family)
    }
}

pub const SCENE_SCHEMA: IndexSchema = IndexSchema {
    kind: DocumentKind::Scene,
    name: "scenes",
    fields: &["name", "labels", "actors", "studioName", "actorNames", "labelNames"],
    document_fields: &[
        "_id", "addedOn", "name", "actors", "labels", "actorNames", "labelNames", "rating",
        "bookmark", "favorite", "numViews", "releaseDate", "duration", "studio", "studioName",
        "resolution", "size", "score",
    ],
    sort: SortFieldTable {
        index: "scenes",
        fields: &[
            ("addedOn", SortFieldType::Number),
            ("name", SortFieldType::String),
            ("rating", SortFieldType::Number),
            ("bookmark", SortFieldType::Number),
            ("numViews", SortFieldType::Number),
            ("releaseDate", SortFieldType::Number),
            ("duration", SortFieldType::Number),
            ("resolution", SortFieldType::Number),
            ("size", SortFieldType::Number),
        ],
    },
    filters: ALL_FAMILIES,
};

const LABELLED_FAMILIES: &[FilterFamily] = &[
    FilterFamily::Favorite,
    FilterFamily::Bookmark,
    FilterFamily::Rating,
    FilterFamily::IncludeLabels,
    FilterFamily::ExcludeLabels,
];

pub const MARKER_SCHEMA: IndexSchema = IndexSchema {
    kind: DocumentKind::Marker,
    name: "markers",
    fields: &["name", "labelNames", "sceneName"],
    document_fields: &[
        "_id", "addedOn", "name", "labels", "labelNames", "rating", "bookmark", "favorite", "scene",
        "sceneName",
    ],
    sort: SortFieldTable {
        index: "markers",
        fields: &[
            ("addedOn", SortFieldType::Number),
            ("name", SortFieldType::String),
            ("rating", SortFieldType::Number),
            ("bookmark", SortFieldType::Number),
        ],
    },
    filters: LABELLED_FAMILIES,
};

pub const STUDIO_SCHEMA: IndexSchema = IndexSchema {
    kind: DocumentKind::Studio,
    name: "studios",
    fields: &["name", "aliases", "labelNames", "parentName"],
    document_fields: &[
        "_id", "addedOn", "name", "aliases", "labels", "labelNames", "rating", "bookmark",
        "favorite", "parent", "parentName",
    ],
    sort: SortFieldTable {
        index: "studios",
        fields: &[
            ("addedOn", SortFieldType::Number),
            ("name", SortFieldType::String),
            ("rating", SortFieldType::Number),
            ("bookmark", SortFieldType::Number),
        ],
    },
    filters: LABELLED_FAMILIES,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_schemas_validate() {
        SCENE_SCHEMA.validate().unwrap();
        MARKER_SCHEMA.validate().unwrap();
        STUDIO_SCHEMA.validate().unwrap();
    }

    #[test]
    fn test_unknown_sort_field_rejected() {
        let schema = IndexSchema {
            sort: SortFieldTable { index: "markers", fields: &[("numViews", SortFieldType::Number)] },
            ..MARKER_SCHEMA
        };
        assert_eq!(
            schema.validate(),
            Err(SchemaError::UnknownSortField { index: "markers", field: "numViews" })
        );
    }

    #[test]
    fn test_unknown_search_field_rejected() {
        let schema = IndexSchema { fields: &["name", "studioName"], ..MARKER_SCHEMA };
        assert_eq!(
            schema.validate(),
            Err(SchemaError::UnknownSearchField { index: "markers", field: "studioName" })
        );
    }

    #[test]
    fn test_table_mismatch_rejected() {
        let schema = IndexSchema { sort: SCENE_SCHEMA.sort, ..MARKER_SCHEMA };
        assert!(matches!(schema.validate(), Err(SchemaError::TableMismatch { .. })));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let schema = IndexSchema { document_fields: &["_id", "name", "name"], fields: &["name"], ..MARKER_SCHEMA };
        assert!(matches!(schema.validate(), Err(SchemaError::DuplicateField { field: "name", .. })));
    }

    #[test]
    fn test_family_membership() {
        assert!(SCENE_SCHEMA.uses(FilterFamily::Studios));
        assert!(!MARKER_SCHEMA.uses(FilterFamily::Studios));
        assert!(STUDIO_SCHEMA.uses(FilterFamily::IncludeLabels));
    }

    #[test]
    fn test_field_list() {
        assert_eq!(MARKER_SCHEMA.field_list(), vec!["name", "labelNames", "sceneName"]);
    }
}
