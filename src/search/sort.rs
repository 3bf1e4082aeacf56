// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Sort specification.
//!
//! Concrete fields are typed through an explicit [`SortFieldTable`]; asking to
//! sort by a field the table does not list is an error rather than an
//! untyped sort. `$shuffle` carries the caller's seed in the type slot.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use super::query_extractor::{QueryOptions, SortDir, SHUFFLE_MARKER};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SortError {
    #[error("Field '{field}' is not sortable on the {index} index")]
    UnmappedField { index: &'static str, field: String },
}

/// Value type of a sortable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortFieldType {
    Number,
    String,
}

/// What the engine should compare on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortValueType {
    Number,
    String,
    /// Seeded shuffle; the seed is passed verbatim
    Shuffle(String),
}

impl From<SortFieldType> for SortValueType {
    fn from(t: SortFieldType) -> Self {
        match t {
            SortFieldType::Number => Self::Number,
            SortFieldType::String => Self::String,
        }
    }
}

/// Engine-neutral sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub by: String,
    pub ascending: bool,
    pub value_type: SortValueType,
}

impl SortSpec {
    #[must_use]
    pub fn shuffle(seed: impl Into<String>) -> Self {
        Self {
            by: SHUFFLE_MARKER.to_string(),
            ascending: false,
            value_type: SortValueType::Shuffle(seed.into()),
        }
    }

    #[must_use]
    pub fn is_shuffle(&self) -> bool {
        matches!(self.value_type, SortValueType::Shuffle(_))
    }
}

// Wire form: {"sort_by", "sort_asc", "sort_type"}
impl Serialize for SortSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sort_type = match &self.value_type {
            SortValueType::Number => "number",
            SortValueType::String => "string",
            SortValueType::Shuffle(seed) => seed.as_str(),
        };
        let mut state = serializer.serialize_struct("SortSpec", 3)?;
        state.serialize_field("sort_by", &self.by)?;
        state.serialize_field("sort_asc", &self.ascending)?;
        state.serialize_field("sort_type", sort_type)?;
        state.end()
    }
}

/// Explicit field → type mapping for one index
#[derive(Debug, Clone, Copy)]
pub struct SortFieldTable {
    pub index: &'static str,
    pub fields: &'static [(&'static str, SortFieldType)],
}

impl SortFieldTable {
    #[must_use]
    pub fn lookup(&self, field: &str) -> Option<SortFieldType> {
        self.fields.iter().find(|(name, _)| *name == field).map(|(_, t)| *t)
    }
}

/// Build the sort spec for `options`.
///
/// `Ok(None)` when no sort directive is present.
pub fn build_sort(
    options: &QueryOptions,
    table: &SortFieldTable,
    shuffle_seed: &str,
) -> Result<Option<SortSpec>, SortError> {
    let Some(by) = options.sort_by.as_deref() else {
        return Ok(None);
    };

    if by == SHUFFLE_MARKER {
        return Ok(Some(SortSpec::shuffle(shuffle_seed)));
    }

    let field_type = table.lookup(by).ok_or_else(|| SortError::UnmappedField {
        index: table.index,
        field: by.to_string(),
    })?;

    Ok(Some(SortSpec {
        by: by.to_string(),
        ascending: options.sort_dir == SortDir::Asc,
        value_type: field_type.into(),
    }))
}
