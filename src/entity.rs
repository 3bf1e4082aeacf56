// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Catalog entities.
//!
//! These are the source-of-truth records owned by the entity store. The search
//! layer only ever reads them; documents are derived projections.
//!
//! # Example
//!
//! ```
//! use catalog_search::entity::{Entity, Label};
//!
//! let label = Label::new("la_1", "  Outdoor ", vec!["Outside".into(), "outside ".into()]);
//! assert_eq!(label.id(), "la_1");
//! assert_eq!(label.name, "Outdoor");
//! assert_eq!(label.aliases, vec!["outside".to_string()]);
//! ```

use serde::{Deserialize, Serialize};

/// Anything stored in an [`EntityStore`](crate::storage::EntityStore).
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

/// Pixel dimensions of a video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Technical metadata probed from the media file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneMeta {
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    /// File size in bytes
    #[serde(default)]
    pub size: Option<u64>,
}

/// A video scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Epoch millis
    pub added_on: i64,
    #[serde(default)]
    pub release_date: Option<i64>,
    /// 0..=10
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub favorite: bool,
    /// Bookmark timestamp (epoch millis), `None` when not bookmarked
    #[serde(default)]
    pub bookmark: Option<i64>,
    #[serde(default)]
    pub studio: Option<String>,
    #[serde(default)]
    pub meta: SceneMeta,
}

impl Scene {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            added_on: 0,
            release_date: None,
            rating: 0,
            favorite: false,
            bookmark: None,
            studio: None,
            meta: SceneMeta::default(),
        }
    }
}

impl Entity for Scene {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A timestamped point of interest inside a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub added_on: i64,
    /// Owning scene ID
    pub scene: String,
    /// Offset into the scene in seconds
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub bookmark: Option<i64>,
}

impl Marker {
    pub fn new(id: impl Into<String>, name: impl Into<String>, scene: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            added_on: 0,
            scene: scene.into(),
            time: 0.0,
            rating: 0,
            favorite: false,
            bookmark: None,
        }
    }
}

impl Entity for Marker {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub added_on: i64,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, aliases: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases,
            added_on: 0,
        }
    }
}

impl Entity for Actor {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Studio {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub added_on: i64,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub bookmark: Option<i64>,
    /// Parent studio (network) ID
    #[serde(default)]
    pub parent: Option<String>,
}

impl Studio {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases: Vec::new(),
            added_on: 0,
            rating: 0,
            favorite: false,
            bookmark: None,
            parent: None,
        }
    }
}

impl Entity for Studio {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub added_on: i64,
}

impl Label {
    /// Create a label, normalizing the name and aliases.
    ///
    /// The name is trimmed. Aliases are trimmed, lower-cased and de-duplicated
    /// (first occurrence wins).
    pub fn new(id: impl Into<String>, name: &str, aliases: Vec<String>) -> Self {
        let mut normalized: Vec<String> = Vec::with_capacity(aliases.len());
        for alias in aliases {
            let alias = alias.trim().to_lowercase();
            if !alias.is_empty() && !normalized.contains(&alias) {
                normalized.push(alias);
            }
        }
        Self {
            id: id.into(),
            name: name.trim().to_string(),
            aliases: normalized,
            added_on: 0,
        }
    }

    /// Case-insensitive match against the name or any alias.
    pub fn matches_name(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        !needle.is_empty()
            && (self.name.to_lowercase() == needle || self.aliases.iter().any(|a| *a == needle))
    }
}

impl Entity for Label {
    fn id(&self) -> &str {
        &self.id
    }
}

/// `[name, ...aliases]` for every entity, flattened in order.
pub(crate) fn names_with_aliases<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a [String])>,
{
    entries
        .into_iter()
        .flat_map(|(name, aliases)| std::iter::once(name.to_string()).chain(aliases.iter().cloned()))
        .collect()
}
