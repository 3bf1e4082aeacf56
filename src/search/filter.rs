// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Filter Tree - boolean AST sent to the index engine
//!
//! [`build_filters`] turns compiled [`QueryOptions`] into a tree rooted at an
//! AND grouping. Each filter family contributes at most one child, appended in
//! the order of the family sequence, so identical options always produce
//! identical trees.
//!
//! # Example
//!
//! ```rust
//! use catalog_search::search::{build_filters, compile, FilterNode, FilterValue};
//!
//! let tree = build_filters(&compile("favorite:true include:la_1,la_2"));
//! let root = tree.as_grouping().unwrap();
//! assert_eq!(root.children.len(), 2);
//! assert_eq!(root.children[0], FilterNode::eq("favorite", FilterValue::Bool(true)));
//! ```

use serde::{Deserialize, Serialize};

use super::query_extractor::QueryOptions;

/// Filter tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    /// Boolean grouping of child nodes
    Grouping(FilterGroup),
    /// Single predicate on one document field
    Leaf(FilterLeaf),
}

/// Grouping operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(rename = "type")]
    pub op: GroupOp,
    pub children: Vec<FilterNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterLeaf {
    #[serde(rename = "property")]
    pub field: String,
    #[serde(rename = "operation")]
    pub operator: FilterOperator,
    pub value: FilterValue,
}

/// Leaf comparison operator.
///
/// Against an array field, `Eq` means "contains" and `Ne` "does not contain".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FilterNode {
    /// Empty AND grouping (matches everything)
    #[must_use]
    pub fn match_all() -> Self {
        Self::Grouping(FilterGroup { op: GroupOp::And, children: Vec::new() })
    }

    pub fn leaf(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self::Leaf(FilterLeaf { field: field.into(), operator, value })
    }

    pub fn eq(field: impl Into<String>, value: FilterValue) -> Self {
        Self::leaf(field, FilterOperator::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: FilterValue) -> Self {
        Self::leaf(field, FilterOperator::Ne, value)
    }

    #[must_use]
    pub fn and(children: Vec<FilterNode>) -> Self {
        Self::Grouping(FilterGroup { op: GroupOp::And, children })
    }

    #[must_use]
    pub fn or(children: Vec<FilterNode>) -> Self {
        Self::Grouping(FilterGroup { op: GroupOp::Or, children })
    }

    #[must_use]
    pub fn as_grouping(&self) -> Option<&FilterGroup> {
        match self {
            Self::Grouping(group) => Some(group),
            Self::Leaf(_) => None,
        }
    }

    /// Number of leaves in the whole tree
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Grouping(group) => group.children.iter().map(FilterNode::leaf_count).sum(),
            Self::Leaf(_) => 1,
        }
    }
}

/// One family of filters derived from [`QueryOptions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterFamily {
    Duration,
    Favorite,
    Bookmark,
    Rating,
    IncludeLabels,
    ExcludeLabels,
    Actors,
    Studios,
}

impl FilterFamily {
    /// Append this family's node to `root` if the options activate it
    pub fn apply(self, root: &mut FilterGroup, options: &QueryOptions) {
        match self {
            Self::Duration => filter_duration(root, options),
            Self::Favorite => filter_favorites(root, options),
            Self::Bookmark => filter_bookmark(root, options),
            Self::Rating => filter_rating(root, options),
            Self::IncludeLabels => filter_include(root, options),
            Self::ExcludeLabels => filter_exclude(root, options),
            Self::Actors => filter_actors(root, options),
            Self::Studios => filter_studios(root, options),
        }
    }
}

/// Full family sequence, in application order
pub const ALL_FAMILIES: &[FilterFamily] = &[
    FilterFamily::Duration,
    FilterFamily::Favorite,
    FilterFamily::Bookmark,
    FilterFamily::Rating,
    FilterFamily::IncludeLabels,
    FilterFamily::ExcludeLabels,
    FilterFamily::Actors,
    FilterFamily::Studios,
];

/// Build the filter tree using [`ALL_FAMILIES`]
#[must_use]
pub fn build_filters(options: &QueryOptions) -> FilterNode {
    build_filters_for(options, ALL_FAMILIES)
}

/// Build the filter tree applying `families` in the given order
#[must_use]
pub fn build_filters_for(options: &QueryOptions, families: &[FilterFamily]) -> FilterNode {
    let mut root = FilterGroup { op: GroupOp::And, children: Vec::new() };
    for family in families {
        family.apply(&mut root, options);
    }
    FilterNode::Grouping(root)
}

pub fn filter_favorites(root: &mut FilterGroup, options: &QueryOptions) {
    if options.favorite {
        root.children.push(FilterNode::eq("favorite", FilterValue::Bool(true)));
    }
}

pub fn filter_bookmark(root: &mut FilterGroup, options: &QueryOptions) {
    if options.bookmark {
        root.children.push(FilterNode::leaf("bookmark", FilterOperator::Gt, FilterValue::Number(0.0)));
    }
}

pub fn filter_rating(root: &mut FilterGroup, options: &QueryOptions) {
    if let Some(min) = options.min_rating {
        root.children.push(FilterNode::leaf("rating", FilterOperator::Gte, FilterValue::Number(min)));
    }
}

pub fn filter_include(root: &mut FilterGroup, options: &QueryOptions) {
    push_any_of(root, "labels", &options.include_labels);
}

pub fn filter_exclude(root: &mut FilterGroup, options: &QueryOptions) {
    let mut leaves: Vec<FilterNode> = options
        .exclude_labels
        .iter()
        .map(|id| FilterNode::ne("labels", FilterValue::Text(id.clone())))
        .collect();
    match leaves.len() {
        0 => {}
        1 => root.children.append(&mut leaves),
        _ => root.children.push(FilterNode::and(leaves)),
    }
}

pub fn filter_actors(root: &mut FilterGroup, options: &QueryOptions) {
    push_any_of(root, "actors", &options.include_actors);
}

pub fn filter_studios(root: &mut FilterGroup, options: &QueryOptions) {
    push_any_of(root, "studio", &options.include_studios);
}

pub fn filter_duration(root: &mut FilterGroup, options: &QueryOptions) {
    let mut leaves = Vec::with_capacity(2);
    if let Some(min) = options.duration_min {
        leaves.push(FilterNode::leaf("duration", FilterOperator::Gte, FilterValue::Number(min)));
    }
    if let Some(max) = options.duration_max {
        leaves.push(FilterNode::leaf("duration", FilterOperator::Lte, FilterValue::Number(max)));
    }
    match leaves.len() {
        0 => {}
        1 => root.children.append(&mut leaves),
        _ => root.children.push(FilterNode::and(leaves)),
    }
}

/// One `Eq` leaf, or an OR grouping when several IDs are given
fn push_any_of(root: &mut FilterGroup, field: &str, ids: &[String]) {
    let mut leaves: Vec<FilterNode> = ids
        .iter()
        .map(|id| FilterNode::eq(field, FilterValue::Text(id.clone())))
        .collect();
    match leaves.len() {
        0 => {}
        1 => root.children.append(&mut leaves),
        _ => root.children.push(FilterNode::or(leaves)),
    }
}
