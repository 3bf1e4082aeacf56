// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Extractor - free text with embedded `key:value` directives
//!
//! ```text
//! beach sunset rating:3 include:la_1,la_2 sortBy:$shuffle page:2
//! └── text ──┘ └────────────────── directives ────────────────────┘
//! ```
//!
//! Directive keys are ASCII letters and dots, matched case-insensitively.
//! Unknown keys and values that fail to parse are dropped. Everything that is
//! not a directive stays in the text term.
//!
//! # Example
//!
//! ```rust
//! use catalog_search::search::{compile, SortDir};
//!
//! let options = compile("beach  sunset favorite:true sortBy:rating sortDir:asc");
//! assert_eq!(options.text, "beach  sunset");
//! assert!(options.favorite);
//! assert_eq!(options.sort_by.as_deref(), Some("rating"));
//! assert_eq!(options.sort_dir, SortDir::Asc);
//! ```

use serde::{Deserialize, Serialize};

/// Marker value of `sortBy` requesting a seeded shuffle
pub const SHUFFLE_MARKER: &str = "$shuffle";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

/// Structured options compiled from a raw query string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Free text left after removing directives
    pub text: String,
    /// Field name or [`SHUFFLE_MARKER`]
    pub sort_by: Option<String>,
    pub sort_dir: SortDir,
    pub page: u32,
    pub skip: Option<usize>,
    pub take: Option<usize>,
    pub favorite: bool,
    pub bookmark: bool,
    pub min_rating: Option<f64>,
    pub include_labels: Vec<String>,
    pub exclude_labels: Vec<String>,
    pub include_actors: Vec<String>,
    pub include_studios: Vec<String>,
    pub duration_min: Option<f64>,
    pub duration_max: Option<f64>,
}

impl QueryOptions {
    /// Whether the sort directive asks for a seeded shuffle
    #[must_use]
    pub fn is_shuffle(&self) -> bool {
        self.sort_by.as_deref() == Some(SHUFFLE_MARKER)
    }
}

/// Compile a raw query string into [`QueryOptions`].
///
/// Pure: the same input always yields an identical value.
#[must_use]
pub fn compile(raw: &str) -> QueryOptions {
    let mut options = QueryOptions::default();

    for (separator, token) in tokens(raw) {
        match split_directive(token) {
            Some((key, value)) => apply_directive(&mut options, &key, value),
            None => {
                if !options.text.is_empty() {
                    options.text.push_str(separator);
                }
                options.text.push_str(token);
            }
        }
    }

    options
}

/// Whitespace-separated tokens paired with the whitespace run preceding each
fn tokens(raw: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut gap_start = 0;
    let mut token_start: Option<usize> = None;

    for (i, c) in raw.char_indices() {
        match (c.is_whitespace(), token_start) {
            (true, Some(start)) => {
                out.push((&raw[gap_start..start], &raw[start..i]));
                token_start = None;
                gap_start = i;
            }
            (false, None) => token_start = Some(i),
            _ => {}
        }
    }
    if let Some(start) = token_start {
        out.push((&raw[gap_start..start], &raw[start..]));
    }

    out
}

/// `Some((lowercase key, value))` when the token looks like a directive
fn split_directive(token: &str) -> Option<(String, &str)> {
    let (key, value) = token.split_once(':')?;
    let is_key = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphabetic() || c == '.')
        && key.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    is_key.then(|| (key.to_ascii_lowercase(), value))
}

fn apply_directive(options: &mut QueryOptions, key: &str, value: &str) {
    match key {
        "take" => set_parsed(&mut options.take, value),
        "skip" => set_parsed(&mut options.skip, value),
        "page" => {
            if let Ok(page) = value.parse() {
                options.page = page;
            }
        }
        "include" | "label" | "labels" => extend_ids(&mut options.include_labels, value),
        "exclude" => extend_ids(&mut options.exclude_labels, value),
        "actors" | "actor" => extend_ids(&mut options.include_actors, value),
        "studios" | "studio" => extend_ids(&mut options.include_studios, value),
        "favorite" => set_flag(&mut options.favorite, value),
        "bookmark" => set_flag(&mut options.bookmark, value),
        "rating" => set_parsed_finite(&mut options.min_rating, value),
        "sortby" => {
            if !value.is_empty() {
                options.sort_by = Some(value.to_string());
            }
        }
        "sortdir" => match value.to_ascii_lowercase().as_str() {
            "asc" => options.sort_dir = SortDir::Asc,
            "desc" => options.sort_dir = SortDir::Desc,
            _ => {}
        },
        "duration.min" => set_parsed_finite(&mut options.duration_min, value),
        "duration.max" => set_parsed_finite(&mut options.duration_max, value),
        _ => {}
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut Option<T>, value: &str) {
    if let Ok(parsed) = value.parse() {
        *slot = Some(parsed);
    }
}

fn set_parsed_finite(slot: &mut Option<f64>, value: &str) {
    if let Ok(parsed) = value.parse::<f64>() {
        if parsed.is_finite() {
            *slot = Some(parsed);
        }
    }
}

fn set_flag(slot: &mut bool, value: &str) {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => *slot = true,
        "false" | "0" => *slot = false,
        _ => {}
    }
}

fn extend_ids(ids: &mut Vec<String>, value: &str) {
    for id in value.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_trimmed_input() {
        let options = compile("  summer   beach ");
        assert_eq!(options.text, "summer   beach");
        assert_eq!(options, QueryOptions { text: "summer   beach".into(), ..Default::default() });
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(compile(""), QueryOptions::default());
        assert_eq!(compile("   "), QueryOptions::default());
    }

    #[test]
    fn test_directives_only_leave_empty_text() {
        let options = compile("favorite:true bookmark:true");
        assert_eq!(options.text, "");
        assert!(options.favorite);
        assert!(options.bookmark);
    }

    #[test]
    fn test_text_around_directives() {
        let options = compile("red rating:4 car");
        assert_eq!(options.text, "red car");
        assert_eq!(options.min_rating, Some(4.0));
    }

    #[test]
    fn test_pagination_directives() {
        let options = compile("page:2 skip:10 take:5");
        assert_eq!(options.page, 2);
        assert_eq!(options.skip, Some(10));
        assert_eq!(options.take, Some(5));
    }

    #[test]
    fn test_bad_numbers_are_dropped() {
        let options = compile("page:two take:-1 rating:high duration.min:NaN duration.max:inf");
        assert_eq!(options.page, 0);
        assert_eq!(options.take, None);
        assert_eq!(options.min_rating, None);
        assert_eq!(options.duration_min, None);
        assert_eq!(options.duration_max, None);
        assert_eq!(options.text, "");
    }

    #[test]
    fn test_unknown_directives_are_ignored() {
        let options = compile("hello color:red world");
        assert_eq!(options.text, "hello world");
        assert_eq!(options, QueryOptions { text: "hello world".into(), ..Default::default() });
    }

    #[test]
    fn test_non_directive_colons_stay_in_text() {
        let options = compile("at 12:30 :smile:");
        assert_eq!(options.text, "at 12:30 :smile:");
    }

    #[test]
    fn test_id_lists_accumulate_and_dedupe() {
        let options = compile("include:la_1,la_2 labels:la_2,,la_3 exclude:la_9 actors:ac_1 studios:st_1,st_2");
        assert_eq!(options.include_labels, vec!["la_1", "la_2", "la_3"]);
        assert_eq!(options.exclude_labels, vec!["la_9"]);
        assert_eq!(options.include_actors, vec!["ac_1"]);
        assert_eq!(options.include_studios, vec!["st_1", "st_2"]);
    }

    #[test]
    fn test_sort_directives_last_wins() {
        let options = compile("sortBy:name sortby:$shuffle SORTDIR:ASC");
        assert_eq!(options.sort_by.as_deref(), Some(SHUFFLE_MARKER));
        assert!(options.is_shuffle());
        assert_eq!(options.sort_dir, SortDir::Asc);
    }

    #[test]
    fn test_invalid_sort_dir_keeps_default() {
        let options = compile("sortDir:sideways");
        assert_eq!(options.sort_dir, SortDir::Desc);
    }

    #[test]
    fn test_flags() {
        assert!(!compile("favorite:maybe").favorite);
        assert!(!compile("favorite:true favorite:false").favorite);
        assert!(compile("bookmark:1").bookmark);
    }

    #[test]
    fn test_duration_range() {
        let options = compile("duration.min:60 duration.max:600.5");
        assert_eq!(options.duration_min, Some(60.0));
        assert_eq!(options.duration_max, Some(600.5));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let raw = "beach include:la_1 sortBy:$shuffle page:3";
        assert_eq!(compile(raw), compile(raw));
    }
}
