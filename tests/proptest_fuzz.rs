//! Property-based tests for the query pipeline.
//!
//! Uses proptest to generate random and malformed query strings and verify
//! compilation never panics and the derived request pieces are stable.
//!
//! Run with: `cargo test --test proptest_fuzz`

use proptest::prelude::*;

use catalog_search::batching::{FlushReason, SliceBatcher};
use catalog_search::search::{
    build_filters, build_sort, compile, FilterNode, FilterValue, QueryOptions, SortValueType, SCENE_SCHEMA,
};

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Plain words that can never be read as a directive
fn word_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,12}"
}

/// One well-formed directive token
fn directive_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<bool>().prop_map(|b| format!("favorite:{b}")),
        any::<bool>().prop_map(|b| format!("bookmark:{b}")),
        (0u8..=10).prop_map(|r| format!("rating:{r}")),
        (0u32..50).prop_map(|p| format!("page:{p}")),
        (1usize..200).prop_map(|t| format!("take:{t}")),
        "la_[0-9]{1,3}".prop_map(|id| format!("include:{id}")),
        "la_[0-9]{1,3}".prop_map(|id| format!("exclude:{id}")),
        "ac_[0-9]{1,3}".prop_map(|id| format!("actors:{id}")),
        "st_[0-9]{1,3}".prop_map(|id| format!("studios:{id}")),
        (0u32..10_000).prop_map(|d| format!("duration.min:{d}")),
        (0u32..10_000).prop_map(|d| format!("duration.max:{d}")),
        Just("sortBy:$shuffle".to_string()),
        Just("sortBy:rating".to_string()),
        Just("sortDir:asc".to_string()),
    ]
}

fn leaf_fields(node: &FilterNode, out: &mut Vec<String>) {
    match node {
        FilterNode::Leaf(leaf) => out.push(leaf.field.clone()),
        FilterNode::Grouping(group) => group.children.iter().for_each(|c| leaf_fields(c, out)),
    }
}

// =============================================================================
// Query compiler
// =============================================================================

proptest! {
    /// Arbitrary input never panics
    #[test]
    fn fuzz_compile_arbitrary_input(raw in ".*") {
        let _ = compile(&raw);
    }

    /// Compilation is deterministic
    #[test]
    fn prop_compile_deterministic(raw in ".{0,200}") {
        prop_assert_eq!(compile(&raw), compile(&raw));
    }

    /// Without directives the text is the trimmed input and nothing else is set
    #[test]
    fn prop_plain_text_passthrough(words in prop::collection::vec(word_strategy(), 0..8), sep in "[ ]{1,3}") {
        let raw = format!("  {}  ", words.join(&sep));
        let options = compile(&raw);
        prop_assert_eq!(options.text.as_str(), raw.trim());
        prop_assert_eq!(options, QueryOptions { text: raw.trim().to_string(), ..Default::default() });
    }

    /// Directives never leak into the text term
    #[test]
    fn prop_directives_removed_from_text(
        words in prop::collection::vec(word_strategy(), 0..5),
        directives in prop::collection::vec(directive_strategy(), 0..6),
    ) {
        let mut tokens: Vec<String> = directives.clone();
        tokens.extend(words.iter().cloned());
        let options = compile(&tokens.join(" "));
        prop_assert_eq!(options.text, words.join(" "));
    }
}

// =============================================================================
// Filter tree
// =============================================================================

proptest! {
    /// Directive order never changes the tree
    #[test]
    fn prop_filter_order_stable(directives in prop::collection::vec(directive_strategy(), 0..8)) {
        // Keep one directive per key so "last wins" does not depend on order
        let mut seen = std::collections::HashSet::new();
        let unique: Vec<String> = directives
            .into_iter()
            .filter(|d| seen.insert(d.split(':').next().unwrap_or_default().to_string()))
            .collect();

        let forward = build_filters(&compile(&unique.join(" ")));
        let mut reversed = unique.clone();
        reversed.reverse();
        let backward = build_filters(&compile(&reversed.join(" ")));
        prop_assert_eq!(forward, backward);
    }

    /// Leaves appear in family order
    #[test]
    fn prop_filter_family_order(directives in prop::collection::vec(directive_strategy(), 0..10)) {
        const ORDER: &[&str] = &["duration", "favorite", "bookmark", "rating", "labels", "actors", "studio"];
        let mut fields = Vec::new();
        leaf_fields(&build_filters(&compile(&directives.join(" "))), &mut fields);

        let ranks: Vec<usize> = fields
            .iter()
            .map(|f| ORDER.iter().position(|o| o == f).expect("known field"))
            .collect();
        prop_assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    /// Favorite leaf present iff the last favorite directive is true
    #[test]
    fn prop_favorite_leaf(flag in any::<bool>(), words in prop::collection::vec(word_strategy(), 0..3)) {
        let tree = build_filters(&compile(&format!("{} favorite:{flag}", words.join(" "))));
        let has_leaf = tree
            .as_grouping()
            .map(|g| g.children.contains(&FilterNode::eq("favorite", FilterValue::Bool(true))))
            .unwrap_or(false);
        prop_assert_eq!(has_leaf, flag);
    }
}

// =============================================================================
// Sort spec and batching
// =============================================================================

proptest! {
    /// The shuffle seed is passed through verbatim
    #[test]
    fn prop_shuffle_seed_verbatim(seed in ".{0,40}") {
        let spec = build_sort(&compile("sortBy:$shuffle"), &SCENE_SCHEMA.sort, &seed).unwrap().unwrap();
        prop_assert_eq!(spec.value_type, SortValueType::Shuffle(seed));
        prop_assert!(!spec.ascending);
    }

    /// Slices are full except possibly the last, and cover the input exactly once
    #[test]
    fn prop_slices_cover_input(n in 0usize..500, slice in 1usize..64) {
        let mut batcher = SliceBatcher::new(slice);
        let mut batches = Vec::new();
        for i in 0..n {
            if let Some(reason) = batcher.push(i) {
                batches.extend(batcher.take_batch(reason));
            }
        }
        batches.extend(batcher.finish());

        let flattened: Vec<usize> = batches.iter().flat_map(|b| b.items.iter().copied()).collect();
        prop_assert_eq!(flattened, (0..n).collect::<Vec<_>>());
        for (i, batch) in batches.iter().enumerate() {
            prop_assert_eq!(batch.range.clone(), batch.items[0]..batch.items[0] + batch.items.len());
            if i + 1 < batches.len() {
                prop_assert_eq!(batch.items.len(), slice);
                prop_assert_eq!(batch.reason, FlushReason::Count);
            }
        }
    }
}
