// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-memory index engine.
//!
//! A small reference implementation of [`IndexClient`]/[`IndexHandle`] used by
//! the tests and by embedders that do not run an external engine. It evaluates
//! the filter tree over JSON documents, does naive word matching over the
//! declared fields, sorts, and paginates.
//!
//! Shuffle ordering sorts by `sha256(seed ":" id)`, so the same seed over the
//! same document set always yields the same order.
//!
//! Fault injection hooks let tests fail specific calls.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::client::{IndexClient, IndexError, IndexHandle, IndexedDocument, SearchHits, SearchRequest};
use super::filter::{FilterNode, FilterOperator, FilterValue, GroupOp};
use super::sort::{SortSpec, SortValueType};

/// Client owning every in-memory index by name
#[derive(Default)]
pub struct InMemoryIndexClient {
    indexes: DashMap<String, Arc<InMemoryIndex>>,
    fail_create: AtomicBool,
}

impl InMemoryIndexClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a created index for inspection
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<InMemoryIndex>> {
        self.indexes.get(name).map(|r| r.value().clone())
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, AtomicOrdering::Relaxed);
    }
}

#[async_trait]
impl IndexClient for InMemoryIndexClient {
    async fn create_index(&self, name: &str, fields: &[String]) -> Result<Arc<dyn IndexHandle>, IndexError> {
        if self.fail_create.load(AtomicOrdering::Relaxed) {
            return Err(IndexError::Transport("injected create failure".into()));
        }
        let index = Arc::new(InMemoryIndex::new(name, fields.to_vec()));
        self.indexes.insert(name.to_string(), index.clone());
        debug!(index = %name, fields = ?fields, "In-memory index created");
        Ok(index)
    }
}

struct StoredDocument {
    seq: u64,
    body: Value,
}

/// One in-memory index
pub struct InMemoryIndex {
    name: String,
    fields: Vec<String>,
    docs: RwLock<HashMap<String, StoredDocument>>,
    next_seq: AtomicU64,
    index_calls: Mutex<Vec<usize>>,
    update_calls: Mutex<Vec<usize>>,
    search_calls: AtomicUsize,
    fail_index_on_call: Mutex<Option<usize>>,
    fail_updates: AtomicBool,
    fail_searches: AtomicBool,
}

impl InMemoryIndex {
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            name: name.into(),
            fields,
            docs: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            index_calls: Mutex::new(Vec::new()),
            update_calls: Mutex::new(Vec::new()),
            search_calls: AtomicUsize::new(0),
            fail_index_on_call: Mutex::new(None),
            fail_updates: AtomicBool::new(false),
            fail_searches: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Stored body of one document
    #[must_use]
    pub fn document(&self, id: &str) -> Option<Value> {
        self.docs.read().get(id).map(|d| d.body.clone())
    }

    /// Sizes of every `index` call attempted, in order
    #[must_use]
    pub fn index_calls(&self) -> Vec<usize> {
        self.index_calls.lock().clone()
    }

    /// Sizes of every `update` call attempted, in order
    #[must_use]
    pub fn update_calls(&self) -> Vec<usize> {
        self.update_calls.lock().clone()
    }

    #[must_use]
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(AtomicOrdering::Relaxed)
    }

    /// Fail the `n`-th `index` call (1-based)
    pub fn fail_index_on_call(&self, n: usize) {
        *self.fail_index_on_call.lock() = Some(n);
    }

    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, AtomicOrdering::Relaxed);
    }

    pub fn set_fail_searches(&self, fail: bool) {
        self.fail_searches.store(fail, AtomicOrdering::Relaxed);
    }

    /// Insert a document directly, bypassing the call log and fault hooks
    pub fn insert_raw(&self, id: &str, body: Value) {
        self.upsert(vec![IndexedDocument { id: id.to_string(), body }]);
    }

    fn upsert(&self, docs: Vec<IndexedDocument>) {
        let mut stored = self.docs.write();
        for doc in docs {
            match stored.get_mut(&doc.id) {
                Some(existing) => existing.body = doc.body,
                None => {
                    let seq = self.next_seq.fetch_add(1, AtomicOrdering::Relaxed);
                    stored.insert(doc.id, StoredDocument { seq, body: doc.body });
                }
            }
        }
    }

    fn text_matches(&self, words: &[String], body: &Value) -> bool {
        words.iter().all(|word| {
            self.fields.iter().any(|field| match body.get(field) {
                Some(Value::String(s)) => s.to_lowercase().contains(word),
                Some(Value::Array(items)) => items
                    .iter()
                    .any(|v| v.as_str().is_some_and(|s| s.to_lowercase().contains(word))),
                _ => false,
            })
        })
    }
}

#[async_trait]
impl IndexHandle for InMemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn index(&self, docs: Vec<IndexedDocument>) -> Result<(), IndexError> {
        let call = {
            let mut calls = self.index_calls.lock();
            calls.push(docs.len());
            calls.len()
        };
        if *self.fail_index_on_call.lock() == Some(call) {
            return Err(IndexError::Transport(format!("injected failure on index call {call}")));
        }
        self.upsert(docs);
        Ok(())
    }

    async fn update(&self, docs: Vec<IndexedDocument>) -> Result<(), IndexError> {
        self.update_calls.lock().push(docs.len());
        if self.fail_updates.load(AtomicOrdering::Relaxed) {
            return Err(IndexError::Transport("injected update failure".into()));
        }
        self.upsert(docs);
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchHits, IndexError> {
        self.search_calls.fetch_add(1, AtomicOrdering::Relaxed);
        if self.fail_searches.load(AtomicOrdering::Relaxed) {
            return Err(IndexError::Transport("injected search failure".into()));
        }

        let words: Vec<String> = request.query.split_whitespace().map(str::to_lowercase).collect();
        let docs = self.docs.read();
        let mut hits: Vec<(&String, &StoredDocument)> = docs
            .iter()
            .filter(|(_, doc)| self.text_matches(&words, &doc.body) && node_matches(&request.filter, &doc.body))
            .collect();

        match &request.sort {
            Some(sort) => sort_hits(&mut hits, sort),
            None => hits.sort_by_key(|(_, doc)| doc.seq),
        }

        let total = hits.len();
        let items = hits
            .into_iter()
            .skip(request.skip)
            .take(request.take)
            .map(|(id, _)| id.clone())
            .collect();
        let num_pages = if request.take == 0 { 0 } else { total.div_ceil(request.take) };

        Ok(SearchHits { items, max_items: total as u64, num_pages: num_pages as u64 })
    }
}

fn shuffle_key(seed: &str, id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(b":");
    hasher.update(id.as_bytes());
    hex::encode(hasher.finalize())
}

fn sort_hits(hits: &mut [(&String, &StoredDocument)], sort: &SortSpec) {
    match &sort.value_type {
        SortValueType::Shuffle(seed) => {
            hits.sort_by_cached_key(|(id, _)| shuffle_key(seed, id));
        }
        SortValueType::Number => hits.sort_by(|(_, a), (_, b)| {
            let av = a.body.get(&sort.by).and_then(Value::as_f64);
            let bv = b.body.get(&sort.by).and_then(Value::as_f64);
            directed(av, bv, sort.ascending, |x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal))
                .then(a.seq.cmp(&b.seq))
        }),
        SortValueType::String => hits.sort_by(|(_, a), (_, b)| {
            let av = a.body.get(&sort.by).and_then(Value::as_str);
            let bv = b.body.get(&sort.by).and_then(Value::as_str);
            directed(av, bv, sort.ascending, |x, y| x.cmp(y)).then(a.seq.cmp(&b.seq))
        }),
    }
}

/// Present values first in either direction, then by `cmp` in the requested direction
fn directed<T>(a: Option<T>, b: Option<T>, ascending: bool, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = cmp(&x, &y);
            if ascending { ord } else { ord.reverse() }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn node_matches(node: &FilterNode, body: &Value) -> bool {
    match node {
        FilterNode::Grouping(group) => match group.op {
            GroupOp::And => group.children.iter().all(|child| node_matches(child, body)),
            GroupOp::Or => group.children.iter().any(|child| node_matches(child, body)),
        },
        FilterNode::Leaf(leaf) => {
            let value = body.get(&leaf.field).unwrap_or(&Value::Null);
            match value {
                Value::Array(items) => {
                    let contains = items
                        .iter()
                        .any(|item| compare(item, &leaf.value) == Some(Ordering::Equal));
                    match leaf.operator {
                        FilterOperator::Eq => contains,
                        FilterOperator::Ne => !contains,
                        op => items.iter().any(|item| apply(op, compare(item, &leaf.value))),
                    }
                }
                scalar => apply(leaf.operator, compare(scalar, &leaf.value)),
            }
        }
    }
}

fn compare(value: &Value, target: &FilterValue) -> Option<Ordering> {
    match (value, target) {
        (Value::Bool(a), FilterValue::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), FilterValue::Number(b)) => a.as_f64()?.partial_cmp(b),
        (Value::String(a), FilterValue::Text(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}

fn apply(op: FilterOperator, ord: Option<Ordering>) -> bool {
    match op {
        FilterOperator::Eq => ord == Some(Ordering::Equal),
        FilterOperator::Ne => ord != Some(Ordering::Equal),
        FilterOperator::Gt => ord == Some(Ordering::Greater),
        FilterOperator::Gte => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        FilterOperator::Lt => ord == Some(Ordering::Less),
        FilterOperator::Lte => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, body: Value) -> IndexedDocument {
        IndexedDocument { id: id.to_string(), body }
    }

    fn request(query: &str, filter: FilterNode, sort: Option<SortSpec>) -> SearchRequest {
        SearchRequest { query: query.to_string(), skip: 0, take: 24, filter, sort }
    }

    async fn seeded() -> InMemoryIndex {
        let index = InMemoryIndex::new("scenes", vec!["name".into(), "labelNames".into()]);
        index
            .index(vec![
                doc("a", json!({"name": "Beach day", "rating": 5, "favorite": true, "labels": ["la_1"], "labelNames": ["outdoor"], "bookmark": null})),
                doc("b", json!({"name": "City night", "rating": 2, "favorite": false, "labels": ["la_2"], "labelNames": ["urban"], "bookmark": 1700})),
                doc("c", json!({"name": "Forest", "rating": 4, "favorite": true, "labels": ["la_1", "la_2"], "labelNames": ["outdoor", "urban"], "bookmark": null})),
            ])
            .await
            .unwrap();
        index
    }

    fn ids(hits: &SearchHits) -> Vec<&str> {
        hits.items.iter().map(String::as_str).collect()
    }

    #[tokio::test]
    async fn test_match_all_in_insert_order() {
        let index = seeded().await;
        let hits = index.search(&request("", FilterNode::match_all(), None)).await.unwrap();
        assert_eq!(ids(&hits), vec!["a", "b", "c"]);
        assert_eq!(hits.max_items, 3);
        assert_eq!(hits.num_pages, 1);
    }

    #[tokio::test]
    async fn test_text_matches_declared_fields() {
        let index = seeded().await;
        let hits = index.search(&request("OUTDOOR", FilterNode::match_all(), None)).await.unwrap();
        assert_eq!(ids(&hits), vec!["a", "c"]);

        // rating is not a declared field
        let hits = index.search(&request("5", FilterNode::match_all(), None)).await.unwrap();
        assert!(hits.items.is_empty());
    }

    #[tokio::test]
    async fn test_filter_tree_evaluation() {
        let index = seeded().await;
        let filter = FilterNode::and(vec![
            FilterNode::eq("favorite", FilterValue::Bool(true)),
            FilterNode::ne("labels", FilterValue::Text("la_2".into())),
        ]);
        let hits = index.search(&request("", filter, None)).await.unwrap();
        assert_eq!(ids(&hits), vec!["a"]);

        let bookmarked = FilterNode::and(vec![FilterNode::leaf("bookmark", FilterOperator::Gt, FilterValue::Number(0.0))]);
        let hits = index.search(&request("", bookmarked, None)).await.unwrap();
        assert_eq!(ids(&hits), vec!["b"]);
    }

    #[tokio::test]
    async fn test_numeric_and_string_sort() {
        let index = seeded().await;
        let by_rating = SortSpec { by: "rating".into(), ascending: false, value_type: SortValueType::Number };
        let hits = index.search(&request("", FilterNode::match_all(), Some(by_rating))).await.unwrap();
        assert_eq!(ids(&hits), vec!["a", "c", "b"]);

        let by_name = SortSpec { by: "name".into(), ascending: true, value_type: SortValueType::String };
        let hits = index.search(&request("", FilterNode::match_all(), Some(by_name))).await.unwrap();
        assert_eq!(ids(&hits), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_nulls_sort_last_both_directions() {
        let index = seeded().await;
        for ascending in [true, false] {
            let sort = SortSpec { by: "bookmark".into(), ascending, value_type: SortValueType::Number };
            let hits = index.search(&request("", FilterNode::match_all(), Some(sort))).await.unwrap();
            assert_eq!(hits.items[0], "b");
        }
    }

    #[tokio::test]
    async fn test_shuffle_is_seed_deterministic() {
        let index = seeded().await;
        let req = request("", FilterNode::match_all(), Some(SortSpec::shuffle("abc")));
        let first = index.search(&req).await.unwrap();
        let second = index.search(&req).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.items.len(), 3);
    }

    #[tokio::test]
    async fn test_pagination() {
        let index = seeded().await;
        let req = SearchRequest { skip: 2, take: 2, ..request("", FilterNode::match_all(), None) };
        let hits = index.search(&req).await.unwrap();
        assert_eq!(ids(&hits), vec!["c"]);
        assert_eq!(hits.max_items, 3);
        assert_eq!(hits.num_pages, 2);
    }

    #[tokio::test]
    async fn test_update_replaces_body_keeps_position() {
        let index = seeded().await;
        index
            .update(vec![doc("a", json!({"name": "Renamed", "rating": 1}))])
            .await
            .unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.document("a").unwrap()["name"], "Renamed");

        let hits = index.search(&request("", FilterNode::match_all(), None)).await.unwrap();
        assert_eq!(ids(&hits), vec!["a", "b", "c"]);
        assert_eq!(index.update_calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let index = seeded().await;
        index.fail_index_on_call(2);
        assert!(index.index(vec![doc("d", json!({}))]).await.is_err());
        assert_eq!(index.index_calls(), vec![3, 1]);
        assert!(index.document("d").is_none());

        index.set_fail_searches(true);
        assert!(index.search(&request("", FilterNode::match_all(), None)).await.is_err());
    }

    #[tokio::test]
    async fn test_client_registers_indexes() {
        let client = InMemoryIndexClient::new();
        let handle = client.create_index("markers", &["name".to_string()]).await.unwrap();
        assert_eq!(handle.name(), "markers");
        assert_eq!(client.get("markers").unwrap().fields(), &["name".to_string()]);

        client.set_fail_create(true);
        assert!(client.create_index("other", &[]).await.is_err());
    }
}
