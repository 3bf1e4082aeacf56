// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Fixed-size slice batching for bulk ingestion.
//!
//! The [`SliceBatcher`] collects documents and hands them out in slices of
//! `slice_size`. Each slice remembers which input positions it covers so a
//! failed flush can be reported precisely.
//!
//! # Example
//!
//! ```
//! use catalog_search::batching::{FlushReason, SliceBatcher};
//!
//! let mut batcher = SliceBatcher::new(2);
//! assert!(batcher.push("a").is_none());
//! assert_eq!(batcher.push("b"), Some(FlushReason::Count));
//!
//! let slice = batcher.take_batch(FlushReason::Count).unwrap();
//! assert_eq!(slice.items, vec!["a", "b"]);
//! assert_eq!(slice.range, 0..2);
//!
//! batcher.push("c");
//! let last = batcher.finish().unwrap();
//! assert_eq!(last.range, 2..3);
//! assert_eq!(last.reason, FlushReason::Final);
//! ```

use std::ops::Range;

use tracing::debug;

/// Slice flush trigger reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// Slice reached `slice_size`
    Count,
    /// Trailing partial slice at end of input
    Final,
}

impl std::fmt::Display for FlushReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::Final => write!(f, "final"),
        }
    }
}

/// A slice of items ready for flush
#[derive(Debug)]
pub struct FlushBatch<T> {
    pub items: Vec<T>,
    /// Input positions covered by this slice
    pub range: Range<usize>,
    pub reason: FlushReason,
}

pub struct SliceBatcher<T> {
    slice_size: usize,
    items: Vec<T>,
    /// Input position of `items[0]`
    start: usize,
}

impl<T> SliceBatcher<T> {
    /// A `slice_size` of 0 is treated as 1.
    #[must_use]
    pub fn new(slice_size: usize) -> Self {
        let slice_size = slice_size.max(1);
        Self { slice_size, items: Vec::with_capacity(slice_size.min(8192)), start: 0 }
    }

    /// Add an item, returns `Some(Count)` once the slice is full
    pub fn push(&mut self, item: T) -> Option<FlushReason> {
        self.items.push(item);
        (self.items.len() >= self.slice_size).then_some(FlushReason::Count)
    }

    /// Take whatever is pending
    pub fn take_batch(&mut self, reason: FlushReason) -> Option<FlushBatch<T>> {
        if self.items.is_empty() {
            return None;
        }
        let items = std::mem::take(&mut self.items);
        let range = self.start..self.start + items.len();
        self.start = range.end;
        debug!(count = items.len(), start = range.start, %reason, "Slice taken for flush");
        Some(FlushBatch { items, range, reason })
    }

    /// Take the trailing partial slice, if any
    pub fn finish(&mut self) -> Option<FlushBatch<T>> {
        self.take_batch(FlushReason::Final)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn slice_size(&self) -> usize {
        self.slice_size
    }
}
