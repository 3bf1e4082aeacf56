// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Source-of-truth contracts consumed by the search layer.
//!
//! The real entity store lives elsewhere; these traits are the narrow
//! get / get_bulk / get_all / upsert / remove surface the search pipeline
//! depends on. In-memory implementations back the tests and embedded use.

pub mod catalog;
pub mod memory;
pub mod traits;

pub use catalog::{Catalog, InMemoryCatalog};
pub use memory::{InMemoryRelations, InMemoryStore, InMemoryViews};
pub use traits::{EntityStore, RelationKind, RelationStore, StorageError, ViewCounter};
