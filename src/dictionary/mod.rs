//! External mapping dictionary contract and a reference implementation.
//!
//! The shard resolver only depends on [`MappingLookup`] and [`Dictionary`]. The
//! rest of this module is a file-backed stand-in for the dictionary service: a
//! complex-key hashed dictionary loaded from CSV, a named registry with reload
//! semantics, and a background worker that refreshes it.

mod complex_key;
mod registry;
mod source;
mod worker;

use std::sync::Arc;

use serde::Serialize;

use crate::error::DictionaryResult;
use crate::sharding::table::DictionaryKey;

pub use complex_key::ComplexKeyHashedDictionary;
pub use registry::{DictionaryRegistry, DictionaryStatus};
pub use source::{CsvMappingSource, DictionarySource};
pub use worker::ReloadWorker;

/// Storage layout of a dictionary.
///
/// Only [`DictionaryLayout::ComplexKeyHashed`] can answer composite-key lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DictionaryLayout {
    Flat,
    Hashed,
    ComplexKeyHashed,
}

/// A loaded dictionary: a keyed table of string attributes
pub trait Dictionary: Send + Sync {
    fn name(&self) -> &str;

    fn layout(&self) -> DictionaryLayout;

    /// Value of `attribute` for `key`.
    ///
    /// `Ok(None)` when the key is absent or has no value for that attribute;
    /// an error when the attribute does not exist at all.
    fn get_string(&self, attribute: &str, key: &DictionaryKey) -> DictionaryResult<Option<String>>;
}

/// Access to named dictionaries. Must be safe for concurrent readers.
pub trait MappingLookup: Send + Sync {
    fn get_dictionary(&self, name: &str) -> DictionaryResult<Arc<dyn Dictionary>>;
}
