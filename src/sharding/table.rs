use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a physical shard
pub type ShardId = u32;

/// Default dictionary attribute consulted when no active version is set
pub const DEFAULT_VERSION: &str = "A";

/// Names one generation of the table→shard mapping.
///
/// During a reshard the old and new generations live side by side as different
/// attributes of the same mapping dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingVersion(String);

impl MappingVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MappingVersion {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION)
    }
}

impl fmt::Display for MappingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MappingVersion {
    fn from(version: &str) -> Self {
        Self::new(version)
    }
}

/// Composite routing key of one record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoutingKey {
    pub table: String,
    /// Day-granularity partition key, e.g. `20230101`
    pub date: u32,
    /// Hash-range bucket id
    pub range_id: u32,
}

impl RoutingKey {
    pub fn new(table: impl Into<String>, date: u32, range_id: u32) -> Self {
        Self {
            table: table.into(),
            date,
            range_id,
        }
    }

    /// Key shape stored in the mapping dictionary: the date is kept as text.
    pub fn dictionary_key(&self) -> DictionaryKey {
        DictionaryKey {
            table: self.table.clone(),
            date: self.date.to_string(),
            range_id: self.range_id,
        }
    }
}

/// `(table, date, range_id)` as stored by the mapping dictionary
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DictionaryKey {
    pub table: String,
    pub date: String,
    pub range_id: u32,
}

impl DictionaryKey {
    pub fn new(table: impl Into<String>, date: impl Into<String>, range_id: u32) -> Self {
        Self {
            table: table.into(),
            date: date.into(),
            range_id,
        }
    }
}

impl fmt::Display for DictionaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.table, self.date, self.range_id)
    }
}
