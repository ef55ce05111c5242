//! Routing core
//!
//! Two independent algorithms: hash-range bucket assignment over a tuple of
//! sharding-key values, and version-aware shard resolution through the external
//! partition map.

pub mod boundary;
pub mod bucket;
pub mod hash;
pub mod jump;
pub mod resolver;
pub mod table;

pub use boundary::{BucketBoundaryTable, DEFAULT_BUCKETS, MAX_BUCKETS};
pub use bucket::BucketResolver;
pub use resolver::{ShardResolver, DEFAULT_DICTIONARY};
pub use table::{DictionaryKey, MappingVersion, RoutingKey, ShardId};
