//! Hash-range bucket assignment for a tuple of sharding-key values.

use std::sync::Arc;

use super::boundary::BucketBoundaryTable;
use super::hash;
use crate::scalar::{DataType, ScalarValue};

/// Maps an ordered tuple of scalars to a bucket id in `[1, B]`.
///
/// Pure: the result depends only on the values, their order and the boundary table.
#[derive(Debug, Clone)]
pub struct BucketResolver {
    table: Arc<BucketBoundaryTable>,
}

impl BucketResolver {
    /// Resolver over the default 16-bucket table
    pub fn new() -> Self {
        Self::with_table(Arc::new(BucketBoundaryTable::default()))
    }

    pub fn with_table(table: Arc<BucketBoundaryTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<BucketBoundaryTable> {
        &self.table
    }

    /// Combined hash of `values`, folded in argument order from a zero seed
    pub fn resolve_hash<'a, I>(&self, values: I) -> u64
    where
        I: IntoIterator<Item = &'a ScalarValue>,
    {
        values.into_iter().fold(0, fold_value)
    }

    /// Bucket id of `values`
    pub fn resolve<'a, I>(&self, values: I) -> u32
    where
        I: IntoIterator<Item = &'a ScalarValue>,
    {
        let combined = self.resolve_hash(values);
        let bucket = self.table.bucket_of(combined);
        tracing::debug!(hash = combined, bucket, "Resolved hash range bucket");
        bucket
    }
}

impl Default for BucketResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether values of `data_type` contribute to the bucket hash
pub fn is_hashable(data_type: &DataType) -> bool {
    match data_type {
        DataType::UInt8 | DataType::Int8 | DataType::Int64 | DataType::String => true,
        DataType::UInt32 | DataType::UInt64 | DataType::Other(_) => false,
    }
}

fn fold_value(seed: u64, value: &ScalarValue) -> u64 {
    match value {
        ScalarValue::UInt8(v) => hash::combine(seed, hash::hash_u8(*v)),
        ScalarValue::Int8(v) => hash::combine(seed, hash::hash_i8(*v)),
        ScalarValue::Int64(v) => hash::combine(seed, hash::hash_i64(*v)),
        ScalarValue::String(s) => hash::combine(seed, hash::hash_bytes(s.as_bytes())),
        ScalarValue::UInt32(_) | ScalarValue::UInt64(_) | ScalarValue::Unsupported(_) => {
            tracing::trace!(data_type = %value.data_type(), "Skipping value not part of the bucket hash");
            seed
        }
    }
}
