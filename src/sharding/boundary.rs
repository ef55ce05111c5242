//! Sorted bucket boundaries over the 64-bit hash space.

use serde::Serialize;

use crate::error::ConfigError;

/// Number of hash-range buckets the partition mappings are keyed by
pub const DEFAULT_BUCKETS: u32 = 16;

/// Upper limit on the bucket count; the table holds one `u64` per bucket.
pub const MAX_BUCKETS: u32 = 1 << 16;

/// Immutable, strictly increasing upper bounds of the hash buckets.
///
/// Bucket `i` (0-based) covers `(boundaries[i-1], boundaries[i]]`, bucket 0 starts at 0
/// and the last boundary is always `u64::MAX`, so every hash falls in exactly one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketBoundaryTable {
    boundaries: Vec<u64>,
}

impl BucketBoundaryTable {
    /// Split the hash space into `buckets` near-equal ranges.
    ///
    /// With 16 buckets every range holds exactly 2^60 hash values.
    pub fn new(buckets: u32) -> Result<Self, ConfigError> {
        if buckets == 0 {
            return Err(ConfigError::Invalid(
                "bucket count must be at least 1".to_string(),
            ));
        }
        if buckets > MAX_BUCKETS {
            return Err(ConfigError::Invalid(format!(
                "bucket count must be at most {}, got {}",
                MAX_BUCKETS, buckets
            )));
        }

        Ok(Self {
            boundaries: evenly_split(u64::from(buckets)),
        })
    }

    /// Build a table from explicit boundaries, checking the table invariants.
    pub fn from_boundaries(boundaries: Vec<u64>) -> Result<Self, ConfigError> {
        if boundaries.last() != Some(&u64::MAX) {
            return Err(ConfigError::Invalid(
                "last bucket boundary must be u64::MAX".to_string(),
            ));
        }
        if let Some(pos) = boundaries.windows(2).position(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid(format!(
                "bucket boundaries not strictly increasing at position {}",
                pos + 1
            )));
        }
        Ok(Self { boundaries })
    }

    /// 1-based id of the bucket containing `hash`
    #[inline]
    pub fn bucket_of(&self, hash: u64) -> u32 {
        // Last boundary is u64::MAX, so the partition point is always in range.
        let idx = self.boundaries.partition_point(|b| *b < hash);
        idx as u32 + 1
    }

    /// Inclusive hash range `(start, end)` of a 1-based bucket id
    pub fn range_of(&self, bucket: u32) -> Option<(u64, u64)> {
        let idx = usize::try_from(bucket).ok()?.checked_sub(1)?;
        let end = *self.boundaries.get(idx)?;
        let start = match idx {
            0 => 0,
            _ => self.boundaries[idx - 1] + 1,
        };
        Some((start, end))
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn boundaries(&self) -> &[u64] {
        &self.boundaries
    }
}

impl Default for BucketBoundaryTable {
    fn default() -> Self {
        Self {
            boundaries: evenly_split(u64::from(DEFAULT_BUCKETS)),
        }
    }
}

fn evenly_split(n: u64) -> Vec<u64> {
    let unit = (u64::MAX - (n - 1)) / n;
    let mut boundaries: Vec<u64> = (0..n - 1).map(|i| unit * (i + 1) + i).collect();
    boundaries.push(u64::MAX);
    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_layout() {
        let table = BucketBoundaryTable::default();
        assert_eq!(table.len(), 16);
        assert_eq!(table.boundaries()[0], (1u64 << 60) - 1);
        assert_eq!(table.boundaries()[1], (1u64 << 61) - 1);
        assert_eq!(table.boundaries()[15], u64::MAX);
        assert_eq!(table, BucketBoundaryTable::new(DEFAULT_BUCKETS).unwrap());
    }

    #[test]
    fn test_boundaries_strictly_increasing() {
        for buckets in [1, 2, 3, 7, 16, 100, 1024] {
            let table = BucketBoundaryTable::new(buckets).unwrap();
            assert_eq!(table.len(), buckets as usize);
            assert!(table.boundaries().windows(2).all(|w| w[0] < w[1]));
            assert_eq!(*table.boundaries().last().unwrap(), u64::MAX);
        }
    }

    #[test]
    fn test_equal_ranges_of_two_pow_sixty() {
        let table = BucketBoundaryTable::default();
        for bucket in 1..=16 {
            let (start, end) = table.range_of(bucket).unwrap();
            assert_eq!(end - start, (1u64 << 60) - 1);
        }
        assert_eq!(table.range_of(0), None);
        assert_eq!(table.range_of(17), None);
    }

    #[test]
    fn test_bucket_edges() {
        let table = BucketBoundaryTable::default();
        assert_eq!(table.bucket_of(0), 1);
        assert_eq!(table.bucket_of((1u64 << 60) - 1), 1);
        assert_eq!(table.bucket_of(1u64 << 60), 2);
        assert_eq!(table.bucket_of(u64::MAX), 16);
        assert_eq!(table.bucket_of(u64::MAX - (1u64 << 60)), 15);
    }

    #[test]
    fn test_ranges_cover_hash_space_without_gaps() {
        let table = BucketBoundaryTable::new(5).unwrap();
        let mut next = 0u64;
        for bucket in 1..=5 {
            let (start, end) = table.range_of(bucket).unwrap();
            assert_eq!(start, next);
            assert_eq!(table.bucket_of(start), bucket);
            assert_eq!(table.bucket_of(end), bucket);
            next = end.wrapping_add(1);
        }
        assert_eq!(next, 0);
    }

    #[test]
    fn test_invalid_tables() {
        assert!(BucketBoundaryTable::new(0).is_err());
        assert!(BucketBoundaryTable::new(MAX_BUCKETS + 1).is_err());
        assert!(BucketBoundaryTable::new(4_000_000_000).is_err());
        assert_eq!(BucketBoundaryTable::new(MAX_BUCKETS).unwrap().len(), MAX_BUCKETS as usize);
        assert!(BucketBoundaryTable::from_boundaries(vec![]).is_err());
        assert!(BucketBoundaryTable::from_boundaries(vec![10, 5, u64::MAX]).is_err());
        assert!(BucketBoundaryTable::from_boundaries(vec![10, u64::MAX]).is_ok());
    }
}
