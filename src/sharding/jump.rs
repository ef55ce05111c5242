//! Jump consistent hash (Lamping & Veach).
//!
//! Growing the bucket count from `n` to `n + 1` moves only `1 / (n + 1)` of the keys,
//! which makes it a mapping-free alternative for datasets resharded by appending shards.

/// Bucket in `[0, buckets)` for `key`. `buckets` must be at least 1.
pub fn jump_consistent_hash(mut key: u64, buckets: u32) -> u32 {
    debug_assert!(buckets > 0);
    let mut b: i64 = -1;
    let mut j: i64 = 0;
    while j < i64::from(buckets) {
        b = j;
        key = key.wrapping_mul(2862933555777941757).wrapping_add(1);
        j = ((b + 1) as f64 * ((1i64 << 31) as f64 / ((key >> 33) + 1) as f64)) as i64;
    }
    b as u32
}

/// Jump hash of a string key, hashed with seahash first
pub fn jump_str(key: &str, buckets: u32) -> u32 {
    jump_consistent_hash(seahash::hash(key.as_bytes()), buckets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_bucket() {
        for key in 0..100 {
            assert_eq!(jump_consistent_hash(key, 1), 0);
        }
    }

    #[test]
    fn test_in_range_and_stable() {
        for key in 0..1000u64 {
            let bucket = jump_consistent_hash(key, 10);
            assert!(bucket < 10);
            assert_eq!(bucket, jump_consistent_hash(key, 10));
        }
        assert_eq!(jump_str("orders", 8), jump_str("orders", 8));
    }

    #[test]
    fn test_growth_moves_keys_only_to_new_bucket() {
        let mut moved = 0;
        for key in 0..10_000u64 {
            let before = jump_consistent_hash(key.wrapping_mul(0x9e3779b97f4a7c15), 10);
            let after = jump_consistent_hash(key.wrapping_mul(0x9e3779b97f4a7c15), 11);
            if before != after {
                assert_eq!(after, 10);
                moved += 1;
            }
        }
        // Expected ~1/11 of the keys
        assert!(moved > 500 && moved < 1400, "moved {}", moved);
    }
}
