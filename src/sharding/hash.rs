//! Stable, order-sensitive hash combination.
//!
//! Bit-compatible with boost's 64-bit `hash_combine` / `hash_range`, which is what
//! the existing partition mappings were computed with. Integers hash to their
//! sign-extended bit pattern; strings hash as a `hash_range` over their bytes
//! taken as signed chars.

const MUL: u64 = 0xc6a4a7935bd1e995;
const SHIFT: u32 = 47;
// Keeps a chain of zero hashes away from zero.
const OFFSET: u64 = 0xe654_6b64;

/// Mix `value` into `seed`.
#[inline]
pub fn combine(seed: u64, value: u64) -> u64 {
    let mut k = value.wrapping_mul(MUL);
    k ^= k >> SHIFT;
    k = k.wrapping_mul(MUL);

    let mut h = seed ^ k;
    h = h.wrapping_mul(MUL);
    h.wrapping_add(OFFSET)
}

#[inline]
pub fn hash_u8(value: u8) -> u64 {
    u64::from(value)
}

#[inline]
pub fn hash_i8(value: i8) -> u64 {
    i64::from(value) as u64
}

#[inline]
pub fn hash_i64(value: i64) -> u64 {
    value as u64
}

/// Content hash of a byte string
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0, |seed, b| combine(seed, hash_i8(*b as i8)))
}
