//! Scalar hash finalizers and the combiners used by every container kind.
//!
//! Containers combine element hashes with the array-style combiner
//! `h = (h << 5) - h + elem`, and the 64-bit seeded variants interleave a
//! 32-bit rotation between merges so that the two halves of the word mix.

/// 32-bit avalanche finalizer (Murmur3 style).
pub fn hash_u32(mut v: u32) -> u32 {
    v ^= v >> 16;
    v = v.wrapping_mul(0x85eb_ca6b);
    v ^= v >> 13;
    v = v.wrapping_mul(0xc2b2_ae35);
    v ^= v >> 16;
    v
}

/// 64-bit avalanche finalizer.
pub fn hash_u64(mut v: u64) -> u64 {
    v ^= v >> 33;
    v = v.wrapping_mul(0xff51_afd7_ed55_8ccd);
    v ^= v >> 33;
    v = v.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    v ^= v >> 33;
    v
}

/// Seeded 64-bit hash of a 64-bit word.
pub fn hash_u64_extended(v: u64, seed: u64) -> u64 {
    hash_u64(v ^ seed.wrapping_mul(0x9e37_79b9_7f4a_7c15))
}

/// 32-bit hash of a byte string (FNV-1a accumulation, finalized).
pub fn hash_bytes(bytes: &[u8]) -> u32 {
    let mut h: u32 = 0x811c_9dc5;
    for &b in bytes {
        h ^= b as u32;
        h = h.wrapping_mul(0x0100_0193);
    }
    hash_u32(h)
}

/// Seeded 64-bit hash of a byte string.
pub fn hash_bytes_extended(bytes: &[u8], seed: u64) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash_u64_extended(h, seed)
}

/// Array-style combiner: `h = (h << 5) - h + elem`.
pub fn combine(h: u32, elem: u32) -> u32 {
    (h << 5).wrapping_sub(h).wrapping_add(elem)
}

/// 64-bit array-style combiner.
pub fn combine_extended(h: u64, elem: u64) -> u64 {
    (h << 5).wrapping_sub(h).wrapping_add(elem)
}

/// Swap the high and low 32 bits of a 64-bit hash.
pub fn rotate_high_and_low(v: u64) -> u64 {
    v.rotate_left(32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalizers_are_deterministic() {
        assert_eq!(hash_u32(42), hash_u32(42));
        assert_eq!(hash_u64(42), hash_u64(42));
        assert_ne!(hash_u32(42), hash_u32(43));
    }

    #[test]
    fn seeded_hash_depends_on_seed() {
        assert_ne!(hash_u64_extended(7, 1), hash_u64_extended(7, 2));
        assert_ne!(hash_bytes_extended(b"abc", 1), hash_bytes_extended(b"abc", 2));
    }

    #[test]
    fn combiner_matches_shift_form() {
        let h = 123_u32;
        assert_eq!(combine(h, 9), h.wrapping_mul(31).wrapping_add(9));
    }

    #[test]
    fn rotation_swaps_halves() {
        assert_eq!(rotate_high_and_low(0x0000_0001_0000_0002), 0x0000_0002_0000_0001);
    }
}
