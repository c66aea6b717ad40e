//! Provides the SHA-256 hash function used throughout the consensus core,
//! together with a precomputed table of "zero hashes" (the roots of
//! all-zero subtrees at each height) and a process-wide invocation counter.
//!
//! SHA-256 is the pairwise hash for every Merkle tree in this project. The
//! counter exists so that tests of the incremental hasher can assert hash
//! budgets, and so the metrics layer can expose an aggregate count.

use lazy_static::lazy_static;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

pub const HASH_LEN: usize = 32;

static HASH_COUNT: AtomicU64 = AtomicU64::new(0);

/// Returns the number of hash invocations performed by this process so far.
///
/// Monotonic; only ever incremented. Intended for tests and metrics, not for
/// control flow.
pub fn hash_count() -> u64 {
    HASH_COUNT.load(Ordering::Relaxed)
}

#[inline]
fn count_one() {
    HASH_COUNT.fetch_add(1, Ordering::Relaxed);
}

/// Returns the digest of `input` as a vector.
pub fn hash(input: &[u8]) -> Vec<u8> {
    hash_fixed(input).to_vec()
}

/// Returns the digest of `input` as a fixed-size array.
pub fn hash_fixed(input: &[u8]) -> [u8; HASH_LEN] {
    count_one();
    let mut output = [0; HASH_LEN];
    output[..].copy_from_slice(&Sha256::digest(input));
    output
}

/// Compute the hash of two slices concatenated.
///
/// The overwhelmingly common case: hashing a pair of 32-byte tree nodes.
pub fn hash32_concat(h1: &[u8], h2: &[u8]) -> [u8; HASH_LEN] {
    count_one();
    let mut hasher = Sha256::new();
    hasher.update(h1);
    hasher.update(h2);

    let mut output = [0; HASH_LEN];
    output[..].copy_from_slice(&hasher.finalize());
    output
}

/// The max index that can be used with `ZERO_HASHES`.
pub const ZERO_HASHES_MAX_INDEX: usize = 48;

lazy_static! {
    /// Cached zero hashes where `ZERO_HASHES[i]` is the hash of a Merkle tree
    /// of height `i` whose leaves are all `[0; 32]`.
    pub static ref ZERO_HASHES: Vec<Vec<u8>> = {
        let mut hashes = vec![vec![0; HASH_LEN]; ZERO_HASHES_MAX_INDEX + 1];

        for i in 0..ZERO_HASHES_MAX_INDEX {
            hashes[i + 1] = hash32_concat(&hashes[i], &hashes[i])[..].to_vec();
        }

        hashes
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hashing() {
        let input: Vec<u8> = b"hello world".as_ref().into();
        let expected_hex = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        let expected: Vec<u8> = hex::decode(expected_hex).unwrap();
        assert_eq!(expected, hash(&input));
    }

    #[test]
    fn zero_hash_first_is_zero() {
        assert_eq!(ZERO_HASHES[0], vec![0; HASH_LEN]);
        assert_eq!(
            ZERO_HASHES[1],
            hash32_concat(&[0; HASH_LEN], &[0; HASH_LEN]).to_vec()
        );
    }

    #[test]
    fn counter_increments() {
        let before = hash_count();
        hash(&[0; 32]);
        hash32_concat(&[0; 32], &[1; 32]);
        assert!(hash_count() >= before + 2);
    }
}
