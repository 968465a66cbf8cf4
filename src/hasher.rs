//! Hash combinator used at every internal node of the tree.
//!
//! Internal nodes are hashed as `H(min(a, b) || max(a, b))`, comparing the two children as
//! unsigned big-endian integers. Because the combinator does not care about operand order,
//! proofs carry no left/right position bits.

use sha2::Sha256;
use sha3::{Digest, Keccak256};

impl Hasher<32> for Sha256 {
    fn hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hasher.finalize().into()
    }
}

impl Hasher<32> for Keccak256 {
    fn hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        hasher.update(data);
        hasher.finalize().into()
    }
}

/// Simple hash trait required to hash the nodes in the tree
///
/// # Type Parameters
/// * `HASH_SIZE` - The size of the hash digest in bytes
pub trait Hasher<const HASH_SIZE: usize> {
    fn hash(data: &[u8]) -> [u8; HASH_SIZE];
}

/// Hashes two child hashes in ascending byte order.
/// `hash_sorted_pair(a, b) == hash_sorted_pair(b, a)`.
pub fn hash_sorted_pair<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>>(
    a: &[u8; HASH_SIZE],
    b: &[u8; HASH_SIZE],
) -> [u8; HASH_SIZE] {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    H::hash([low.as_slice(), high.as_slice()].concat().as_slice())
}

/// Reduces an already-encoded record to a leaf.
pub fn hash_leaf<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>>(
    payload: &[u8],
) -> [u8; HASH_SIZE] {
    H::hash(payload)
}
