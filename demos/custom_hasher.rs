//! Example of implementing a custom hasher for the tree
//!
//! This example demonstrates:
//! - Creating a custom hasher implementation
//! - Using it with the tree
//! - Comparing roots with the default keccak256 hasher

use merkle_multiproof::{commit, Hasher, KeccakCommitment};
use sha2::{Digest, Sha256};

// Custom hasher that uses SHA256 but adds a prefix to the input
#[derive(Clone)]
struct PrefixedSha256;

impl Hasher<32> for PrefixedSha256 {
    fn hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        // Add a custom prefix to the input
        hasher.update(b"custom_prefix:");
        hasher.update(data);
        hasher.finalize().into()
    }
}

fn main() {
    let leaves = [[1; 32], [2; 32], [3; 32]];

    // Commit with our custom hasher
    let prefixed = commit::<32, PrefixedSha256>(leaves).unwrap();
    println!("Root hash with custom hasher: {}", prefixed.hex_root());

    // Compare with the default keccak256
    let standard: KeccakCommitment = commit(leaves).unwrap();
    println!("Root hash with keccak256: {}", standard.hex_root());

    // Note that the hashes are different due to our custom prefix
    println!("\nThe hashes are different because our custom hasher adds a prefix to the input.");
}
