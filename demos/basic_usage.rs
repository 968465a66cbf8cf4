//! Basic example of committing a batch of records
//!
//! This example demonstrates:
//! - Reducing records to leaves
//! - Committing them to a single root
//! - Getting the records back in submission order
//! - Verifying the multi-proof the way an on-chain verifier would

use merkle_multiproof::{commit_records, hash_leaf, KeccakCommitment};
use sha3::Keccak256;
use tracing_subscriber::EnvFilter;

/// A trading pair to register.
struct Pair {
    source_chain: u64,
    dest_chain: u64,
    source_token: [u8; 20],
    dest_token: [u8; 20],
}

impl Pair {
    /// Fixed-width encoding of the pair, hashed into its leaf.
    fn id(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(56);
        encoded.extend_from_slice(&self.source_chain.to_be_bytes());
        encoded.extend_from_slice(&self.dest_chain.to_be_bytes());
        encoded.extend_from_slice(&self.source_token);
        encoded.extend_from_slice(&self.dest_token);
        hash_leaf::<32, Keccak256>(&encoded)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let pairs = vec![
        Pair {
            source_chain: 5,
            dest_chain: 420,
            source_token: [0xaa; 20],
            dest_token: [0xbb; 20],
        },
        Pair {
            source_chain: 420,
            dest_chain: 5,
            source_token: [0xbb; 20],
            dest_token: [0xaa; 20],
        },
        Pair {
            source_chain: 5,
            dest_chain: 280,
            source_token: [0xaa; 20],
            dest_token: [0xcc; 20],
        },
    ];

    // Commit and get the pairs back in the order the leaves were sorted
    let (commitment, ordered): (KeccakCommitment, Vec<Pair>) =
        commit_records(pairs, Pair::id).unwrap();

    println!("Root: {}", commitment.hex_root());
    for (pair, leaf) in ordered.iter().zip(commitment.sorted_leaves()) {
        println!(
            "  {} -> {}  leaf 0x{}",
            pair.source_chain,
            pair.dest_chain,
            hex::encode(leaf)
        );
    }
    println!("Proof hashes: {}", commitment.proof().len());
    println!("Proof flags: {:?}", commitment.flags());

    // Verify the proof against the root
    match commitment.verify() {
        Ok(()) => println!("Multi-proof is valid"),
        Err(e) => println!("Multi-proof is invalid: {}", e),
    }
}
