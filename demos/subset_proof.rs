//! Example of proving part of a committed batch
//!
//! This example demonstrates:
//! - Building a tree from raw leaves
//! - Proving a subset of the leaves
//! - Shipping the proof as bytes and verifying it on the other side

use merkle_multiproof::{KeccakTree, MultiProof};
use sha3::Keccak256;

fn main() {
    // Create a tree over 7 leaves, given in any order
    let tree = KeccakTree::from_leaves((1..=7u8).rev().map(|i| [i; 32])).unwrap();
    println!("{}", tree);

    // Prove leaves 2 and 6 only
    let proof = tree.multi_proof(&[[2; 32], [6; 32]]).unwrap();
    println!("Proof hashes: {}", proof.proof().len());
    println!("Proof flags: {:?}", proof.flags());

    // Encode the proof and decode it again
    let encoded = proof.encode();
    println!("Encoded proof: {}", hex::encode(&encoded));
    let decoded = MultiProof::<32, Keccak256>::decode(&encoded).unwrap();

    // The verifier knows the leaf count, the positions and the root
    let proven = [(1, [2; 32]), (5, [6; 32])];
    match decoded.verify_subset(tree.leaf_count(), &proven, &tree.root()) {
        Ok(()) => println!("Subset proof is valid"),
        Err(e) => println!("Subset proof is invalid: {}", e),
    }

    // A leaf at the wrong position fails
    let misplaced = [(1, [6; 32]), (5, [2; 32])];
    if let Err(e) = decoded.verify_subset(tree.leaf_count(), &misplaced, &tree.root()) {
        println!("Misplaced leaves rejected: {}", e);
    }
}
