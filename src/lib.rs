//! Sorted-pair Merkle commitments with multi-proofs
//!
//! This crate commits a batch of 32-byte records to a single root and derives a compact
//! multi-proof that lets a verifier, given only the root, check that the whole claimed set was
//! committed in one pass. It follows the conventions of the widely used on-chain multi-proof
//! verifiers:
//! - Leaves are sorted ascending and must be unique
//! - Internal nodes hash their children in ascending order, so proofs carry no position bits
//! - An unpaired trailing node is carried up unchanged
//! - Any hash function can be plugged in through the `Hasher` trait (keccak256 by default)

mod commitment;
mod error;
mod hasher;
mod leaf_set;
mod proof;
mod tree;

pub use commitment::{commit, commit_payloads, commit_records, Commitment, KeccakCommitment};
pub use error::{CommitmentError, InvalidProofReason};
pub use hasher::{hash_leaf, hash_sorted_pair, Hasher};
pub use leaf_set::LeafSet;
pub use proof::MultiProof;
#[cfg(feature = "multi-thread")]
pub use tree::PARALLEL_THRESHOLD;
pub use tree::MerkleTree;

/// Tree over the default 32-byte keccak256 hasher.
pub type KeccakTree = MerkleTree<32, sha3::Keccak256>;

#[cfg(test)]
mod tests;
