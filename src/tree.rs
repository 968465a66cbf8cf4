//! Sorted-pair Merkle tree over a canonical [`LeafSet`].
//!
//! Level 0 holds the leaves. Each following level hashes neighbours pairwise with
//! [`hash_sorted_pair`]; a trailing unpaired node is carried up unchanged, never hashed with
//! itself.
//! The last level holds the root alone.

use std::fmt::Display;

use tracing::{debug, instrument};

use crate::hasher::{hash_sorted_pair, Hasher};
use crate::{CommitmentError, LeafSet, MultiProof};

/// Levels shorter than this are always hashed on the calling thread.
#[cfg(feature = "multi-thread")]
pub const PARALLEL_THRESHOLD: usize = 1 << 12;

/// Static Merkle tree. Nodes are addressed by `(level, index)`; built once, read-only afterwards.
///
/// * `HASH_SIZE` - size of the hash digest in bytes.
/// * `H` - Hasher that will be used to hash nodes.
pub struct MerkleTree<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> {
    leaf_set: LeafSet<HASH_SIZE, H>,
    /// `upper_levels[k]` is tree level `k + 1`; the last entry is `[root]`. The leaves live in
    /// `leaf_set` only.
    upper_levels: Vec<Vec<[u8; HASH_SIZE]>>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> MerkleTree<HASH_SIZE, H> {
    /// Builds every level of the tree.
    #[instrument(skip_all, fields(leaves = leaf_set.len()))]
    pub fn new(leaf_set: LeafSet<HASH_SIZE, H>) -> Self {
        let mut upper_levels: Vec<Vec<[u8; HASH_SIZE]>> = Vec::new();
        loop {
            let current = upper_levels
                .last()
                .map(Vec::as_slice)
                .unwrap_or_else(|| leaf_set.leaves());
            if current.len() <= 1 {
                break;
            }
            // each level is fully materialized before the next one starts
            let next = next_level::<HASH_SIZE, H>(current);
            upper_levels.push(next);
        }
        let tree = Self {
            leaf_set,
            upper_levels,
        };
        debug!(depth = tree.depth(), root = %hex::encode(tree.root()), "built merkle tree");
        tree
    }

    /// Canonicalizes `leaves` and builds the tree.
    pub fn from_leaves(
        leaves: impl IntoIterator<Item = [u8; HASH_SIZE]>,
    ) -> Result<Self, CommitmentError> {
        Ok(Self::new(LeafSet::new(leaves)?))
    }

    pub fn root(&self) -> [u8; HASH_SIZE] {
        // level 0 is never empty, so the top level always has exactly one node
        self.level(self.depth())[0]
    }

    /// Number of hashing levels above the leaves. A single-leaf tree has depth 0.
    pub fn depth(&self) -> usize {
        self.upper_levels.len()
    }

    /// Nodes of `level`, where 0 is the leaf level.
    ///
    /// # Panics
    ///
    /// Panics if `level > self.depth()`.
    pub fn level(&self, level: usize) -> &[[u8; HASH_SIZE]] {
        match level {
            0 => self.leaf_set.leaves(),
            _ => &self.upper_levels[level - 1],
        }
    }

    /// All levels from the leaves up to the root.
    pub fn levels(&self) -> impl Iterator<Item = &[[u8; HASH_SIZE]]> + '_ {
        (0..=self.depth()).map(|level| self.level(level))
    }

    pub fn leaves(&self) -> &[[u8; HASH_SIZE]] {
        self.leaf_set.leaves()
    }

    pub fn leaf_set(&self) -> &LeafSet<HASH_SIZE, H> {
        &self.leaf_set
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_set.len()
    }

    pub fn leaf_index(&self, leaf: &[u8; HASH_SIZE]) -> Option<usize> {
        self.leaf_set.position(leaf)
    }

    /// Multi-proof for every leaf of the tree.
    pub fn multi_proof_all(&self) -> Result<MultiProof<HASH_SIZE, H>, CommitmentError> {
        let indices: Vec<usize> = (0..self.leaf_count()).collect();
        MultiProof::build(self, &indices)
    }

    /// Multi-proof for the given leaves, looked up by value.
    pub fn multi_proof(
        &self,
        leaves: &[[u8; HASH_SIZE]],
    ) -> Result<MultiProof<HASH_SIZE, H>, CommitmentError> {
        let indices = leaves
            .iter()
            .map(|leaf| {
                self.leaf_index(leaf)
                    .ok_or_else(|| CommitmentError::LeafNotInTree {
                        leaf: hex::encode(leaf),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        MultiProof::build(self, &indices)
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> Display for MerkleTree<HASH_SIZE, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MerkleTree {{ leaves: {}, depth: {}, root: {} }}",
            self.leaf_count(),
            self.depth(),
            hex::encode(self.root())
        )
    }
}

/// Hashes one level into the next. An odd trailing node is carried up as-is.
#[cfg(feature = "multi-thread")]
pub(crate) fn next_level<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>>(
    level: &[[u8; HASH_SIZE]],
) -> Vec<[u8; HASH_SIZE]> {
    use rayon::prelude::*;
    if level.len() >= PARALLEL_THRESHOLD {
        level.par_chunks(2).map(combine::<HASH_SIZE, H>).collect()
    } else {
        level.chunks(2).map(combine::<HASH_SIZE, H>).collect()
    }
}

/// Hashes one level into the next. An odd trailing node is carried up as-is.
#[cfg(not(feature = "multi-thread"))]
pub(crate) fn next_level<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>>(
    level: &[[u8; HASH_SIZE]],
) -> Vec<[u8; HASH_SIZE]> {
    level.chunks(2).map(combine::<HASH_SIZE, H>).collect()
}

fn combine<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>>(
    chunk: &[[u8; HASH_SIZE]],
) -> [u8; HASH_SIZE] {
    match chunk {
        [left, right] => hash_sorted_pair::<HASH_SIZE, H>(left, right),
        [carried] => *carried,
        _ => unreachable!("chunks(2) yields one or two nodes"),
    }
}
