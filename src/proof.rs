//! Multi-proofs prove that a whole set of leaves belongs to a tree in one pass.
//!
//! A multi-proof is a list of sibling hashes plus one flag per internal hash computed while
//! walking the tree bottom-up. A `true` flag takes the second operand from a value already
//! derived in this pass, a `false` flag takes it from the proof list. An unpaired trailing node
//! is carried to the next level without consuming a flag.
//!
//! For any proof built here `proven leaves + proof.len() - 1 == flags.len()`.
//!
//! A multi-proof can be packed into bytes and unpacked again.
use std::marker::PhantomData;

use bitvec::order::Lsb0;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;
use tracing::{debug, error, instrument, trace};

use crate::error::InvalidProofReason;
use crate::hasher::{hash_sorted_pair, Hasher};
use crate::{CommitmentError, MerkleTree};

/// Proof hashes and flags for a set of leaves.
pub struct MultiProof<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> {
    proof: Vec<[u8; HASH_SIZE]>,
    flags: BitVec<u8, Lsb0>,
    _phantom: PhantomData<H>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> MultiProof<HASH_SIZE, H> {
    /// Creates a multi-proof from its parts. Nothing is checked until it is replayed.
    pub fn new(proof: Vec<[u8; HASH_SIZE]>, flags: BitVec<u8, Lsb0>) -> Self {
        Self {
            proof,
            flags,
            _phantom: PhantomData,
        }
    }

    /// Derives the multi-proof for the leaves at `indices` (positions in canonical order).
    ///
    /// The root is re-derived from the proven leaves along the way; if it differs from the tree
    /// root the proof is discarded with [`CommitmentError::InternalInconsistency`].
    #[instrument(skip_all, fields(leaves = tree.leaf_count(), proven = indices.len()))]
    pub fn build(
        tree: &MerkleTree<HASH_SIZE, H>,
        indices: &[usize],
    ) -> Result<Self, CommitmentError> {
        if indices.is_empty() {
            return Err(CommitmentError::EmptyLeafSet);
        }
        let leaves = tree.leaves();
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        if let Some(&index) = sorted.last().filter(|&&index| index >= leaves.len()) {
            return Err(CommitmentError::LeafIndexOutOfBounds {
                index,
                leaf_count: leaves.len(),
            });
        }
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(CommitmentError::DuplicateLeaf {
                leaf: hex::encode(leaves[pair[0]]),
            });
        }

        let mut known: Vec<(usize, [u8; HASH_SIZE])> =
            sorted.into_iter().map(|index| (index, leaves[index])).collect();
        let mut proof = Vec::new();
        let mut flags = BitVec::<u8, Lsb0>::new();

        for level in 0..tree.depth() {
            let nodes = tree.level(level);
            let mut next = Vec::with_capacity(known.len().div_ceil(2));
            let mut i = 0;
            while i < known.len() {
                let (index, value) = known[i];
                let sibling = index ^ 1;
                let parent = if sibling >= nodes.len() {
                    // odd node, carried up without a flag
                    i += 1;
                    value
                } else if let Some(&(_, sibling_value)) =
                    known.get(i + 1).filter(|(next_index, _)| *next_index == sibling)
                {
                    flags.push(true);
                    i += 2;
                    hash_sorted_pair::<HASH_SIZE, H>(&value, &sibling_value)
                } else {
                    proof.push(nodes[sibling]);
                    flags.push(false);
                    i += 1;
                    hash_sorted_pair::<HASH_SIZE, H>(&value, &nodes[sibling])
                };
                next.push((index / 2, parent));
            }
            trace!(level, known = next.len(), "derived level");
            known = next;
        }

        let computed = known[0].1;
        if computed != tree.root() {
            let expected = hex::encode(tree.root());
            let computed = hex::encode(computed);
            error!(%expected, %computed, "multi-proof derivation diverged from tree root");
            return Err(CommitmentError::InternalInconsistency { expected, computed });
        }
        debug!(proof = proof.len(), flags = flags.len(), "built multi-proof");
        Ok(Self::new(proof, flags))
    }

    /// Sibling hashes, in the order the verifier consumes them.
    pub fn proof(&self) -> &[[u8; HASH_SIZE]] {
        &self.proof
    }

    pub fn flags(&self) -> Vec<bool> {
        self.flags.iter().by_vals().collect()
    }

    pub fn flag_bits(&self) -> &BitSlice<u8, Lsb0> {
        &self.flags
    }

    /// Replays the proof over `leaves` (pairs of canonical position and leaf) in a tree of
    /// `leaf_count` leaves and returns the hash it ends on.
    pub fn compute_root(
        &self,
        leaf_count: usize,
        leaves: &[(usize, [u8; HASH_SIZE])],
    ) -> Result<[u8; HASH_SIZE], CommitmentError> {
        if leaves.is_empty() {
            return Err(InvalidProofReason::NoLeaves.into());
        }
        let mut known = leaves.to_vec();
        known.sort_unstable_by_key(|(index, _)| *index);
        if known.windows(2).any(|pair| pair[0].0 == pair[1].0) {
            return Err(InvalidProofReason::DuplicateIndex.into());
        }
        if let Some(&(index, _)) = known.last().filter(|(index, _)| *index >= leaf_count) {
            return Err(CommitmentError::LeafIndexOutOfBounds { index, leaf_count });
        }

        let mut flags = self.flags.iter().by_vals();
        let mut proof = self.proof.iter();
        let mut width = leaf_count;
        while width > 1 {
            let mut next = Vec::with_capacity(known.len().div_ceil(2));
            let mut i = 0;
            while i < known.len() {
                let (index, value) = known[i];
                let sibling = index ^ 1;
                if sibling >= width {
                    next.push((index / 2, value));
                    i += 1;
                    continue;
                }
                let flag = flags.next().ok_or(InvalidProofReason::FlagsExhausted)?;
                let derived_sibling = known
                    .get(i + 1)
                    .filter(|(next_index, _)| *next_index == sibling)
                    .map(|(_, sibling_value)| *sibling_value);
                let parent = match (flag, derived_sibling) {
                    (true, Some(sibling_value)) => {
                        i += 2;
                        hash_sorted_pair::<HASH_SIZE, H>(&value, &sibling_value)
                    }
                    (true, None) => return Err(InvalidProofReason::MissingDerivedSibling.into()),
                    (false, None) => {
                        let sibling_value = proof.next().ok_or(InvalidProofReason::ProofExhausted)?;
                        i += 1;
                        hash_sorted_pair::<HASH_SIZE, H>(&value, sibling_value)
                    }
                    (false, Some(_)) => {
                        return Err(InvalidProofReason::UnexpectedProofSibling.into())
                    }
                };
                next.push((index / 2, parent));
            }
            known = next;
            width = width.div_ceil(2);
        }

        if flags.next().is_some() {
            return Err(InvalidProofReason::UnusedFlags.into());
        }
        if proof.next().is_some() {
            return Err(InvalidProofReason::UnusedProofHashes.into());
        }
        Ok(known[0].1)
    }

    /// Verifies a proof of every leaf of a tree.
    ///
    /// `sorted_leaves` must be the full leaf set in canonical (strictly ascending) order; any other
    /// order is rejected before replay.
    pub fn verify(
        &self,
        sorted_leaves: &[[u8; HASH_SIZE]],
        root: &[u8; HASH_SIZE],
    ) -> Result<(), CommitmentError> {
        if let Some(position) = sorted_leaves.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(CommitmentError::NonCanonicalLeafOrder {
                position: position + 1,
            });
        }
        let indexed: Vec<(usize, [u8; HASH_SIZE])> =
            sorted_leaves.iter().copied().enumerate().collect();
        self.verify_subset(sorted_leaves.len(), &indexed, root)
    }

    /// Verifies a proof of some leaves of a tree holding `leaf_count` leaves.
    pub fn verify_subset(
        &self,
        leaf_count: usize,
        leaves: &[(usize, [u8; HASH_SIZE])],
        root: &[u8; HASH_SIZE],
    ) -> Result<(), CommitmentError> {
        if self.compute_root(leaf_count, leaves)? == *root {
            Ok(())
        } else {
            Err(CommitmentError::RootMismatch)
        }
    }

    /// Encodes the proof into a byte vector.
    ///
    /// Layout: proof count (u32 BE), proof hashes, flag count (u32 BE), flags packed LSB first.
    pub fn encode(&self) -> Vec<u8> {
        let mut flags = self.flags.clone();
        flags.set_uninitialized(false);
        let mut encoded =
            Vec::with_capacity(8 + self.proof.len() * HASH_SIZE + flags.as_raw_slice().len());
        encoded.extend_from_slice(&(self.proof.len() as u32).to_be_bytes());
        for hash in self.proof.iter() {
            encoded.extend_from_slice(hash);
        }
        encoded.extend_from_slice(&(flags.len() as u32).to_be_bytes());
        encoded.extend_from_slice(flags.as_raw_slice());
        encoded
    }

    /// Decodes a proof from a byte vector produced by [`MultiProof::encode`].
    pub fn decode(data: &[u8]) -> Result<Self, CommitmentError> {
        let (nb_hashes, mut data) = read_u32(data)?;
        let mut proof = Vec::with_capacity(nb_hashes.min(data.len() / HASH_SIZE.max(1)));
        for _ in 0..nb_hashes {
            if data.len() < HASH_SIZE {
                return Err(CommitmentError::MalformedEncoding("truncated proof hash"));
            }
            let (hash, rest) = data.split_at(HASH_SIZE);
            let mut node = [0u8; HASH_SIZE];
            node.copy_from_slice(hash);
            proof.push(node);
            data = rest;
        }
        let (nb_flags, data) = read_u32(data)?;
        if data.len() != nb_flags.div_ceil(8) {
            return Err(CommitmentError::MalformedEncoding("flag bytes do not match flag count"));
        }
        let mut flags = BitVec::<u8, Lsb0>::from_slice(data);
        if flags[nb_flags..].any() {
            return Err(CommitmentError::MalformedEncoding("non-zero flag padding"));
        }
        flags.truncate(nb_flags);
        Ok(Self::new(proof, flags))
    }
}

fn read_u32(data: &[u8]) -> Result<(usize, &[u8]), CommitmentError> {
    if data.len() < 4 {
        return Err(CommitmentError::MalformedEncoding("truncated length prefix"));
    }
    let (prefix, rest) = data.split_at(4);
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(prefix);
    Ok((u32::from_be_bytes(bytes) as usize, rest))
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> Clone for MultiProof<HASH_SIZE, H> {
    fn clone(&self) -> Self {
        Self::new(self.proof.clone(), self.flags.clone())
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> PartialEq for MultiProof<HASH_SIZE, H> {
    fn eq(&self, other: &Self) -> bool {
        self.proof == other.proof && self.flags == other.flags
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> Eq for MultiProof<HASH_SIZE, H> {}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> std::fmt::Debug for MultiProof<HASH_SIZE, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiProof")
            .field("proof", &self.proof.iter().map(hex::encode).collect::<Vec<_>>())
            .field("flags", &self.flags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use bitvec::bitvec;
    use sha3::Keccak256;

    use super::*;

    type Tree = MerkleTree<32, Keccak256>;
    type Proof = MultiProof<32, Keccak256>;

    fn tree(n: u8) -> Tree {
        Tree::from_leaves((1..=n).map(|i| [i; 32])).unwrap()
    }

    #[test]
    fn test_prove_all_three_leaves() {
        let tree = tree(3);
        let proof = tree.multi_proof_all().unwrap();
        assert!(proof.proof().is_empty());
        assert_eq!(proof.flags(), [true, true]);
        proof.verify(tree.leaves(), &tree.root()).unwrap();
    }

    #[test]
    fn test_single_leaf_has_empty_proof() {
        let tree = tree(1);
        let proof = tree.multi_proof_all().unwrap();
        assert!(proof.proof().is_empty());
        assert!(proof.flags().is_empty());
        assert_eq!(proof.compute_root(1, &[(0, [1; 32])]).unwrap(), [1; 32]);
    }

    #[test]
    fn test_subset_uses_proof_hashes() {
        // levels: [1,2,3,4,5] -> [h12, h34, 5] -> [h1234, 5] -> [root]
        let tree = tree(5);
        let proof = tree.multi_proof(&[[2; 32]]).unwrap();
        assert_eq!(proof.proof(), &[[1; 32], tree.level(1)[1], [5; 32]]);
        assert_eq!(proof.flags(), [false, false, false]);
        proof
            .verify_subset(5, &[(1, [2; 32])], &tree.root())
            .unwrap();
    }

    #[test]
    fn test_subset_with_carried_leaf() {
        let tree = tree(5);
        let proof = tree.multi_proof(&[[5; 32], [3; 32]]).unwrap();
        // leaf 5 is carried twice, leaf 3 needs leaf 4 and h12
        assert_eq!(proof.proof(), &[[4; 32], tree.level(1)[0]]);
        assert_eq!(proof.flags(), [false, false, true]);
        proof
            .verify_subset(5, &[(4, [5; 32]), (2, [3; 32])], &tree.root())
            .unwrap();
    }

    #[test]
    fn test_permuted_leaves_are_rejected() {
        let tree = tree(4);
        let proof = tree.multi_proof_all().unwrap();
        let mut leaves = tree.leaves().to_vec();
        leaves.swap(0, 1);
        assert_eq!(
            proof.verify(&leaves, &tree.root()),
            Err(CommitmentError::NonCanonicalLeafOrder { position: 1 })
        );
    }

    #[test]
    fn test_positions_crossing_pairs_change_root() {
        let tree = tree(3);
        let proof = tree.multi_proof_all().unwrap();
        let swapped = [(0, [3; 32]), (1, [2; 32]), (2, [1; 32])];
        assert_ne!(proof.compute_root(3, &swapped).unwrap(), tree.root());
    }

    #[test]
    fn test_tampered_leaf_is_rejected() {
        let tree = tree(6);
        let proof = tree.multi_proof_all().unwrap();
        let mut leaves = tree.leaves().to_vec();
        leaves[3][31] ^= 1;
        assert_eq!(
            proof.verify(&leaves, &tree.root()),
            Err(CommitmentError::RootMismatch)
        );
    }

    #[test]
    fn test_missing_leaf_is_rejected() {
        let tree = tree(4);
        let proof = tree.multi_proof_all().unwrap();
        assert!(proof.verify(&tree.leaves()[..3], &tree.root()).is_err());
    }

    #[test]
    fn test_malformed_flags() {
        let tree = tree(4);
        let leaves: Vec<_> = tree.leaves().iter().copied().enumerate().collect();
        let short = Proof::new(vec![], bitvec![u8, Lsb0; 1, 1]);
        assert_eq!(
            short.compute_root(4, &leaves),
            Err(CommitmentError::InvalidMultiProof(InvalidProofReason::FlagsExhausted))
        );
        let long = Proof::new(vec![], bitvec![u8, Lsb0; 1, 1, 1, 1]);
        assert_eq!(
            long.compute_root(4, &leaves),
            Err(CommitmentError::InvalidMultiProof(InvalidProofReason::UnusedFlags))
        );
        let wrong = Proof::new(vec![], bitvec![u8, Lsb0; 0, 1, 1]);
        assert_eq!(
            wrong.compute_root(4, &leaves),
            Err(CommitmentError::InvalidMultiProof(InvalidProofReason::UnexpectedProofSibling))
        );
        let missing = Proof::new(vec![], bitvec![u8, Lsb0; 1, 1]);
        assert_eq!(
            missing.compute_root(4, &leaves[..1]),
            Err(CommitmentError::InvalidMultiProof(InvalidProofReason::MissingDerivedSibling))
        );
    }

    #[test]
    fn test_invalid_indices() {
        let tree = tree(3);
        assert_eq!(
            Proof::build(&tree, &[0, 3]),
            Err(CommitmentError::LeafIndexOutOfBounds {
                index: 3,
                leaf_count: 3
            })
        );
        assert_eq!(
            Proof::build(&tree, &[1, 1]),
            Err(CommitmentError::DuplicateLeaf {
                leaf: hex::encode([2; 32])
            })
        );
        assert_eq!(Proof::build(&tree, &[]), Err(CommitmentError::EmptyLeafSet));
    }

    #[test]
    fn test_encode_decode() {
        let tree = tree(7);
        let proof = tree.multi_proof(&[[2; 32], [6; 32]]).unwrap();
        let encoded = proof.encode();
        assert_eq!(
            encoded.len(),
            4 + proof.proof().len() * 32 + 4 + proof.flags().len().div_ceil(8)
        );
        assert_eq!(Proof::decode(&encoded).unwrap(), proof);
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        let proof = tree(5).multi_proof(&[[1; 32]]).unwrap();
        let encoded = proof.encode();
        assert_eq!(
            Proof::decode(&encoded[..encoded.len() - 1]),
            Err(CommitmentError::MalformedEncoding("flag bytes do not match flag count"))
        );
        assert!(Proof::decode(&encoded[..10]).is_err());
        assert!(Proof::decode(&[]).is_err());
    }
}
