//! The root/proof/flags triple handed to the on-chain registration call.

use std::fmt::Display;

use bitvec::order::Lsb0;
use bitvec::slice::BitSlice;
use sha3::Keccak256;
use tracing::{info, instrument};

use crate::hasher::Hasher;
use crate::{CommitmentError, LeafSet, MerkleTree, MultiProof};

/// Commitment over the default 32-byte keccak256 tree.
pub type KeccakCommitment = Commitment<32, Keccak256>;

/// A batch committed to a single root, with a multi-proof of every leaf.
///
/// Leaves must be submitted in the order of [`Commitment::sorted_leaves`], otherwise the
/// verifier recomputes a different root.
pub struct Commitment<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> {
    tree: MerkleTree<HASH_SIZE, H>,
    proof: MultiProof<HASH_SIZE, H>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> Commitment<HASH_SIZE, H> {
    /// Builds the tree over `leaf_set` and a multi-proof of all its leaves.
    #[instrument(skip_all, fields(leaves = leaf_set.len()))]
    pub fn new(leaf_set: LeafSet<HASH_SIZE, H>) -> Result<Self, CommitmentError> {
        let tree = MerkleTree::new(leaf_set);
        let proof = tree.multi_proof_all()?;
        info!(
            root = %hex::encode(tree.root()),
            proof = proof.proof().len(),
            flags = proof.flag_bits().len(),
            "committed leaf set"
        );
        Ok(Self { tree, proof })
    }

    pub fn sorted_leaves(&self) -> &[[u8; HASH_SIZE]] {
        self.tree.leaves()
    }

    pub fn root(&self) -> [u8; HASH_SIZE] {
        self.tree.root()
    }

    /// `0x`-prefixed lowercase hex root.
    pub fn hex_root(&self) -> String {
        format!("0x{}", hex::encode(self.root()))
    }

    pub fn proof(&self) -> &[[u8; HASH_SIZE]] {
        self.proof.proof()
    }

    pub fn flags(&self) -> Vec<bool> {
        self.proof.flags()
    }

    pub fn flag_bits(&self) -> &BitSlice<u8, Lsb0> {
        self.proof.flag_bits()
    }

    pub fn multi_proof(&self) -> &MultiProof<HASH_SIZE, H> {
        &self.proof
    }

    pub fn tree(&self) -> &MerkleTree<HASH_SIZE, H> {
        &self.tree
    }

    /// Replays the proof over the committed leaves, exactly as an external verifier would.
    pub fn verify(&self) -> Result<(), CommitmentError> {
        self.proof.verify(self.sorted_leaves(), &self.root())
    }

    /// Splits the commitment into `(sorted leaves, root, proof, flags)`.
    pub fn into_parts(
        self,
    ) -> (Vec<[u8; HASH_SIZE]>, [u8; HASH_SIZE], Vec<[u8; HASH_SIZE]>, Vec<bool>) {
        let root = self.root();
        let flags = self.flags();
        let proof = self.proof.proof().to_vec();
        (self.tree.leaves().to_vec(), root, proof, flags)
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> Display for Commitment<HASH_SIZE, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Commitment {{ leaves: {}, root: {}, proof: {}, flags: {} }}",
            self.sorted_leaves().len(),
            self.hex_root(),
            self.proof().len(),
            self.flag_bits().len()
        )
    }
}

/// Commits to raw leaves.
pub fn commit<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>>(
    leaves: impl IntoIterator<Item = [u8; HASH_SIZE]>,
) -> Result<Commitment<HASH_SIZE, H>, CommitmentError> {
    Commitment::new(LeafSet::new(leaves)?)
}

/// Commits to encoded records, hashing each payload into its leaf.
pub fn commit_payloads<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>, P: AsRef<[u8]>>(
    payloads: impl IntoIterator<Item = P>,
) -> Result<Commitment<HASH_SIZE, H>, CommitmentError> {
    Commitment::new(LeafSet::from_payloads(payloads)?)
}

/// Commits to `records` and returns them in the order they must be submitted.
///
/// * `leaf_of` - Deterministic encoding of a record into its leaf.
pub fn commit_records<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>, T>(
    records: impl IntoIterator<Item = T>,
    leaf_of: impl Fn(&T) -> [u8; HASH_SIZE],
) -> Result<(Commitment<HASH_SIZE, H>, Vec<T>), CommitmentError> {
    let (leaf_set, records) = LeafSet::from_records(records, leaf_of)?;
    Ok((Commitment::new(leaf_set)?, records))
}
