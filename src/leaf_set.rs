//! Canonical, duplicate-free set of leaves.
//!
//! Leaves are sorted ascending by unsigned byte value. The same order is used to build the tree
//! and to submit the leaves on-chain, so anything that re-orders records for submission must go
//! through [`LeafSet::from_records`].

use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::hasher::{hash_leaf, Hasher};
use crate::CommitmentError;

/// Strictly ascending sequence of unique leaves.
pub struct LeafSet<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> {
    leaves: Vec<[u8; HASH_SIZE]>,
    _phantom: PhantomData<H>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> LeafSet<HASH_SIZE, H> {
    /// Canonicalizes raw leaves. No hashing happens here.
    pub fn new(leaves: impl IntoIterator<Item = [u8; HASH_SIZE]>) -> Result<Self, CommitmentError> {
        let mut leaves: Vec<[u8; HASH_SIZE]> = leaves.into_iter().collect();
        if leaves.is_empty() {
            warn!("rejecting empty leaf set");
            return Err(CommitmentError::EmptyLeafSet);
        }
        leaves.sort_unstable();
        check_unique(&leaves)?;
        debug!(leaves = leaves.len(), "canonicalized leaf set");
        Ok(Self {
            leaves,
            _phantom: PhantomData,
        })
    }

    /// Hashes each payload into a leaf then canonicalizes.
    pub fn from_payloads<P: AsRef<[u8]>>(
        payloads: impl IntoIterator<Item = P>,
    ) -> Result<Self, CommitmentError> {
        Self::new(
            payloads
                .into_iter()
                .map(|payload| hash_leaf::<HASH_SIZE, H>(payload.as_ref())),
        )
    }

    /// Canonicalizes the leaves of `records` and returns the records re-ordered to match.
    ///
    /// * `leaf_of` - Deterministic encoding of a record into its leaf.
    pub fn from_records<T>(
        records: impl IntoIterator<Item = T>,
        leaf_of: impl Fn(&T) -> [u8; HASH_SIZE],
    ) -> Result<(Self, Vec<T>), CommitmentError> {
        let mut keyed: Vec<([u8; HASH_SIZE], T)> = records
            .into_iter()
            .map(|record| (leaf_of(&record), record))
            .collect();
        if keyed.is_empty() {
            warn!("rejecting empty record set");
            return Err(CommitmentError::EmptyLeafSet);
        }
        // same comparator as `new`: the key alone, so ties can't be broken by the payload
        keyed.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
        let (leaves, records): (Vec<_>, Vec<_>) = keyed.into_iter().unzip();
        check_unique(&leaves)?;
        debug!(leaves = leaves.len(), "canonicalized record set");
        Ok((
            Self {
                leaves,
                _phantom: PhantomData,
            },
            records,
        ))
    }

    pub fn leaves(&self) -> &[[u8; HASH_SIZE]] {
        &self.leaves
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Always false: an empty set can't be constructed.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Position of `leaf` in canonical order.
    pub fn position(&self, leaf: &[u8; HASH_SIZE]) -> Option<usize> {
        self.leaves.binary_search(leaf).ok()
    }

    pub fn contains(&self, leaf: &[u8; HASH_SIZE]) -> bool {
        self.position(leaf).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, [u8; HASH_SIZE]> {
        self.leaves.iter()
    }

    pub fn into_leaves(self) -> Vec<[u8; HASH_SIZE]> {
        self.leaves
    }
}

// Manual impls: hashers such as `Keccak256` are not `PartialEq`.
impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> Clone for LeafSet<HASH_SIZE, H> {
    fn clone(&self) -> Self {
        Self {
            leaves: self.leaves.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> PartialEq for LeafSet<HASH_SIZE, H> {
    fn eq(&self, other: &Self) -> bool {
        self.leaves == other.leaves
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> Eq for LeafSet<HASH_SIZE, H> {}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> std::fmt::Debug for LeafSet<HASH_SIZE, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.leaves.iter().map(hex::encode))
            .finish()
    }
}

impl<'a, const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> IntoIterator for &'a LeafSet<HASH_SIZE, H> {
    type Item = &'a [u8; HASH_SIZE];
    type IntoIter = std::slice::Iter<'a, [u8; HASH_SIZE]>;

    fn into_iter(self) -> Self::IntoIter {
        self.leaves.iter()
    }
}

/// Rejects equal neighbours of an already sorted slice.
fn check_unique<const HASH_SIZE: usize>(sorted: &[[u8; HASH_SIZE]]) -> Result<(), CommitmentError> {
    match sorted.windows(2).find(|pair| pair[0] == pair[1]) {
        Some(pair) => {
            let leaf = hex::encode(pair[0]);
            warn!(%leaf, "rejecting duplicate leaf");
            Err(CommitmentError::DuplicateLeaf { leaf })
        }
        None => Ok(()),
    }
}
