//! Error types for commitment construction and multi-proof verification

use thiserror::Error;

/// Why a multi-proof could not be replayed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InvalidProofReason {
    /// A pair needed a flag but the flag sequence was already consumed
    FlagsExhausted,
    /// A `false` flag asked for a proof hash but the proof list was already consumed
    ProofExhausted,
    /// A `true` flag was set for a pair whose sibling is not a derived value
    MissingDerivedSibling,
    /// A `false` flag was set for a pair whose sibling is a derived value
    UnexpectedProofSibling,
    /// Flags were left over after the root was reached
    UnusedFlags,
    /// Proof hashes were left over after the root was reached
    UnusedProofHashes,
    /// No leaves were given to replay
    NoLeaves,
    /// The same leaf position was given twice
    DuplicateIndex,
}

impl std::fmt::Display for InvalidProofReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::FlagsExhausted => "ran out of proof flags",
            Self::ProofExhausted => "ran out of proof hashes",
            Self::MissingDerivedSibling => "flag expects a derived sibling that is not known",
            Self::UnexpectedProofSibling => "flag expects a proof hash for a known sibling",
            Self::UnusedFlags => "proof flags left over after reaching the root",
            Self::UnusedProofHashes => "proof hashes left over after reaching the root",
            Self::NoLeaves => "no leaves to replay",
            Self::DuplicateIndex => "leaf position given twice",
        };
        f.write_str(reason)
    }
}

/// Error type for commitment and proof operations.
///
/// Hashes carried in variants are lowercase hex so the enum stays independent of the digest size.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum CommitmentError {
    /// No records were supplied
    #[error("cannot commit to an empty leaf set")]
    EmptyLeafSet,
    /// Two records reduce to the same leaf
    #[error("duplicate leaf {leaf}")]
    DuplicateLeaf { leaf: String },
    /// The root re-derived while building a proof differs from the tree root.
    /// This is a defect in the proof derivation, never a caller error.
    #[error("internal inconsistency: tree root {expected} but proof derivation reached {computed}")]
    InternalInconsistency { expected: String, computed: String },
    /// A leaf asked to be proven is not part of the tree
    #[error("leaf {leaf} is not part of the tree")]
    LeafNotInTree { leaf: String },
    /// A leaf position outside of the tree
    #[error("leaf index {index} out of bounds for {leaf_count} leaves")]
    LeafIndexOutOfBounds { index: usize, leaf_count: usize },
    /// Submitted leaves are not strictly ascending
    #[error("leaves are not in canonical order at position {position}")]
    NonCanonicalLeafOrder { position: usize },
    /// The proof and flags cannot be replayed against the given leaves
    #[error("invalid multi-proof: {0}")]
    InvalidMultiProof(InvalidProofReason),
    /// Replay succeeded but did not reach the expected root
    #[error("multi-proof does not reproduce the expected root")]
    RootMismatch,
    /// A byte-encoded proof could not be decoded
    #[error("malformed multi-proof encoding: {0}")]
    MalformedEncoding(&'static str),
}

impl From<InvalidProofReason> for CommitmentError {
    fn from(reason: InvalidProofReason) -> Self {
        Self::InvalidMultiProof(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            CommitmentError::EmptyLeafSet.to_string(),
            "cannot commit to an empty leaf set"
        );
        assert_eq!(
            CommitmentError::LeafIndexOutOfBounds {
                index: 4,
                leaf_count: 3
            }
            .to_string(),
            "leaf index 4 out of bounds for 3 leaves"
        );
        assert_eq!(
            CommitmentError::from(InvalidProofReason::ProofExhausted).to_string(),
            "invalid multi-proof: ran out of proof hashes"
        );
    }
}
