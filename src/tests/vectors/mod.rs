use std::fs;
use std::path::PathBuf;

mod types;

use bitvec::prelude::*;
use sha3::Keccak256;

use crate::tests::vectors::types::TestVectors;
use crate::{commit, CommitmentError, KeccakTree, MultiProof};

fn load(name: &str) -> TestVectors {
    let path = PathBuf::from("src/tests/vectors/testdata").join(name);
    let json = fs::read_to_string(&path).unwrap();
    serde_json::from_str::<TestVectors>(&json).unwrap()
}

#[test]
fn test_keccak_roots() {
    let test_vectors = load("keccak_multiproof.json");
    assert_eq!(test_vectors.hasher, "keccak256");
    for case in &test_vectors.cases {
        let comment = case.comment.as_deref().unwrap_or("unnamed test");
        println!("Running test case: {}", comment);

        let commitment = commit::<32, Keccak256>(case.leaves_as_bytes().unwrap()).unwrap();
        assert_eq!(commitment.sorted_leaves(), case.sorted_leaves_as_bytes().unwrap().as_slice());
        assert_eq!(commitment.root(), case.root_as_bytes().unwrap());
        assert!(commitment.proof().is_empty());
        assert_eq!(commitment.flags().len(), case.leaves.len() - 1);
        assert!(commitment.flags().iter().all(|flag| *flag));
        commitment.verify().unwrap();
    }
}

#[test]
fn test_keccak_multi_proofs() {
    let test_vectors = load("keccak_multiproof.json");
    for case in &test_vectors.cases {
        let tree = KeccakTree::from_leaves(case.leaves_as_bytes().unwrap()).unwrap();
        let root = case.root_as_bytes().unwrap();
        for expected in &case.multi_proofs {
            let proof = MultiProof::build(&tree, &expected.indices).unwrap();
            assert_eq!(proof.proof(), expected.proof_as_bytes().unwrap().as_slice());
            assert_eq!(proof.flags(), expected.flags);
            assert_eq!(
                expected.indices.len() + proof.proof().len() - 1,
                proof.flags().len()
            );

            // a proof assembled from the vector alone replays to the same root
            let flags: BitVec<u8, Lsb0> = expected.flags.iter().copied().collect();
            let replayed =
                MultiProof::<32, Keccak256>::new(expected.proof_as_bytes().unwrap(), flags);
            let leaves: Vec<_> = expected
                .indices
                .iter()
                .map(|&index| (index, tree.leaves()[index]))
                .collect();
            replayed.verify_subset(tree.leaf_count(), &leaves, &root).unwrap();
            assert_eq!(
                replayed.verify_subset(tree.leaf_count(), &leaves, &[0; 32]),
                Err(CommitmentError::RootMismatch)
            );
        }
    }
}
