use serde::{Deserialize, Serialize};

/// Parse a hex string into a fixed size hash
pub fn parse_hash<const HASH_SIZE: usize>(
    hash_hex: &str,
) -> Result<[u8; HASH_SIZE], Box<dyn std::error::Error>> {
    let bytes = hex::decode(hash_hex)?;
    let hash: [u8; HASH_SIZE] = bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| format!("expected {} bytes, got {}", HASH_SIZE, bytes.len()))?;
    Ok(hash)
}

/// A file of test vectors, all built with the same hasher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVectors {
    pub hasher: String,
    pub cases: Vec<TestCase>,
}

/// One leaf set, its root and the multi-proofs of some of its subsets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub comment: Option<String>,
    /// Leaves in input order
    pub leaves: Vec<String>,
    pub sorted_leaves: Vec<String>,
    pub root: String,
    pub multi_proofs: Vec<TestMultiProof>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestMultiProof {
    pub indices: Vec<usize>,
    pub proof: Vec<String>,
    pub flags: Vec<bool>,
}

impl TestCase {
    pub fn leaves_as_bytes(&self) -> Result<Vec<[u8; 32]>, Box<dyn std::error::Error>> {
        self.leaves.iter().map(|leaf| parse_hash(leaf)).collect()
    }

    pub fn sorted_leaves_as_bytes(&self) -> Result<Vec<[u8; 32]>, Box<dyn std::error::Error>> {
        self.sorted_leaves.iter().map(|leaf| parse_hash(leaf)).collect()
    }

    pub fn root_as_bytes(&self) -> Result<[u8; 32], Box<dyn std::error::Error>> {
        parse_hash(&self.root)
    }
}

impl TestMultiProof {
    pub fn proof_as_bytes(&self) -> Result<Vec<[u8; 32]>, Box<dyn std::error::Error>> {
        self.proof.iter().map(|hash| parse_hash(hash)).collect()
    }
}
