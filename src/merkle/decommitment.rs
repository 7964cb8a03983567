use serde::{Deserialize, Serialize};

use super::MerkleHasher;
use crate::field::M31;

/// Data the verifier needs besides the queried values to recompute a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct MerkleDecommitment<H: MerkleHasher> {
    /// Hashes of siblings that are not derivable from the queried nodes.
    pub hash_witness: Vec<H::Hash>,
    /// Column values of visited nodes that were not queried themselves.
    pub column_witness: Vec<M31>,
}

impl<H: MerkleHasher> MerkleDecommitment<H> {
    pub fn empty() -> Self {
        Self {
            hash_witness: Vec::new(),
            column_witness: Vec::new(),
        }
    }
}

impl<H: MerkleHasher> Default for MerkleDecommitment<H> {
    fn default() -> Self {
        Self::empty()
    }
}
