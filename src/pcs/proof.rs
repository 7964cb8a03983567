use serde::{Deserialize, Serialize};

use super::{PcsConfig, TreeVec};
use crate::field::{M31, QM31};
use crate::fri::FriProof;
use crate::merkle::{MerkleDecommitment, MerkleHasher, QueriesPerLogSize};

/// Everything the verifier needs to check the sampled values of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CommitmentSchemeProof<H: MerkleHasher> {
    pub config: PcsConfig,
    pub commitments: TreeVec<H::Hash>,
    /// Per tree, per column, one value per sample point.
    pub sampled_values: TreeVec<Vec<Vec<QM31>>>,
    pub decommitments: TreeVec<MerkleDecommitment<H>>,
    /// Per tree, the opened values in Merkle traversal order.
    pub queried_values: TreeVec<Vec<M31>>,
    pub proof_of_work: u64,
    pub fri_proof: FriProof<H>,
}

/// Prover-side by-products that are not part of the proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentSchemeProofAux {
    /// Query positions on the lifting domain in the order they were drawn.
    pub unsorted_query_locations: Vec<usize>,
    /// Positions opened in every tree, per column log size.
    pub trace_queries: TreeVec<QueriesPerLogSize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ExtendedCommitmentSchemeProof<H: MerkleHasher> {
    pub proof: CommitmentSchemeProof<H>,
    pub aux: CommitmentSchemeProofAux,
}
