use core::mem::size_of;

use super::StarkProof;
use crate::config::CONFIG_ENCODING_LEN;
use crate::field::{M31, QM31};
use crate::fri::{FriLayerProof, FriProof};
use crate::hash::HashDigest;
use crate::merkle::{LiftedMerkleDecommitment, MerkleDecommitment, MerkleHasher};
use crate::pcs::{CommitmentSchemeProof, PcsConfig, TreeVec};
use crate::poly::LinePoly;

/// Approximate size in bytes of a value once transmitted.
pub trait SizeEstimate {
    fn size_estimate(&self) -> usize;
}

impl SizeEstimate for M31 {
    fn size_estimate(&self) -> usize {
        size_of::<u32>()
    }
}

impl SizeEstimate for QM31 {
    fn size_estimate(&self) -> usize {
        4 * size_of::<u32>()
    }
}

impl SizeEstimate for u64 {
    fn size_estimate(&self) -> usize {
        size_of::<u64>()
    }
}

impl SizeEstimate for PcsConfig {
    fn size_estimate(&self) -> usize {
        CONFIG_ENCODING_LEN
    }
}

impl<T: SizeEstimate> SizeEstimate for [T] {
    fn size_estimate(&self) -> usize {
        self.iter().map(|v| v.size_estimate()).sum()
    }
}

impl<T: SizeEstimate> SizeEstimate for Vec<T> {
    fn size_estimate(&self) -> usize {
        self.as_slice().size_estimate()
    }
}

impl<T: SizeEstimate> SizeEstimate for TreeVec<T> {
    fn size_estimate(&self) -> usize {
        self.0.size_estimate()
    }
}

// `H::Hash` cannot carry a blanket impl, so digests are sized through this
// wrapper.
struct Digests<'a, H: MerkleHasher>(&'a [H::Hash]);

impl<H: MerkleHasher> SizeEstimate for Digests<'_, H> {
    fn size_estimate(&self) -> usize {
        self.0.iter().map(|hash| hash.to_bytes().len()).sum()
    }
}

impl<H: MerkleHasher> SizeEstimate for MerkleDecommitment<H> {
    fn size_estimate(&self) -> usize {
        Digests::<H>(&self.hash_witness).size_estimate() + self.column_witness.size_estimate()
    }
}

impl<H: MerkleHasher> SizeEstimate for LiftedMerkleDecommitment<H> {
    fn size_estimate(&self) -> usize {
        Digests::<H>(&self.hash_witness).size_estimate()
    }
}

impl<H: MerkleHasher> SizeEstimate for FriLayerProof<H> {
    fn size_estimate(&self) -> usize {
        self.fri_witness.size_estimate()
            + self.decommitment.size_estimate()
            + Digests::<H>(core::slice::from_ref(&self.commitment)).size_estimate()
    }
}

impl SizeEstimate for LinePoly {
    fn size_estimate(&self) -> usize {
        self.coeffs().size_estimate()
    }
}

impl<H: MerkleHasher> SizeEstimate for FriProof<H> {
    fn size_estimate(&self) -> usize {
        self.layers().map(|layer| layer.size_estimate()).sum::<usize>()
            + self.last_layer_poly.size_estimate()
    }
}

impl<H: MerkleHasher> SizeEstimate for CommitmentSchemeProof<H> {
    fn size_estimate(&self) -> usize {
        let Self {
            config,
            commitments,
            sampled_values,
            decommitments,
            queried_values,
            proof_of_work,
            fri_proof,
        } = self;
        config.size_estimate()
            + Digests::<H>(commitments).size_estimate()
            + sampled_values.size_estimate()
            + decommitments.size_estimate()
            + queried_values.size_estimate()
            + proof_of_work.size_estimate()
            + fri_proof.size_estimate()
    }
}

impl<H: MerkleHasher> SizeEstimate for StarkProof<H> {
    fn size_estimate(&self) -> usize {
        self.0.size_estimate()
    }
}

/// Proof size split by the part of the protocol each byte serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StarkProofSizeBreakdown {
    pub oods_samples: usize,
    pub queries_values: usize,
    pub fri_samples: usize,
    pub fri_decommitments: usize,
    pub trace_decommitments: usize,
}

impl StarkProofSizeBreakdown {
    pub fn total(&self) -> usize {
        self.oods_samples
            + self.queries_values
            + self.fri_samples
            + self.fri_decommitments
            + self.trace_decommitments
    }
}

impl<H: MerkleHasher> StarkProof<H> {
    /// Per-section size estimate. The configuration and the proof-of-work
    /// nonce are not attributed to any section.
    pub fn size_breakdown_estimate(&self) -> StarkProofSizeBreakdown {
        let CommitmentSchemeProof {
            commitments,
            sampled_values,
            decommitments,
            queried_values,
            fri_proof,
            ..
        } = &self.0;

        let mut fri_samples = fri_proof.last_layer_poly.size_estimate();
        let mut fri_decommitments = 0;
        for layer in fri_proof.layers() {
            fri_samples += layer.fri_witness.size_estimate();
            fri_decommitments += layer.decommitment.size_estimate()
                + Digests::<H>(core::slice::from_ref(&layer.commitment)).size_estimate();
        }

        StarkProofSizeBreakdown {
            oods_samples: sampled_values.size_estimate(),
            queries_values: queried_values.size_estimate(),
            fri_samples,
            fri_decommitments,
            trace_decommitments: Digests::<H>(commitments).size_estimate()
                + decommitments.size_estimate(),
        }
    }
}
