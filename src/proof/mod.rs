//! The proof object handed from prover to verifier.
//!
//! ```text
//! proof
//! ├── size  — size estimates and the per-section breakdown
//! └── ser   — canonical byte encoding
//! ```
//!
//! [`StarkProof`] wraps the commitment-scheme proof and adds the hooks the
//! constraint layer needs: recovering the composition polynomial's
//! out-of-domain value from the last committed tree and comparing it with the
//! value the constraints predict.

mod ser;
mod size;

use core::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::circle::CirclePoint;
use crate::field::{QM31, SECURE_EXTENSION_DEGREE};
use crate::merkle::MerkleHasher;
use crate::pcs::{CommitmentSchemeProof, VerificationError, VerificationResult};

pub use ser::{decode_proof, encode_proof, PROOF_VERSION};
pub use size::{SizeEstimate, StarkProofSizeBreakdown};

/// Number of single-point columns in the composition tree: the four
/// coordinates of the left half followed by those of the right half.
pub const COMPOSITION_COLUMNS: usize = 2 * SECURE_EXTENSION_DEGREE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StarkProof<H: MerkleHasher>(pub CommitmentSchemeProof<H>);

impl<H: MerkleHasher> StarkProof<H> {
    /// Recovers the composition polynomial's value at `oods_point` from the
    /// sampled values of the last tree.
    ///
    /// Returns `None` unless that tree holds exactly [`COMPOSITION_COLUMNS`]
    /// columns sampled at a single point each. The halves are combined as
    /// `left + x * right` with `x` the coordinate of `oods_point` doubled down
    /// to the half-size domain.
    pub fn extract_composition_oods_eval(
        &self,
        oods_point: CirclePoint<QM31>,
        composition_log_size: u32,
    ) -> Option<QM31> {
        let composition_mask = self.sampled_values.last()?;
        if composition_mask.len() != COMPOSITION_COLUMNS {
            return None;
        }
        let mut coordinate_evals = [QM31::default(); COMPOSITION_COLUMNS];
        for (eval, column) in coordinate_evals.iter_mut().zip(composition_mask) {
            let [value] = column.as_slice() else {
                return None;
            };
            *eval = *value;
        }

        let (left, right) = coordinate_evals.split_at(SECURE_EXTENSION_DEGREE);
        let left = QM31::from_partial_evals(left.try_into().ok()?);
        let right = QM31::from_partial_evals(right.try_into().ok()?);
        let x = oods_point
            .repeated_double(composition_log_size.checked_sub(2)?)
            .x;
        Some(left + x * right)
    }

    /// Compares the extracted composition value with `expected`, the value
    /// the constraints evaluate to at `oods_point`.
    pub fn check_composition_oods(
        &self,
        oods_point: CirclePoint<QM31>,
        composition_log_size: u32,
        expected: QM31,
    ) -> VerificationResult<()> {
        let Some(extracted) = self.extract_composition_oods_eval(oods_point, composition_log_size)
        else {
            return Err(VerificationError::ShapeMismatch {
                what: "composition columns",
                expected: COMPOSITION_COLUMNS,
                got: self.sampled_values.last().map_or(0, Vec::len),
            });
        };
        if extracted != expected {
            warn!("composition evaluation differs from the constraint evaluation");
            return Err(VerificationError::ConstraintsNotSatisfied);
        }
        Ok(())
    }

    pub fn into_inner(self) -> CommitmentSchemeProof<H> {
        self.0
    }
}

impl<H: MerkleHasher> From<CommitmentSchemeProof<H>> for StarkProof<H> {
    fn from(proof: CommitmentSchemeProof<H>) -> Self {
        Self(proof)
    }
}

impl<H: MerkleHasher> Deref for StarkProof<H> {
    type Target = CommitmentSchemeProof<H>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<H: MerkleHasher> DerefMut for StarkProof<H> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use crate::field::M31;
    use crate::fri::{FriLayerProof, FriProof};
    use crate::hash::HashDigest;
    use crate::merkle::MerkleDecommitment;
    use crate::pcs::{PcsConfig, TreeVec};
    use crate::poly::LinePoly;

    pub fn qm31(seed: u32) -> QM31 {
        QM31::from_u32_unchecked(seed, seed + 1, seed + 2, seed + 3)
    }

    pub fn digest<H: MerkleHasher>(byte: u8) -> H::Hash {
        H::Hash::from_bytes([byte; 32])
    }

    fn layer<H: MerkleHasher>(seed: u8, n_witness: usize) -> FriLayerProof<H> {
        FriLayerProof {
            fri_witness: (0..n_witness as u32).map(qm31).collect(),
            decommitment: MerkleDecommitment {
                hash_witness: vec![digest::<H>(seed); 2],
                column_witness: vec![M31::from_u32_unchecked(seed as u32)],
            },
            commitment: digest::<H>(seed + 1),
        }
    }

    /// Hand-built proof with every section populated.
    pub fn synthetic_proof<H: MerkleHasher>(
        sampled_values: TreeVec<Vec<Vec<QM31>>>,
    ) -> StarkProof<H> {
        let n_trees = sampled_values.len();
        StarkProof(CommitmentSchemeProof {
            config: PcsConfig::default(),
            commitments: (0..n_trees as u8).map(digest::<H>).collect(),
            sampled_values,
            decommitments: (0..n_trees)
                .map(|tree| MerkleDecommitment {
                    hash_witness: vec![digest::<H>(40 + tree as u8); tree + 1],
                    column_witness: vec![M31::from_u32_unchecked(7); tree],
                })
                .collect(),
            queried_values: (0..n_trees)
                .map(|tree| vec![M31::from_u32_unchecked(tree as u32 + 1); 3])
                .collect(),
            proof_of_work: 17,
            fri_proof: FriProof {
                first_layer: layer(10, 2),
                inner_layers: vec![layer(20, 1), layer(30, 0)],
                last_layer_poly: LinePoly::new(vec![qm31(100)]).expect("power of two"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::{qm31, synthetic_proof};
    use super::*;
    use crate::channel::Blake2sChannel;
    use crate::merkle::Blake2sMerkleHasher;
    use crate::pcs::TreeVec;

    fn oods_point() -> CirclePoint<QM31> {
        let mut channel = Blake2sChannel::default();
        CirclePoint::get_random_point(&mut channel).expect("off-domain point")
    }

    fn composition_tree(values: &[QM31]) -> Vec<Vec<QM31>> {
        values.iter().map(|value| vec![*value]).collect()
    }

    #[test]
    fn composition_eval_combines_left_and_right_halves() {
        let values: Vec<QM31> = (0..8).map(|i| qm31(10 * i)).collect();
        let proof = synthetic_proof::<Blake2sMerkleHasher>(TreeVec::new(vec![
            vec![vec![qm31(1)]],
            composition_tree(&values),
        ]));
        let point = oods_point();

        let left = QM31::from_partial_evals([values[0], values[1], values[2], values[3]]);
        let right = QM31::from_partial_evals([values[4], values[5], values[6], values[7]]);
        let expected = left + point.repeated_double(3).x * right;

        assert_eq!(proof.extract_composition_oods_eval(point, 5), Some(expected));
        assert!(proof.check_composition_oods(point, 5, expected).is_ok());
        assert_eq!(
            proof.check_composition_oods(point, 5, expected + qm31(1)),
            Err(VerificationError::ConstraintsNotSatisfied)
        );
    }

    #[test]
    fn malformed_composition_tree_yields_none() {
        let point = oods_point();
        let seven = synthetic_proof::<Blake2sMerkleHasher>(TreeVec::new(vec![composition_tree(
            &[qm31(0); 7],
        )]));
        assert_eq!(seven.extract_composition_oods_eval(point, 4), None);
        assert_eq!(
            seven.check_composition_oods(point, 4, qm31(0)),
            Err(VerificationError::ShapeMismatch {
                what: "composition columns",
                expected: 8,
                got: 7,
            })
        );

        let mut two_points = composition_tree(&[qm31(0); 8]);
        two_points[3].push(qm31(9));
        let proof = synthetic_proof::<Blake2sMerkleHasher>(TreeVec::new(vec![two_points]));
        assert_eq!(proof.extract_composition_oods_eval(point, 4), None);

        let empty = synthetic_proof::<Blake2sMerkleHasher>(TreeVec::default());
        assert_eq!(empty.extract_composition_oods_eval(point, 4), None);
    }
}
