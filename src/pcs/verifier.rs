use std::collections::BTreeMap;

use tracing::{debug_span, warn};

use super::quotients::fri_answers;
use super::utils::{lifting_log_size, tree_queries};
use super::{
    CommitmentSchemeProof, PcsConfig, PcsResult, PointSample, TreeVec, VerificationError,
    VerificationResult,
};
use crate::channel::{Channel, MerkleChannel};
use crate::circle::CirclePoint;
use crate::field::{M31, QM31};
use crate::fri::FriVerifier;
use crate::merkle::{MerkleError, MerkleHasher, MerkleVerifier, QueriesPerLogSize};

/// Verifying side of the commitment scheme.
///
/// Replays the prover's commitments with [`commit`](Self::commit) in the same
/// order, then checks an opening with [`verify_values`](Self::verify_values).
#[derive(Debug)]
pub struct CommitmentSchemeVerifier<MC: MerkleChannel> {
    pub trees: TreeVec<MerkleVerifier<MC::H>>,
    config: PcsConfig,
}

impl<MC: MerkleChannel> CommitmentSchemeVerifier<MC> {
    pub fn new(config: PcsConfig) -> PcsResult<Self> {
        config.validate()?;
        Ok(Self {
            trees: TreeVec::default(),
            config,
        })
    }

    pub fn config(&self) -> PcsConfig {
        self.config
    }

    /// Registers a tree with the declared, unextended log sizes of its
    /// columns and mixes its root into `channel`.
    pub fn commit(
        &mut self,
        root: <MC::H as MerkleHasher>::Hash,
        log_sizes: &[u32],
        channel: &mut MC::C,
    ) {
        let blowup = self.config.fri_config.log_blowup_factor;
        let extended = log_sizes.iter().map(|log_size| log_size + blowup).collect();
        MC::mix_root(channel, root);
        self.trees.push(MerkleVerifier::new(root, extended));
    }

    /// Extended log sizes of all registered columns.
    pub fn column_log_sizes(&self) -> TreeVec<Vec<u32>> {
        self.trees
            .iter()
            .map(|tree| tree.column_log_sizes.clone())
            .collect()
    }

    /// Checks that `proof` opens the registered trees at `sampled_points` to
    /// the proof's sampled values.
    pub fn verify_values(
        &self,
        sampled_points: TreeVec<Vec<Vec<CirclePoint<QM31>>>>,
        proof: CommitmentSchemeProof<MC::H>,
        channel: &mut MC::C,
    ) -> VerificationResult<()> {
        let _span = debug_span!("pcs.verify_values", n_trees = self.trees.len()).entered();
        let CommitmentSchemeProof {
            config,
            commitments,
            sampled_values,
            decommitments,
            queried_values,
            proof_of_work,
            fri_proof,
        } = proof;

        if config != self.config {
            warn!("proof configuration differs from the verifier's");
            return Err(VerificationError::ConfigMismatch);
        }
        self.check_shape(&commitments, &sampled_points, &sampled_values)?;
        if decommitments.len() != self.trees.len() || queried_values.len() != self.trees.len() {
            return Err(VerificationError::ShapeMismatch {
                what: "decommitted trees",
                expected: self.trees.len(),
                got: decommitments.len().min(queried_values.len()),
            });
        }
        let column_log_sizes = self.column_log_sizes();
        let lifting = lifting_log_size(&column_log_sizes)?;

        channel.mix_felts(&sampled_values.clone().flatten_cols());
        let random_coeff = channel.draw_secure_felt();

        let mut fri_verifier =
            FriVerifier::<MC>::commit(channel, self.config.fri_config, fri_proof, lifting)?;

        if !channel.verify_pow_nonce(self.config.pow_bits, proof_of_work) {
            warn!(proof_of_work, "proof of work rejected");
            return Err(VerificationError::ProofOfWork);
        }
        channel.mix_u64(proof_of_work);

        let queries = fri_verifier.sample_query_positions(channel);

        let mut column_values = Vec::with_capacity(column_log_sizes.n_columns());
        for (index, ((tree, values), decommitment)) in self
            .trees
            .iter()
            .zip(queried_values)
            .zip(decommitments)
            .enumerate()
        {
            let positions = tree_queries(&queries, lifting, index, &tree.column_log_sizes)?;
            let merkle_error = |source: MerkleError| {
                warn!(tree = index, %source, "tree decommitment rejected");
                VerificationError::Merkle {
                    tree: index,
                    source,
                }
            };
            tree.verify(&positions, values.clone(), decommitment)
                .map_err(merkle_error)?;
            let opened = opened_columns(&tree.column_log_sizes, &positions, &values)
                .ok_or(MerkleError::TooFewQueriedValues)
                .map_err(merkle_error)?;
            column_values.extend(opened);
        }

        let samples: Vec<Vec<PointSample>> = sampled_points
            .flatten()
            .into_iter()
            .zip(sampled_values.flatten())
            .map(|(points, values)| {
                points
                    .into_iter()
                    .zip(values)
                    .map(|(point, value)| PointSample { point, value })
                    .collect()
            })
            .collect();
        let answers = fri_answers(
            &column_log_sizes.flatten(),
            &column_values,
            &samples,
            random_coeff,
            lifting,
            &queries,
        )?;

        fri_verifier.decommit(&answers).map_err(|error| {
            warn!(%error, "fri rejected the quotient column");
            VerificationError::Fri(error)
        })
    }

    fn check_shape(
        &self,
        commitments: &TreeVec<<MC::H as MerkleHasher>::Hash>,
        sampled_points: &TreeVec<Vec<Vec<CirclePoint<QM31>>>>,
        sampled_values: &TreeVec<Vec<Vec<QM31>>>,
    ) -> VerificationResult<()> {
        let n_trees = self.trees.len();
        for (what, got) in [
            ("commitments", commitments.len()),
            ("sampled point trees", sampled_points.len()),
            ("sampled value trees", sampled_values.len()),
        ] {
            if got != n_trees {
                return Err(VerificationError::ShapeMismatch {
                    what,
                    expected: n_trees,
                    got,
                });
            }
        }

        for (index, tree) in self.trees.iter().enumerate() {
            if commitments[index] != tree.root {
                warn!(tree = index, "commitment differs from the registered root");
                return Err(VerificationError::CommitmentMismatch { tree: index });
            }
            let n_columns = tree.column_log_sizes.len();
            let (points, values) = (&sampled_points[index], &sampled_values[index]);
            if points.len() != n_columns || values.len() != n_columns {
                return Err(VerificationError::ShapeMismatch {
                    what: "sampled columns",
                    expected: n_columns,
                    got: if points.len() != n_columns { points.len() } else { values.len() },
                });
            }
            for (column_points, column_values) in points.iter().zip(values) {
                if column_points.len() != column_values.len() {
                    return Err(VerificationError::ShapeMismatch {
                        what: "sampled values per column",
                        expected: column_points.len(),
                        got: column_values.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Splits the opened values of one tree by column.
///
/// The values arrive in Merkle traversal order: largest log size first, then
/// by position, then by column in commit order.
fn opened_columns(
    column_log_sizes: &[u32],
    queries: &QueriesPerLogSize,
    values: &[M31],
) -> Option<Vec<BTreeMap<usize, M31>>> {
    let mut columns = vec![BTreeMap::new(); column_log_sizes.len()];
    let mut values = values.iter().copied();
    for (&log_size, positions) in queries.iter().rev() {
        let layer_columns: Vec<usize> = column_log_sizes
            .iter()
            .enumerate()
            .filter(|&(_, &size)| size == log_size)
            .map(|(index, _)| index)
            .collect();
        for &position in positions {
            for &column in &layer_columns {
                columns[column].insert(position, values.next()?);
            }
        }
    }
    Some(columns)
}
