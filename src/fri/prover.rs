use std::collections::BTreeMap;

use tracing::{debug, debug_span};

use super::folding::{fold_circle_into_line, fold_line};
use super::{FriConfig, FriError, FriLayerProof, FriProof, FriResult};
use crate::channel::{draw_queries, Channel, MerkleChannel, Queries};
use crate::field::{Field, M31, QM31};
use crate::merkle::{MerkleError, MerkleProver};
use crate::poly::{LineDomain, LineEvaluation, LinePoly, SecureColumnByCoords, SecureEvaluation};

/// A committed layer: its values plus the tree over their coordinates.
#[derive(Debug)]
struct CommittedLayer<MC: MerkleChannel> {
    values: SecureColumnByCoords,
    log_size: u32,
    tree: MerkleProver<MC::H>,
}

impl<MC: MerkleChannel> CommittedLayer<MC> {
    fn commit(values: SecureColumnByCoords, log_size: u32, layer: usize) -> FriResult<Self> {
        let columns: Vec<&[M31]> = values.columns.iter().map(Vec::as_slice).collect();
        let tree = MerkleProver::commit(&columns).map_err(|source| FriError::Merkle { layer, source })?;
        Ok(Self {
            values,
            log_size,
            tree,
        })
    }

    /// Opens the folding cosets of `queries`.
    fn decommit(&self, queries: &Queries, layer: usize) -> FriResult<FriLayerProof<MC::H>> {
        let mut fri_witness = Vec::new();
        let mut coset_positions = Vec::new();
        for coset in queries.fold(1).positions {
            for position in [2 * coset, 2 * coset + 1] {
                if queries.binary_search(&position).is_err() {
                    fri_witness.push(self.values.at(position));
                }
                coset_positions.push(position);
            }
        }

        let columns: Vec<&[M31]> = self.values.columns.iter().map(Vec::as_slice).collect();
        let queries_per_log_size = BTreeMap::from([(self.log_size, coset_positions)]);
        let (_, decommitment) = self
            .tree
            .decommit(&queries_per_log_size, &columns)
            .map_err(|source: MerkleError| FriError::Merkle { layer, source })?;

        Ok(FriLayerProof {
            fri_witness,
            decommitment,
            commitment: self.tree.root(),
        })
    }
}

/// Prover side of FRI, created by [`FriProver::commit`].
#[derive(Debug)]
pub struct FriProver<MC: MerkleChannel> {
    config: FriConfig,
    first_layer: CommittedLayer<MC>,
    inner_layers: Vec<CommittedLayer<MC>>,
    last_layer_poly: LinePoly,
}

impl<MC: MerkleChannel> FriProver<MC> {
    /// Commits to `column` and to all of its folds.
    ///
    /// Fails with [`FriError::InvalidLastLayerDegree`] when the final layer is
    /// not the evaluation of a polynomial within the configured degree bound,
    /// i.e. when `column` is not of low degree.
    pub fn commit(channel: &mut MC::C, config: FriConfig, column: SecureEvaluation) -> FriResult<Self> {
        let _span = debug_span!("fri.commit", log_size = column.domain.log_size()).entered();
        config.validate()?;
        let log_size = column.domain.log_size();
        if log_size <= config.log_last_layer_domain_size() {
            return Err(FriError::ColumnTooSmall {
                log_size,
                last_layer_log_size: config.log_last_layer_domain_size(),
            });
        }

        let first_layer = CommittedLayer::<MC>::commit(column.values.clone(), log_size, 0)?;
        MC::mix_root(channel, first_layer.tree.root());
        let alpha = channel.draw_secure_felt();

        let mut line = LineEvaluation::new_zero(LineDomain::new(column.domain.half_coset));
        fold_circle_into_line(&mut line, &column, alpha)?;

        let mut inner_layers = Vec::new();
        while line.len() > config.last_layer_domain_size() {
            let layer = CommittedLayer::<MC>::commit(
                line.values.clone(),
                line.domain().log_size(),
                inner_layers.len() + 1,
            )?;
            MC::mix_root(channel, layer.tree.root());
            let alpha = channel.draw_secure_felt();
            line = fold_line(&line, alpha)?;
            inner_layers.push(layer);
        }

        let last_layer_poly = last_layer_poly(&line, config)?;
        channel.mix_felts(last_layer_poly.coeffs());
        debug!(n_inner_layers = inner_layers.len(), "fri layers committed");

        Ok(Self {
            config,
            first_layer,
            inner_layers,
            last_layer_poly,
        })
    }

    pub fn config(&self) -> FriConfig {
        self.config
    }

    /// Log size of the committed circle evaluation.
    pub fn column_log_size(&self) -> u32 {
        self.first_layer.log_size
    }

    /// Draws the query positions and opens every layer at them.
    ///
    /// Returns the proof and the drawn positions in draw order.
    pub fn decommit(self, channel: &mut MC::C) -> FriResult<(FriProof<MC::H>, Vec<usize>)> {
        let _span = debug_span!("fri.decommit").entered();
        let log_size = self.column_log_size();
        let raw_positions = draw_queries(channel, log_size, self.config.n_queries);
        let mut queries = Queries::new(&raw_positions, log_size);

        let first_layer = self.first_layer.decommit(&queries, 0)?;
        let mut inner_layers = Vec::with_capacity(self.inner_layers.len());
        for (index, layer) in self.inner_layers.iter().enumerate() {
            queries = queries.fold(1);
            inner_layers.push(layer.decommit(&queries, index + 1)?);
        }

        let proof = FriProof {
            first_layer,
            inner_layers,
            last_layer_poly: self.last_layer_poly,
        };
        Ok((proof, raw_positions))
    }
}

/// Interpolates the last layer and checks its degree bound.
fn last_layer_poly(evaluation: &LineEvaluation, config: FriConfig) -> FriResult<LinePoly> {
    let mut coeffs = evaluation.interpolate()?.into_ordered_coefficients();
    let bound = 1usize << config.log_last_layer_degree_bound;
    let high = coeffs.split_off(bound.min(coeffs.len()));
    if high.iter().any(|c: &QM31| !c.is_zero()) {
        return Err(FriError::InvalidLastLayerDegree);
    }
    Ok(LinePoly::from_ordered_coefficients(coeffs)?)
}
