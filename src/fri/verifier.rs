use std::collections::BTreeMap;

use tracing::{debug_span, warn};

use super::folding::fold_pair;
use super::{FriConfig, FriError, FriLayerProof, FriProof, FriResult};
use crate::channel::{draw_queries, Channel, MerkleChannel, Queries};
use crate::field::{batch_inverse, M31, QM31};
use crate::merkle::{MerkleHasher, MerkleVerifier};
use crate::poly::{CanonicCoset, LineDomain, LinePoly};
use crate::utils::bit_reverse_index;

/// Domain of a committed layer, which decides the folding twiddles.
#[derive(Debug, Clone, Copy)]
enum LayerDomain {
    Circle(CanonicCoset),
    Line(LineDomain),
}

impl LayerDomain {
    fn log_size(&self) -> u32 {
        match self {
            LayerDomain::Circle(coset) => coset.log_size(),
            LayerDomain::Line(domain) => domain.log_size(),
        }
    }

    /// Coordinate whose inverse folds the coset at position `2 * coset`.
    fn twiddle(&self, coset: usize) -> M31 {
        let position = bit_reverse_index(coset << 1, self.log_size());
        match self {
            LayerDomain::Circle(canonic) => canonic.circle_domain().at(position).y,
            LayerDomain::Line(domain) => domain.at(position),
        }
    }
}

#[derive(Debug)]
struct LayerVerifier<H: MerkleHasher> {
    index: usize,
    domain: LayerDomain,
    alpha: QM31,
    proof: FriLayerProof<H>,
}

impl<H: MerkleHasher> LayerVerifier<H> {
    /// Checks the layer opening and folds the queried values.
    ///
    /// `evals` are the layer's values at the sorted `queries`. Returns the
    /// folded queries and their values on the next layer.
    fn verify_and_fold(self, queries: &Queries, evals: &[QM31]) -> FriResult<(Queries, Vec<QM31>)> {
        let layer = self.index;
        let log_size = self.domain.log_size();
        let folded_queries = queries.fold(1);

        let mut witness = self.proof.fri_witness.iter().copied();
        let mut evals = evals.iter().copied();
        let mut coset_positions = Vec::with_capacity(2 * folded_queries.len());
        let mut coset_values = Vec::with_capacity(2 * folded_queries.len());
        for &coset in folded_queries.iter() {
            for position in [2 * coset, 2 * coset + 1] {
                let value = if queries.binary_search(&position).is_ok() {
                    evals.next()
                } else {
                    witness.next()
                };
                coset_values.push(value.ok_or(FriError::WitnessTooShort { layer })?);
                coset_positions.push(position);
            }
        }
        if witness.next().is_some() {
            return Err(FriError::WitnessTooLong { layer });
        }

        let queried_values: Vec<M31> = coset_values
            .iter()
            .flat_map(|value| value.to_m31_array())
            .collect();
        let verifier = MerkleVerifier::<H>::new(self.proof.commitment, vec![log_size; 4]);
        verifier
            .verify(
                &BTreeMap::from([(log_size, coset_positions)]),
                queried_values,
                self.proof.decommitment,
            )
            .map_err(|source| FriError::Merkle { layer, source })?;

        let twiddles: Vec<M31> = folded_queries
            .iter()
            .map(|&coset| self.domain.twiddle(coset))
            .collect();
        let twiddle_invs = batch_inverse(&twiddles)?;
        let folded = coset_values
            .chunks_exact(2)
            .zip(twiddle_invs)
            .map(|(pair, twiddle_inv)| fold_pair(pair[0], pair[1], twiddle_inv, self.alpha))
            .collect();
        Ok((folded_queries, folded))
    }
}

/// Verifier side of FRI.
///
/// Built by [`FriVerifier::commit`] while replaying the prover's commitments,
/// then [`sample_query_positions`](FriVerifier::sample_query_positions) and
/// [`decommit`](FriVerifier::decommit) check the openings.
#[derive(Debug)]
pub struct FriVerifier<MC: MerkleChannel> {
    config: FriConfig,
    layers: Vec<LayerVerifier<MC::H>>,
    last_layer_domain: LineDomain,
    last_layer_poly: LinePoly,
    queries: Option<Queries>,
}

impl<MC: MerkleChannel> FriVerifier<MC> {
    /// Absorbs the proof's commitments, draws the folding challenges and
    /// checks the proof shape.
    pub fn commit(
        channel: &mut MC::C,
        config: FriConfig,
        proof: FriProof<MC::H>,
        column_log_size: u32,
    ) -> FriResult<Self> {
        config.validate()?;
        let last_layer_log_size = config.log_last_layer_domain_size();
        if column_log_size <= last_layer_log_size {
            return Err(FriError::ColumnTooSmall {
                log_size: column_log_size,
                last_layer_log_size,
            });
        }
        let FriProof {
            first_layer,
            inner_layers,
            last_layer_poly,
        } = proof;

        let first_domain = CanonicCoset::try_new(column_log_size)?;
        MC::mix_root(channel, first_layer.commitment);
        let mut layers = vec![LayerVerifier {
            index: 0,
            domain: LayerDomain::Circle(first_domain),
            alpha: channel.draw_secure_felt(),
            proof: first_layer,
        }];

        let expected = (column_log_size - 1 - last_layer_log_size) as usize;
        if inner_layers.len() != expected {
            warn!(expected, got = inner_layers.len(), "unexpected number of fri layers");
            return Err(FriError::InvalidNumFriLayers {
                expected,
                got: inner_layers.len(),
            });
        }

        let mut line_domain = LineDomain::new(first_domain.half_coset());
        for (index, proof) in inner_layers.into_iter().enumerate() {
            MC::mix_root(channel, proof.commitment);
            layers.push(LayerVerifier {
                index: index + 1,
                domain: LayerDomain::Line(line_domain),
                alpha: channel.draw_secure_felt(),
                proof,
            });
            line_domain = line_domain.double();
        }

        if last_layer_poly.len() > 1 << config.log_last_layer_degree_bound {
            warn!(len = last_layer_poly.len(), "last layer polynomial too large");
            return Err(FriError::InvalidLastLayerDegree);
        }
        channel.mix_felts(last_layer_poly.coeffs());

        Ok(Self {
            config,
            layers,
            last_layer_domain: line_domain,
            last_layer_poly,
            queries: None,
        })
    }

    pub fn column_log_size(&self) -> u32 {
        self.layers[0].domain.log_size()
    }

    /// Draws the query positions exactly as the prover does.
    pub fn sample_query_positions(&mut self, channel: &mut MC::C) -> Queries {
        let log_size = self.column_log_size();
        let raw_positions = draw_queries(channel, log_size, self.config.n_queries);
        let queries = Queries::new(&raw_positions, log_size);
        self.queries = Some(queries.clone());
        queries
    }

    /// Checks the openings given the first layer's values at the sampled
    /// queries, in sorted query order.
    pub fn decommit(self, first_layer_query_evals: &[QM31]) -> FriResult<()> {
        let _span = debug_span!("fri.verify", n_layers = self.layers.len()).entered();
        let mut queries = self.queries.ok_or(FriError::QueriesNotSampled)?;
        if first_layer_query_evals.len() != queries.len() {
            return Err(FriError::QueryCountMismatch {
                expected: queries.len(),
                got: first_layer_query_evals.len(),
            });
        }

        let mut evals = first_layer_query_evals.to_vec();
        for layer in self.layers {
            (queries, evals) = layer.verify_and_fold(&queries, &evals)?;
        }

        let log_size = self.last_layer_domain.log_size();
        for (&position, &value) in queries.iter().zip(&evals) {
            let x = self.last_layer_domain.at(bit_reverse_index(position, log_size));
            if self.last_layer_poly.eval_at_point(x.into()) != value {
                warn!(position, "folded value disagrees with the last layer");
                return Err(FriError::LastLayerEvaluationsInvalid);
            }
        }
        Ok(())
    }
}
