use std::collections::BTreeSet;

use tracing::{debug, debug_span};

use super::quotients::compute_fri_quotients;
use super::utils::{lifting_log_size, tree_queries};
use super::{
    CommitmentSchemeProof, CommitmentSchemeProofAux, ExtendedCommitmentSchemeProof, PcsConfig,
    PcsError, PcsResult, PointSample, TreeVec,
};
use crate::channel::{grind, Channel, MerkleChannel, Queries};
use crate::circle::CirclePoint;
use crate::fft::TwiddleCache;
use crate::field::{M31, QM31};
use crate::fri::FriProver;
use crate::merkle::{MerkleDecommitment, MerkleHasher, MerkleProver, QueriesPerLogSize};
use crate::poly::{BarycentricCache, CanonicCoset, CircleEvaluation, CirclePoly};

/// A column as committed: its evaluation over the extended domain and,
/// when the prover stores them, its coefficients.
#[derive(Debug, Clone)]
pub struct CommittedColumn {
    /// Log size the column was committed with, before the blowup.
    pub log_size: u32,
    pub evaluation: CircleEvaluation,
    pub coefficients: Option<CirclePoly>,
}

impl CommittedColumn {
    pub fn extended_log_size(&self) -> u32 {
        self.evaluation.log_size()
    }

    /// Evaluates the column's polynomial at an off-domain point.
    pub fn eval_at_point(
        &self,
        point: CirclePoint<QM31>,
        barycentric: &BarycentricCache,
    ) -> PcsResult<QM31> {
        if let Some(coefficients) = &self.coefficients {
            return Ok(coefficients.eval_at_point(point));
        }
        let weights = barycentric.get(self.extended_log_size(), point)?;
        Ok(self.evaluation.barycentric_eval_at_point(&weights)?)
    }
}

/// Input of one tree commitment.
enum ColumnSource {
    Evaluation(CircleEvaluation),
    Coefficients(CirclePoly),
}

impl ColumnSource {
    /// Log size of the extended domain, if the column gets re-evaluated.
    fn extension_log_size(&self, log_blowup_factor: u32, store_coefficients: bool) -> Option<u32> {
        match self {
            Self::Evaluation(_) if log_blowup_factor == 0 && !store_coefficients => None,
            Self::Evaluation(evaluation) => Some(evaluation.log_size() + log_blowup_factor),
            Self::Coefficients(poly) => Some(poly.log_size() + log_blowup_factor),
        }
    }
}

fn extend_column(
    index: usize,
    source: ColumnSource,
    log_blowup_factor: u32,
    twiddles: &TwiddleCache,
    store_coefficients: bool,
) -> PcsResult<CommittedColumn> {
    let (log_size, poly) = match source {
        ColumnSource::Evaluation(evaluation) => {
            if !evaluation.domain.is_canonic() {
                return Err(PcsError::NonCanonicDomain { column: index });
            }
            let log_size = evaluation.log_size();
            if log_blowup_factor == 0 && !store_coefficients {
                return Ok(CommittedColumn {
                    log_size,
                    evaluation,
                    coefficients: None,
                });
            }
            let twiddle_tree = twiddles.get(log_size + log_blowup_factor)?;
            (log_size, evaluation.interpolate(&twiddle_tree)?)
        }
        ColumnSource::Coefficients(poly) => (poly.log_size(), poly),
    };

    let extended_log_size = log_size + log_blowup_factor;
    let domain = CanonicCoset::try_new(extended_log_size)?.circle_domain();
    let twiddle_tree = twiddles.get(extended_log_size)?;
    let evaluation = poly.evaluate(domain, &twiddle_tree)?;
    Ok(CommittedColumn {
        log_size,
        evaluation,
        coefficients: store_coefficients.then_some(poly),
    })
}

/// A committed tree: its columns and their Merkle commitment.
#[derive(Debug)]
pub struct CommitmentTreeProver<MC: MerkleChannel> {
    pub columns: Vec<CommittedColumn>,
    pub commitment: MerkleProver<MC::H>,
}

impl<MC: MerkleChannel> CommitmentTreeProver<MC> {
    fn new(columns: Vec<CommittedColumn>) -> PcsResult<Self> {
        let values: Vec<&[M31]> = columns.iter().map(|c| c.evaluation.values.as_slice()).collect();
        let commitment = MerkleProver::commit(&values)?;
        Ok(Self {
            columns,
            commitment,
        })
    }

    pub fn root(&self) -> <MC::H as MerkleHasher>::Hash {
        self.commitment.root()
    }

    /// Extended log sizes of the columns, in commit order.
    pub fn column_log_sizes(&self) -> Vec<u32> {
        self.columns.iter().map(CommittedColumn::extended_log_size).collect()
    }

    fn decommit(
        &self,
        queries: &QueriesPerLogSize,
    ) -> PcsResult<(Vec<M31>, MerkleDecommitment<MC::H>)> {
        let values: Vec<&[M31]> = self
            .columns
            .iter()
            .map(|c| c.evaluation.values.as_slice())
            .collect();
        Ok(self.commitment.decommit(queries, &values)?)
    }
}

/// Proving side of the commitment scheme.
///
/// Trees are committed in order with [`commit`](Self::commit) or
/// [`commit_polys`](Self::commit_polys); [`prove_values`](Self::prove_values)
/// consumes the prover and produces the opening proof.
#[derive(Debug)]
pub struct CommitmentSchemeProver<MC: MerkleChannel> {
    pub trees: TreeVec<CommitmentTreeProver<MC>>,
    config: PcsConfig,
    twiddles: TwiddleCache,
    barycentric: BarycentricCache,
    store_coefficients: bool,
}

impl<MC: MerkleChannel> CommitmentSchemeProver<MC> {
    pub fn new(config: PcsConfig) -> PcsResult<Self> {
        config.validate()?;
        Ok(Self {
            trees: TreeVec::default(),
            config,
            twiddles: TwiddleCache::new(),
            barycentric: BarycentricCache::new(),
            store_coefficients: false,
        })
    }

    /// Keeps the interpolated coefficients of every later commitment so that
    /// samples are evaluated directly instead of through barycentric weights.
    pub fn set_store_polynomials_coefficients(&mut self) {
        self.store_coefficients = true;
    }

    pub fn config(&self) -> PcsConfig {
        self.config
    }

    /// Twiddle trees built so far in this session.
    pub fn twiddles(&self) -> &TwiddleCache {
        &self.twiddles
    }

    /// Commits to evaluations over canonic circle domains, extending them by
    /// the blowup factor, and mixes the root into `channel`.
    pub fn commit(&mut self, columns: Vec<CircleEvaluation>, channel: &mut MC::C) -> PcsResult<()> {
        self.commit_sources(columns.into_iter().map(ColumnSource::Evaluation).collect(), channel)
    }

    /// Commits to polynomials evaluated over their blown-up canonic domains.
    pub fn commit_polys(&mut self, polys: Vec<CirclePoly>, channel: &mut MC::C) -> PcsResult<()> {
        self.commit_sources(polys.into_iter().map(ColumnSource::Coefficients).collect(), channel)
    }

    fn commit_sources(&mut self, sources: Vec<ColumnSource>, channel: &mut MC::C) -> PcsResult<()> {
        let _span = debug_span!(
            "pcs.commit",
            tree = self.trees.len(),
            n_columns = sources.len()
        )
        .entered();
        let log_blowup_factor = self.config.fri_config.log_blowup_factor;
        let store_coefficients = self.store_coefficients;
        // Extension jobs only read the cache; a job building a tree under the
        // lock could otherwise be re-entered by a stolen job on its thread.
        let extension_log_sizes: BTreeSet<u32> = sources
            .iter()
            .filter_map(|source| source.extension_log_size(log_blowup_factor, store_coefficients))
            .collect();
        for log_size in extension_log_sizes {
            self.twiddles.get(log_size)?;
        }
        let twiddles = &self.twiddles;
        let extend = |(index, source): (usize, ColumnSource)| {
            extend_column(index, source, log_blowup_factor, twiddles, store_coefficients)
        };

        #[cfg(feature = "parallel")]
        let columns: PcsResult<Vec<CommittedColumn>> = if crate::utils::parallelism_enabled() {
            use rayon::prelude::*;
            sources.into_par_iter().enumerate().map(extend).collect()
        } else {
            sources.into_iter().enumerate().map(extend).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let columns: PcsResult<Vec<CommittedColumn>> =
            sources.into_iter().enumerate().map(extend).collect();

        let tree = CommitmentTreeProver::<MC>::new(columns?)?;
        debug!(log_sizes = ?tree.column_log_sizes(), "committed tree");
        MC::mix_root(channel, tree.root());
        self.trees.push(tree);
        Ok(())
    }

    pub fn roots(&self) -> TreeVec<<MC::H as MerkleHasher>::Hash> {
        self.trees.iter().map(CommitmentTreeProver::root).collect()
    }

    /// Extended log sizes of all committed columns.
    pub fn column_log_sizes(&self) -> TreeVec<Vec<u32>> {
        self.trees.iter().map(CommitmentTreeProver::column_log_sizes).collect()
    }

    /// Evaluates every column at its sample points and opens the commitment.
    ///
    /// `sampled_points[tree][column]` lists the points of one column. A
    /// column of extended log size `e` is evaluated at the `(L - e)`-fold
    /// doubling of each point, `L` being the lifting log size.
    pub fn prove_values(
        self,
        sampled_points: TreeVec<Vec<Vec<CirclePoint<QM31>>>>,
        channel: &mut MC::C,
    ) -> PcsResult<ExtendedCommitmentSchemeProof<MC::H>> {
        let lifting = lifting_log_size(&self.column_log_sizes())?;
        check_shape(&self.column_log_sizes(), &sampled_points)?;

        let mut samples = Vec::with_capacity(self.trees.len());
        for (tree, tree_points) in self.trees.iter().zip(sampled_points.iter()) {
            let mut tree_samples = Vec::with_capacity(tree.columns.len());
            for (column, points) in tree.columns.iter().zip(tree_points) {
                let shift = lifting - column.extended_log_size();
                let column_samples = points
                    .iter()
                    .map(|&point| {
                        let value = column.eval_at_point(point.repeated_double(shift), &self.barycentric)?;
                        Ok(PointSample { point, value })
                    })
                    .collect::<PcsResult<Vec<_>>>()?;
                tree_samples.push(column_samples);
            }
            samples.push(tree_samples);
        }
        self.prove_values_with_samples(TreeVec::new(samples), channel)
    }

    /// Opens the commitment for caller-provided samples.
    ///
    /// The values are taken as claimed; samples that are not evaluations of
    /// the committed columns make FRI fail with
    /// [`InvalidLastLayerDegree`](crate::fri::FriError::InvalidLastLayerDegree).
    pub fn prove_values_with_samples(
        self,
        samples: TreeVec<Vec<Vec<PointSample>>>,
        channel: &mut MC::C,
    ) -> PcsResult<ExtendedCommitmentSchemeProof<MC::H>> {
        let _span = debug_span!("pcs.prove_values", n_trees = self.trees.len()).entered();
        let column_log_sizes = self.column_log_sizes();
        let lifting = lifting_log_size(&column_log_sizes)?;
        check_shape(&column_log_sizes, &samples)?;

        let sampled_values: TreeVec<Vec<Vec<QM31>>> = samples
            .as_ref()
            .map(|tree| {
                tree.iter()
                    .map(|column| column.iter().map(|sample| sample.value).collect())
                    .collect()
            });
        channel.mix_felts(&sampled_values.clone().flatten_cols());
        let random_coeff = channel.draw_secure_felt();

        let columns: Vec<(&[M31], u32)> = self
            .trees
            .iter()
            .flat_map(|tree| &tree.columns)
            .map(|c| (c.evaluation.values.as_slice(), c.extended_log_size()))
            .collect();
        let quotients = compute_fri_quotients(&columns, &samples.flatten(), random_coeff, lifting)?;

        let fri_prover = FriProver::<MC>::commit(channel, self.config.fri_config, quotients)?;
        let proof_of_work = grind(channel, self.config.pow_bits);
        debug!(proof_of_work, "found proof-of-work nonce");
        channel.mix_u64(proof_of_work);
        let (fri_proof, unsorted_query_locations) = fri_prover.decommit(channel)?;
        let queries = Queries::new(&unsorted_query_locations, lifting);

        let mut trace_queries = Vec::with_capacity(self.trees.len());
        let mut queried_values = Vec::with_capacity(self.trees.len());
        let mut decommitments = Vec::with_capacity(self.trees.len());
        for (index, (tree, log_sizes)) in self.trees.iter().zip(column_log_sizes.iter()).enumerate() {
            let tree_positions = tree_queries(&queries, lifting, index, log_sizes)?;
            let (values, decommitment) = tree.decommit(&tree_positions)?;
            trace_queries.push(tree_positions);
            queried_values.push(values);
            decommitments.push(decommitment);
        }

        Ok(ExtendedCommitmentSchemeProof {
            proof: CommitmentSchemeProof {
                config: self.config,
                commitments: self.roots(),
                sampled_values,
                decommitments: TreeVec::new(decommitments),
                queried_values: TreeVec::new(queried_values),
                proof_of_work,
                fri_proof,
            },
            aux: CommitmentSchemeProofAux {
                unsorted_query_locations,
                trace_queries: TreeVec::new(trace_queries),
            },
        })
    }
}

/// Checks that `per_column` has one entry per committed column.
fn check_shape<T>(column_log_sizes: &TreeVec<Vec<u32>>, per_column: &TreeVec<Vec<T>>) -> PcsResult<()> {
    if per_column.len() != column_log_sizes.len() {
        return Err(PcsError::ShapeMismatch {
            what: "sampled trees",
            expected: column_log_sizes.len(),
            got: per_column.len(),
        });
    }
    for (log_sizes, columns) in column_log_sizes.iter().zip(per_column.iter()) {
        if log_sizes.len() != columns.len() {
            return Err(PcsError::ShapeMismatch {
                what: "sampled columns",
                expected: log_sizes.len(),
                got: columns.len(),
            });
        }
    }
    Ok(())
}
