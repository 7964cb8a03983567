use super::*;
use crate::channel::{
    Blake2sChannel, Blake2sMerkleChannel, Blake3MerkleChannel, Channel, MerkleChannel, Queries,
};
use crate::circle::{CirclePoint, CirclePointIndex};
use crate::field::{M31, QM31};
use crate::fri::{FriConfig, FriError};
use crate::merkle::MerkleError;
use crate::poly::{CanonicCoset, CircleEvaluation};

type MC = Blake2sMerkleChannel;

fn constant_column(log_size: u32, value: u32) -> CircleEvaluation {
    let domain = CanonicCoset::new(log_size).circle_domain();
    CircleEvaluation::new(domain, vec![M31::from(value); 1 << log_size]).expect("size")
}

fn trace_column(log_size: u32, seed: u32) -> CircleEvaluation {
    let domain = CanonicCoset::new(log_size).circle_domain();
    let values = (0..1u32 << log_size)
        .map(|i| M31::from(i.wrapping_mul(i).wrapping_add(seed)))
        .collect();
    CircleEvaluation::new(domain, values).expect("size")
}

fn sample_point() -> CirclePoint<QM31> {
    let mut channel = Blake2sChannel::default();
    channel.mix_u64(42);
    CirclePoint::get_random_point(&mut channel).expect("point")
}

fn points_for(log_sizes: &[Vec<u32>], point: CirclePoint<QM31>) -> TreeVec<Vec<Vec<CirclePoint<QM31>>>> {
    log_sizes
        .iter()
        .map(|tree| tree.iter().map(|_| vec![point]).collect())
        .collect()
}

fn prove_with<M: MerkleChannel>(
    config: PcsConfig,
    trees: Vec<Vec<CircleEvaluation>>,
    point: CirclePoint<QM31>,
) -> PcsResult<ExtendedCommitmentSchemeProof<M::H>> {
    let log_sizes: Vec<Vec<u32>> = trees
        .iter()
        .map(|tree| tree.iter().map(CircleEvaluation::log_size).collect())
        .collect();
    let mut channel = M::C::default();
    let mut prover = CommitmentSchemeProver::<M>::new(config)?;
    for tree in trees {
        prover.commit(tree, &mut channel)?;
    }
    prover.prove_values(points_for(&log_sizes, point), &mut channel)
}

fn prove(
    config: PcsConfig,
    trees: Vec<Vec<CircleEvaluation>>,
    point: CirclePoint<QM31>,
) -> ExtendedCommitmentSchemeProof<<MC as MerkleChannel>::H> {
    prove_with::<MC>(config, trees, point).expect("prove")
}

fn verify_with<M: MerkleChannel>(
    config: PcsConfig,
    log_sizes: &[Vec<u32>],
    proof: CommitmentSchemeProof<M::H>,
    point: CirclePoint<QM31>,
) -> VerificationResult<()> {
    let mut channel = M::C::default();
    let mut verifier = CommitmentSchemeVerifier::<M>::new(config)?;
    for (root, sizes) in proof.commitments.iter().zip(log_sizes) {
        verifier.commit(*root, sizes, &mut channel);
    }
    verifier.verify_values(points_for(log_sizes, point), proof, &mut channel)
}

fn verify(
    config: PcsConfig,
    log_sizes: &[Vec<u32>],
    proof: CommitmentSchemeProof<<MC as MerkleChannel>::H>,
    point: CirclePoint<QM31>,
) -> VerificationResult<()> {
    verify_with::<MC>(config, log_sizes, proof, point)
}

#[test]
fn constant_column_round_trip() {
    let config = PcsConfig::default();
    let point = sample_point();
    let proof = prove(config, vec![vec![constant_column(3, 5)]], point);

    assert_eq!(
        proof.proof.sampled_values[0][0],
        vec![QM31::from(M31::from(5u32))]
    );
    verify(config, &[vec![3]], proof.proof, point).expect("valid proof");
}

#[test]
fn two_point_columns_round_trip() {
    let config = PcsConfig::default();
    let point = sample_point();
    let trees = vec![vec![trace_column(3, 1), trace_column(1, 7)]];
    let proof = prove(config, trees, point);
    verify(config, &[vec![3, 1]], proof.proof, point).expect("valid proof");
}

#[test]
fn wrong_sample_fails_the_degree_check() {
    let config = PcsConfig::default();
    let point = sample_point();
    let mut channel = Blake2sChannel::default();
    let mut prover = CommitmentSchemeProver::<MC>::new(config).expect("config");
    prover
        .commit(vec![constant_column(3, 5)], &mut channel)
        .expect("commit");
    let samples = TreeVec::new(vec![vec![vec![PointSample {
        point,
        value: QM31::from(M31::from(6u32)),
    }]]]);
    assert_eq!(
        prover.prove_values_with_samples(samples, &mut channel).err(),
        Some(PcsError::Fri(FriError::InvalidLastLayerDegree))
    );
}

#[test]
fn tampered_sampled_value_is_rejected() {
    let config = PcsConfig::default();
    let point = sample_point();
    let mut proof = prove(config, vec![vec![constant_column(3, 5)]], point).proof;
    proof.sampled_values[0][0][0] = QM31::from(M31::from(6u32));
    assert!(verify(config, &[vec![3]], proof, point).is_err());
}

#[test]
fn proving_is_deterministic() {
    let config = PcsConfig::default();
    let point = sample_point();
    let trees = || vec![vec![trace_column(4, 1), trace_column(3, 2)]];
    let first = prove(config, trees(), point);
    let second = prove(config, trees(), point);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.proof).expect("json"),
        serde_json::to_string(&second.proof).expect("json")
    );
}

#[test]
fn blowup_extends_columns() {
    let config = PcsConfig {
        pow_bits: 0,
        fri_config: FriConfig::new(2, 0, 4).expect("fri config"),
    };
    let point = sample_point();
    let mut channel = Blake2sChannel::default();
    let mut prover = CommitmentSchemeProver::<MC>::new(config).expect("config");
    prover
        .commit(vec![trace_column(3, 7)], &mut channel)
        .expect("commit");

    let column = &prover.trees[0].columns[0];
    assert_eq!(column.log_size, 3);
    assert_eq!(column.extended_log_size(), 5);
    assert_eq!(column.evaluation.len(), 32);
    assert_eq!(prover.column_log_sizes().0, vec![vec![5]]);

    let proof = prover
        .prove_values(points_for(&[vec![3]], point), &mut channel)
        .expect("prove");
    verify(config, &[vec![3]], proof.proof, point).expect("valid proof");
}

#[test]
fn twiddle_trees_are_built_per_extended_size() {
    let config = PcsConfig {
        pow_bits: 0,
        fri_config: FriConfig::new(1, 0, 4).expect("fri config"),
    };
    let mut channel = Blake2sChannel::default();
    let mut prover = CommitmentSchemeProver::<MC>::new(config).expect("config");
    prover
        .commit(
            vec![trace_column(3, 1), trace_column(4, 2), trace_column(4, 3)],
            &mut channel,
        )
        .expect("commit");
    assert_eq!(prover.twiddles().len(), 2);

    let unextended = PcsConfig {
        pow_bits: 0,
        fri_config: FriConfig::new(0, 0, 4).expect("fri config"),
    };
    let mut prover = CommitmentSchemeProver::<MC>::new(unextended).expect("config");
    prover
        .commit(vec![trace_column(3, 1)], &mut channel)
        .expect("commit");
    assert!(prover.twiddles().is_empty());
}

#[test]
fn mixed_sizes_and_trees_round_trip() {
    let config = PcsConfig::default();
    let point = sample_point();
    let trees = vec![
        vec![trace_column(3, 1), trace_column(2, 9)],
        vec![trace_column(4, 3), trace_column(4, 4), trace_column(3, 5)],
        vec![trace_column(4, 6)],
    ];
    let log_sizes = vec![vec![3, 2], vec![4, 4, 3], vec![4]];
    let proof = prove(config, trees, point);

    let lifting = 4 + config.fri_config.log_blowup_factor;
    let queries = Queries::new(&proof.aux.unsorted_query_locations, lifting);
    let mut expected = prepare_preprocessed_query_positions(&queries, lifting, lifting - 1);
    expected.sort_unstable();
    expected.dedup();
    assert_eq!(proof.aux.trace_queries[0][&(lifting - 1)], expected);
    assert_eq!(proof.aux.trace_queries[1][&lifting], queries.positions);

    verify(config, &log_sizes, proof.proof, point).expect("valid proof");
}

#[test]
fn stored_coefficients_give_the_same_proof() {
    let config = PcsConfig::default();
    let point = sample_point();
    let columns = || vec![trace_column(4, 11), trace_column(3, 12)];

    let barycentric = prove(config, vec![columns()], point);

    let mut channel = Blake2sChannel::default();
    let mut prover = CommitmentSchemeProver::<MC>::new(config).expect("config");
    prover.set_store_polynomials_coefficients();
    prover.commit(columns(), &mut channel).expect("commit");
    assert!(prover.trees[0].columns.iter().all(|c| c.coefficients.is_some()));
    let direct = prover
        .prove_values(points_for(&[vec![4, 3]], point), &mut channel)
        .expect("prove");

    assert_eq!(barycentric, direct);
}

#[test]
fn committing_polynomials_matches_evaluations() {
    let config = PcsConfig::default();
    let column = trace_column(4, 21);
    let poly = column.interpolate_default().expect("interpolate");

    let mut channel = Blake2sChannel::default();
    let mut from_evaluations = CommitmentSchemeProver::<MC>::new(config).expect("config");
    from_evaluations.commit(vec![column], &mut channel).expect("commit");

    let mut other_channel = Blake2sChannel::default();
    let mut from_polys = CommitmentSchemeProver::<MC>::new(config).expect("config");
    from_polys.commit_polys(vec![poly], &mut other_channel).expect("commit");

    assert_eq!(from_evaluations.roots(), from_polys.roots());
    assert_eq!(channel, other_channel);
}

#[test]
fn only_the_preprocessed_tree_may_be_smaller() {
    let point = sample_point();
    let result = prove_with::<MC>(
        PcsConfig::default(),
        vec![vec![trace_column(4, 1)], vec![trace_column(3, 2)]],
        point,
    );
    assert_eq!(
        result.err(),
        Some(PcsError::UnsupportedTreeLogSize {
            tree: 1,
            log_size: 4,
            lifting_log_size: 5
        })
    );
}

#[test]
fn tampered_queried_value_is_rejected() {
    let config = PcsConfig::default();
    let point = sample_point();
    let mut proof = prove(config, vec![vec![trace_column(4, 3)]], point).proof;
    proof.queried_values[0][0] += M31::from(1u32);
    assert_eq!(
        verify(config, &[vec![4]], proof, point),
        Err(VerificationError::Merkle {
            tree: 0,
            source: MerkleError::RootMismatch
        })
    );
}

#[test]
fn invalid_proof_of_work_is_rejected() {
    let config = PcsConfig {
        pow_bits: 12,
        ..PcsConfig::default()
    };
    let point = sample_point();
    let mut proof = prove(config, vec![vec![trace_column(3, 3)]], point).proof;
    // Grinding returns the smallest valid nonce.
    assert!(proof.proof_of_work > 0);
    proof.proof_of_work -= 1;
    assert_eq!(
        verify(config, &[vec![3]], proof, point),
        Err(VerificationError::ProofOfWork)
    );
}

#[test]
fn configuration_must_match() {
    let config = PcsConfig::default();
    let point = sample_point();
    let proof = prove(config, vec![vec![trace_column(3, 3)]], point).proof;
    let other = PcsConfig {
        pow_bits: 4,
        ..config
    };
    assert_eq!(
        verify(other, &[vec![3]], proof, point),
        Err(VerificationError::ConfigMismatch)
    );
}

#[test]
fn shapes_are_checked() {
    let config = PcsConfig::default();
    let point = sample_point();

    let mut channel = Blake2sChannel::default();
    let prover = CommitmentSchemeProver::<MC>::new(config).expect("config");
    assert_eq!(
        prover
            .prove_values(TreeVec::default(), &mut channel)
            .err(),
        Some(PcsError::NoColumns)
    );

    let mut prover = CommitmentSchemeProver::<MC>::new(config).expect("config");
    prover
        .commit(vec![trace_column(3, 1), trace_column(3, 2)], &mut channel)
        .expect("commit");
    assert_eq!(
        prover
            .prove_values(points_for(&[vec![3]], point), &mut channel)
            .err(),
        Some(PcsError::ShapeMismatch {
            what: "sampled columns",
            expected: 2,
            got: 1
        })
    );

    let proof = prove(config, vec![vec![trace_column(3, 3)]], point).proof;
    assert!(matches!(
        verify(config, &[vec![3], vec![3]], proof, point),
        Err(VerificationError::ShapeMismatch { .. })
    ));
}

#[test]
fn base_field_sample_points_are_rejected() {
    let config = PcsConfig::default();
    let point = CirclePointIndex(77).to_point().into_ef();
    let mut channel = Blake2sChannel::default();
    let mut prover = CommitmentSchemeProver::<MC>::new(config).expect("config");
    prover.set_store_polynomials_coefficients();
    prover
        .commit(vec![trace_column(3, 1)], &mut channel)
        .expect("commit");
    assert_eq!(
        prover
            .prove_values(points_for(&[vec![3]], point), &mut channel)
            .err(),
        Some(PcsError::DegenerateSample)
    );
}

#[test]
fn blake3_round_trip() {
    let config = PcsConfig::default();
    let point = sample_point();
    let proof = prove_with::<Blake3MerkleChannel>(config, vec![vec![trace_column(4, 8)]], point)
        .expect("prove");
    verify_with::<Blake3MerkleChannel>(config, &[vec![4]], proof.proof, point).expect("valid proof");
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_and_serial_proofs_agree() {
    let config = PcsConfig::default();
    let point = sample_point();
    let trees = || vec![vec![trace_column(6, 1), trace_column(5, 2)]];
    let parallel = prove(config, trees(), point);
    let serial = {
        let _guard = crate::utils::set_parallelism(false);
        prove(config, trees(), point)
    };
    assert_eq!(parallel, serial);
}
