mod common;

use circle_stark::config::{validate, PROFILE_TEST_CONFIG};
use circle_stark::field::SECURE_EXTENSION_DEGREE;
use circle_stark::pcs::{CommitmentSchemeProver, PcsConfig, PcsError, VerificationError};
use circle_stark::poly::CircleEvaluation;
use circle_stark::{
    Blake2sChannel, Blake2sMerkleChannel, Blake3MerkleChannel, CommitmentSchemeVerifier, StarkProof,
    QM31,
};
use common::{column, log_sizes, oods_point, prove, verify};

const COMPOSITION_LOG_SIZE: u32 = 5;

fn composition_tree() -> Vec<CircleEvaluation> {
    (0..2 * SECURE_EXTENSION_DEGREE as u32)
        .map(|i| column(COMPOSITION_LOG_SIZE, 100 + i))
        .collect()
}

/// Preprocessed, trace and composition trees, the preprocessed one smaller
/// than the rest.
fn session_trees() -> Vec<Vec<CircleEvaluation>> {
    vec![
        vec![column(3, 1)],
        vec![column(5, 2), column(4, 3), column(2, 4)],
        composition_tree(),
    ]
}

fn expected_composition_eval() -> QM31 {
    let point = oods_point();
    let evals: Vec<QM31> = composition_tree()
        .iter()
        .map(|column| {
            column
                .interpolate_default()
                .expect("interpolate")
                .eval_at_point(point)
        })
        .collect();
    let left = QM31::from_partial_evals([evals[0], evals[1], evals[2], evals[3]]);
    let right = QM31::from_partial_evals([evals[4], evals[5], evals[6], evals[7]]);
    left + point.repeated_double(COMPOSITION_LOG_SIZE - 2).x * right
}

#[test]
fn session_with_preprocessed_tree_verifies() {
    let config = PROFILE_TEST_CONFIG.pcs;
    validate(&config).expect("test profile is valid");
    let trees = session_trees();
    let sizes = log_sizes(&trees);
    let extended = prove::<Blake2sMerkleChannel>(config, trees, oods_point());

    assert_eq!(extended.proof.commitments.len(), 3);
    assert_eq!(extended.aux.trace_queries.len(), 3);
    verify::<Blake2sMerkleChannel>(config, &sizes, extended.proof, oods_point())
        .expect("valid session");
}

#[test]
fn composition_value_is_recovered_from_the_last_tree() {
    let config = PcsConfig::default();
    let proof = StarkProof(prove::<Blake2sMerkleChannel>(config, session_trees(), oods_point()).proof);

    let expected = expected_composition_eval();
    assert_eq!(
        proof.extract_composition_oods_eval(oods_point(), COMPOSITION_LOG_SIZE),
        Some(expected)
    );
    proof
        .check_composition_oods(oods_point(), COMPOSITION_LOG_SIZE, expected)
        .expect("constraints hold");
    assert_eq!(
        proof.check_composition_oods(
            oods_point(),
            COMPOSITION_LOG_SIZE,
            expected + QM31::from_u32_unchecked(1, 0, 0, 0)
        ),
        Err(VerificationError::ConstraintsNotSatisfied)
    );
}

#[test]
fn blake3_commitments_verify() {
    let config = PcsConfig::default();
    let trees = session_trees();
    let sizes = log_sizes(&trees);
    let extended = prove::<Blake3MerkleChannel>(config, trees, oods_point());
    verify::<Blake3MerkleChannel>(config, &sizes, extended.proof, oods_point())
        .expect("valid session");
}

#[test]
fn only_the_preprocessed_tree_may_be_smaller() {
    let config = PcsConfig::default();
    let mut channel = Blake2sChannel::default();
    let mut prover = CommitmentSchemeProver::<Blake2sMerkleChannel>::new(config).expect("config");
    prover.commit(vec![column(5, 1)], &mut channel).expect("commit");
    prover.commit(vec![column(3, 2)], &mut channel).expect("commit");

    let points = common::single_point(&[vec![5], vec![3]], oods_point());
    assert_eq!(
        prover.prove_values(points, &mut channel).map(|_| ()),
        Err(PcsError::UnsupportedTreeLogSize {
            tree: 1,
            log_size: 4,
            lifting_log_size: 6,
        })
    );
}

#[test]
fn proofs_are_bound_to_the_configuration() {
    let config = PcsConfig::default();
    let trees = session_trees();
    let sizes = log_sizes(&trees);
    let proof = prove::<Blake2sMerkleChannel>(config, trees, oods_point()).proof;

    let mut other = config;
    other.pow_bits += 1;
    assert_eq!(
        verify::<Blake2sMerkleChannel>(other, &sizes, proof.clone(), oods_point()),
        Err(VerificationError::ConfigMismatch)
    );

    // Same configuration, but the verifier's transcript never absorbed it.
    let mut channel = Blake2sChannel::default();
    let mut verifier =
        CommitmentSchemeVerifier::<Blake2sMerkleChannel>::new(config).expect("config");
    for (root, sizes) in proof.commitments.iter().zip(&sizes) {
        verifier.commit(*root, sizes, &mut channel);
    }
    let points = common::single_point(&sizes, oods_point());
    assert!(verifier.verify_values(points, proof, &mut channel).is_err());
}
