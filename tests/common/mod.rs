#![allow(dead_code)]

use circle_stark::channel::{Channel, MerkleChannel};
use circle_stark::circle::CirclePoint;
use circle_stark::pcs::{
    CommitmentSchemeProof, CommitmentSchemeProver, CommitmentSchemeVerifier,
    ExtendedCommitmentSchemeProof, PcsConfig, TreeVec, VerificationResult,
};
use circle_stark::poly::{CanonicCoset, CircleEvaluation};
use circle_stark::{Blake2sChannel, M31, QM31};

pub fn column(log_size: u32, seed: u32) -> CircleEvaluation {
    let domain = CanonicCoset::new(log_size).circle_domain();
    let values = (0..1u32 << log_size)
        .map(|i| M31::from(i.wrapping_mul(31).wrapping_add(seed * seed)))
        .collect();
    CircleEvaluation::new(domain, values).expect("power of two")
}

pub fn oods_point() -> CirclePoint<QM31> {
    let mut channel = Blake2sChannel::default();
    channel.mix_u64(0x5eed);
    CirclePoint::get_random_point(&mut channel).expect("off-domain point")
}

pub fn log_sizes(trees: &[Vec<CircleEvaluation>]) -> Vec<Vec<u32>> {
    trees
        .iter()
        .map(|tree| tree.iter().map(CircleEvaluation::log_size).collect())
        .collect()
}

pub fn single_point(
    log_sizes: &[Vec<u32>],
    point: CirclePoint<QM31>,
) -> TreeVec<Vec<Vec<CirclePoint<QM31>>>> {
    log_sizes
        .iter()
        .map(|tree| tree.iter().map(|_| vec![point]).collect())
        .collect()
}

/// Commits `trees` in order after binding the configuration, then opens
/// every column at `point`.
pub fn prove<MC: MerkleChannel>(
    config: PcsConfig,
    trees: Vec<Vec<CircleEvaluation>>,
    point: CirclePoint<QM31>,
) -> ExtendedCommitmentSchemeProof<MC::H> {
    let sizes = log_sizes(&trees);
    let mut channel = MC::C::default();
    config.mix_into(&mut channel);
    let mut prover = CommitmentSchemeProver::<MC>::new(config).expect("config");
    for tree in trees {
        prover.commit(tree, &mut channel).expect("commit");
    }
    prover
        .prove_values(single_point(&sizes, point), &mut channel)
        .expect("prove")
}

pub fn verify<MC: MerkleChannel>(
    config: PcsConfig,
    log_sizes: &[Vec<u32>],
    proof: CommitmentSchemeProof<MC::H>,
    point: CirclePoint<QM31>,
) -> VerificationResult<()> {
    let mut channel = MC::C::default();
    config.mix_into(&mut channel);
    let mut verifier = CommitmentSchemeVerifier::<MC>::new(config)?;
    for (root, sizes) in proof.commitments.iter().zip(log_sizes) {
        verifier.commit(*root, sizes, &mut channel);
    }
    verifier.verify_values(single_point(log_sizes, point), proof, &mut channel)
}
