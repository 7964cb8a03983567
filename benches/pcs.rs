use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use circle_stark::circle::CirclePoint;
use circle_stark::pcs::{CommitmentSchemeProver, PcsConfig, TreeVec};
use circle_stark::poly::{CanonicCoset, CircleEvaluation};
use circle_stark::{Blake2sChannel, Blake2sMerkleChannel, M31, QM31};

fn make_trace(n_columns: u32, log_size: u32) -> Vec<CircleEvaluation> {
    let domain = CanonicCoset::new(log_size).circle_domain();
    (0..n_columns)
        .map(|column| {
            let values = (0..1u32 << log_size)
                .map(|i| M31::from(i.wrapping_mul(i).wrapping_add(column)))
                .collect();
            CircleEvaluation::new(domain, values).expect("power of two")
        })
        .collect()
}

fn oods_point() -> CirclePoint<QM31> {
    let mut channel = Blake2sChannel::default();
    CirclePoint::get_random_point(&mut channel).expect("point")
}

fn bench_prove(c: &mut Criterion) {
    let config = PcsConfig::default();
    let mut group = c.benchmark_group("pcs_prove");
    group.sample_size(10);
    for log_size in [10u32, 14] {
        let trace = make_trace(16, log_size);
        group.bench_with_input(BenchmarkId::from_parameter(log_size), &trace, |b, trace| {
            b.iter_batched(
                || trace.clone(),
                |trace| {
                    let mut channel = Blake2sChannel::default();
                    config.mix_into(&mut channel);
                    let mut prover =
                        CommitmentSchemeProver::<Blake2sMerkleChannel>::new(config).expect("config");
                    let points = TreeVec::new(vec![vec![vec![oods_point()]; trace.len()]]);
                    prover.commit(trace, &mut channel).expect("commit");
                    prover.prove_values(points, &mut channel).expect("prove")
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_prove);
criterion_main!(benches);
