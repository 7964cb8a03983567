use proptest::prelude::*;

use super::{
    batch_inverse, fold_mle_evals, Field, FieldError, FieldExpOps, CM31, M31, P, QM31,
};

fn qm31(a: u32, b: u32, c: u32, d: u32) -> QM31 {
    QM31::from_m31(a.into(), b.into(), c.into(), d.into())
}

#[test]
fn modulus_reduces_to_zero() {
    assert_eq!(M31::from(P), M31::ZERO);
    assert_eq!(M31::from(P + 5), M31::from(5u32));
    assert_eq!(M31::from_u64(u64::MAX), M31::from_u64(u64::MAX % P as u64));
}

#[test]
fn partial_reduction_is_const() {
    const REDUCED: M31 = M31::partial_reduce(P + 3);
    const UNCHANGED: M31 = M31::partial_reduce(P - 1);
    assert_eq!(REDUCED, M31::from(3u32));
    assert_eq!(UNCHANGED.0, P - 1);
}

#[test]
fn deserialization_rejects_non_canonical_values() {
    assert_eq!(serde_json::from_str::<M31>("7").expect("canonical"), M31::from(7u32));
    assert_eq!(serde_json::to_string(&M31::from(7u32)).expect("serialize"), "7");
    assert!(serde_json::from_str::<M31>(&P.to_string()).is_err());
    assert!(serde_json::from_str::<M31>("4294967295").is_err());
    assert_eq!(M31::try_from_canonical(P), Err(FieldError::NonCanonical { value: P }));

    let encoded = format!("[[{P},0],[0,0]]");
    assert!(serde_json::from_str::<QM31>(&encoded).is_err());
}

#[test]
fn m31_arithmetic_ok() {
    let a = M31::from(P - 1);
    let b = M31::from(3u32);
    assert_eq!(a + b, M31::from(2u32));
    assert_eq!(b - a, M31::from(4u32));
    assert_eq!(-M31::ZERO, M31::ZERO);
    assert_eq!(a * a, M31::ONE);
    assert_eq!(M31::from(-1i32), a);
}

#[test]
fn m31_inverse_and_division_by_zero() {
    let x = M31::from(19u32);
    let inv = x.try_inverse().expect("non-zero element");
    assert_eq!(x * inv, M31::ONE);
    assert_eq!(M31::ZERO.try_inverse(), Err(FieldError::DivisionByZero));
    assert_eq!(x.try_div(M31::ZERO), Err(FieldError::DivisionByZero));
}

#[test]
fn pow2_inverse_matches_fermat() {
    for log in 0..40 {
        let two_pow = M31::from(2u32).pow(log as u128);
        assert_eq!(M31::pow2_inverse(log) * two_pow, M31::ONE, "log {log}");
    }
}

#[test]
fn reject_noncanonical_bytes_err() {
    let err = M31::from_le_bytes(P.to_le_bytes()).expect_err("P is not canonical");
    assert_eq!(err, FieldError::NonCanonical { value: P });
    assert_eq!(
        err.to_string(),
        format!("non-canonical field element encoding: {P}")
    );
    let ok = M31::from_le_bytes(7u32.to_le_bytes()).expect("canonical");
    assert_eq!(ok, M31::from(7u32));
}

#[test]
fn cm31_i_squared_is_minus_one() {
    let i = CM31::from_u32_unchecked(0, 1);
    assert_eq!(i * i, -CM31::ONE);
    let z = CM31::from_u32_unchecked(5, 9);
    assert_eq!(z * z.try_inverse().expect("non-zero"), CM31::ONE);
    assert_eq!(z * z.conjugate(), CM31::from(M31::from(25u32 + 81)));
}

#[test]
fn qm31_u_squared_is_non_residue() {
    let u = qm31(0, 0, 1, 0);
    assert_eq!(u * u, qm31(2, 1, 0, 0));
}

#[test]
fn qm31_known_product() {
    let a = qm31(1, 2, 3, 4);
    let b = qm31(4, 5, 6, 7);
    // (1 + 2i + 3u + 4iu)(4 + 5i + 6u + 7iu)
    assert_eq!(a * b, qm31(P - 71, 93, P - 16, 50));
}

#[test]
fn qm31_inverse_and_zero() {
    let x = qm31(17, 5, 1234, 99);
    assert_eq!(x * x.try_inverse().expect("non-zero"), QM31::ONE);
    assert_eq!(QM31::ZERO.try_inverse(), Err(FieldError::DivisionByZero));
}

#[test]
fn partial_evals_recombine_coordinates() {
    let x = qm31(3, 1, 4, 1);
    let coords = x.to_m31_array().map(QM31::from);
    assert_eq!(QM31::from_partial_evals(coords), x);
    assert_eq!(QM31::from_m31_array(x.to_m31_array()), x);
}

#[test]
fn complex_conjugate_fixes_cm31() {
    let x = qm31(3, 1, 4, 1);
    assert_eq!(x.complex_conjugate(), qm31(3, 1, P - 4, P - 1));
    assert_eq!(x.complex_conjugate().complex_conjugate(), x);
}

#[test]
fn fold_mle_evals_interpolates() {
    let lo = qm31(10, 0, 0, 0);
    let hi = qm31(14, 0, 0, 0);
    assert_eq!(fold_mle_evals(QM31::ZERO, lo, hi), lo);
    assert_eq!(fold_mle_evals(QM31::ONE, lo, hi), hi);
    assert_eq!(fold_mle_evals(qm31(2, 0, 0, 0), lo, hi), qm31(18, 0, 0, 0));
}

#[test]
fn batch_inverse_matches_single() {
    let values: Vec<QM31> = (1..100u32).map(|i| qm31(i, i * 3, i + 7, 2)).collect();
    let inverses = batch_inverse(&values).expect("non-zero batch");
    for (value, inverse) in values.iter().zip(&inverses) {
        assert_eq!(*value * *inverse, QM31::ONE);
    }
    assert!(batch_inverse::<M31>(&[]).expect("empty batch").is_empty());
}

#[test]
fn batch_inverse_rejects_zero() {
    let values = [M31::from(3u32), M31::ZERO, M31::from(5u32)];
    assert_eq!(batch_inverse(&values), Err(FieldError::DivisionByZero));
}

#[test]
fn batch_inverse_spans_chunks() {
    let values: Vec<M31> = (1..(super::BATCH_INVERSE_CHUNK as u32 * 2 + 17))
        .map(M31::from)
        .collect();
    let inverses = batch_inverse(&values).expect("non-zero batch");
    assert_eq!(inverses.len(), values.len());
    assert!(values
        .iter()
        .zip(&inverses)
        .all(|(v, inv)| *v * *inv == M31::ONE));
}

proptest! {
    #[test]
    fn m31_results_are_canonical(a in 0u32..P, b in 0u32..P) {
        let (x, y) = (M31::from(a), M31::from(b));
        prop_assert!((x + y).0 < P);
        prop_assert!((x * y).0 < P);
        prop_assert!((x - y).0 < P);
        prop_assert_eq!((x * y).0 as u64, a as u64 * b as u64 % P as u64);
        prop_assert_eq!((x + y).0 as u64, (a as u64 + b as u64) % P as u64);
    }

    #[test]
    fn qm31_distributes(a in any::<[u32; 4]>(), b in any::<[u32; 4]>(), c in any::<[u32; 4]>()) {
        let x = qm31(a[0], a[1], a[2], a[3]);
        let y = qm31(b[0], b[1], b[2], b[3]);
        let z = qm31(c[0], c[1], c[2], c[3]);
        prop_assert_eq!(x * (y + z), x * y + x * z);
        prop_assert_eq!(x * y, y * x);
        prop_assert_eq!((x * y) * z, x * (y * z));
    }
}
