use super::FriResult;
use crate::fft::ibutterfly;
use crate::field::{batch_inverse, FieldExpOps, M31, QM31};
use crate::poly::{LineEvaluation, PolyError, SecureColumnByCoords, SecureEvaluation};
use crate::utils::bit_reverse_index;

/// Log2 of the number of values folded into one by a line fold.
pub const FOLD_STEP: u32 = 1;
/// Log2 of the number of values folded into one by the circle fold.
pub const CIRCLE_TO_LINE_FOLD_STEP: u32 = 1;

/// Folds a line evaluation of size `n` into one of size `n / 2` over the
/// doubled domain: `f'(π(x)) = f0(π(x)) + α·f1(π(x))` where
/// `f(x) = f0(π(x)) + x·f1(π(x))`, up to a factor of two.
pub fn fold_line(evaluation: &LineEvaluation, alpha: QM31) -> FriResult<LineEvaluation> {
    let n = evaluation.len();
    if n < 2 {
        return Err(PolyError::ShapeMismatch { expected: 2, got: n }.into());
    }
    let domain = evaluation.domain();
    let log_size = domain.log_size();
    let xs: Vec<M31> = (0..n / 2)
        .map(|i| domain.at(bit_reverse_index(i << FOLD_STEP, log_size)))
        .collect();
    let x_invs = batch_inverse(&xs)?;

    let values: SecureColumnByCoords = x_invs
        .iter()
        .enumerate()
        .map(|(i, &x_inv)| {
            let v0 = evaluation.values.at(2 * i);
            let v1 = evaluation.values.at(2 * i + 1);
            fold_pair(v0, v1, x_inv, alpha)
        })
        .collect();
    Ok(LineEvaluation::new(domain.double(), values)?)
}

/// Folds a circle evaluation into a line evaluation over its half coset and
/// accumulates it: `dst <- dst·α² + fold(src)`.
pub fn fold_circle_into_line(
    dst: &mut LineEvaluation,
    src: &SecureEvaluation,
    alpha: QM31,
) -> FriResult<()> {
    if src.len() != dst.len() << CIRCLE_TO_LINE_FOLD_STEP {
        return Err(PolyError::ShapeMismatch {
            expected: dst.len() << CIRCLE_TO_LINE_FOLD_STEP,
            got: src.len(),
        }
        .into());
    }
    let log_size = src.domain.log_size();
    let ys: Vec<M31> = (0..dst.len())
        .map(|i| src.domain.at(bit_reverse_index(i << CIRCLE_TO_LINE_FOLD_STEP, log_size)).y)
        .collect();
    let y_invs = batch_inverse(&ys)?;
    let alpha_sq = alpha.square();

    for (i, &y_inv) in y_invs.iter().enumerate() {
        let folded = fold_pair(src.values.at(2 * i), src.values.at(2 * i + 1), y_inv, alpha);
        let accumulated = dst.values.at(i) * alpha_sq + folded;
        dst.values.set(i, accumulated);
    }
    Ok(())
}

/// Folds the values at a point and at its reflection. `twiddle_inv` is the
/// inverse of the point's x (line) or y (circle) coordinate.
pub(crate) fn fold_pair(v0: QM31, v1: QM31, twiddle_inv: M31, alpha: QM31) -> QM31 {
    let (mut f0, mut f1) = (v0, v1);
    ibutterfly(&mut f0, &mut f1, twiddle_inv);
    f0 + alpha * f1
}
