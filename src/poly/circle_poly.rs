use serde::{Deserialize, Serialize};

use super::domain::CircleDomain;
use super::evaluation::CircleEvaluation;
use super::{fold, PolyError, PolyResult};
use crate::circle::CirclePoint;
use crate::fft::{
    butterfly, circle_twiddles_from_line_twiddles, domain_line_twiddles_from_tree, fft_layer_loop,
    TwiddleTree,
};
use crate::field::{M31, QM31};

/// A polynomial on the circle in the FFT basis.
///
/// Basis element `i` of a log-size-`n` polynomial is
/// `y^{b_0} · x^{b_1} · π(x)^{b_2} ··· π^{n-2}(x)^{b_{n-1}}` where `b_j` are the
/// bits of `i` and `π(x) = 2x^2 - 1`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CirclePoly {
    coeffs: Vec<M31>,
    log_size: u32,
}

impl CirclePoly {
    pub fn new(coeffs: Vec<M31>) -> PolyResult<Self> {
        if !coeffs.len().is_power_of_two() {
            return Err(PolyError::NotPowerOfTwo(coeffs.len()));
        }
        let log_size = coeffs.len().ilog2();
        Ok(Self { coeffs, log_size })
    }

    pub(crate) fn from_fft_output(coeffs: Vec<M31>, log_size: u32) -> Self {
        debug_assert_eq!(coeffs.len(), 1 << log_size);
        Self { coeffs, log_size }
    }

    pub fn log_size(&self) -> u32 {
        self.log_size
    }

    pub fn coeffs(&self) -> &[M31] {
        &self.coeffs
    }

    pub fn into_coeffs(self) -> Vec<M31> {
        self.coeffs
    }

    /// Evaluates at an arbitrary secure point by folding over the basis.
    pub fn eval_at_point(&self, point: CirclePoint<QM31>) -> QM31 {
        if self.log_size == 0 {
            return self.coeffs[0].into();
        }
        let mut mappings = Vec::with_capacity(self.log_size as usize);
        mappings.push(point.y);
        let mut x = point.x;
        for _ in 1..self.log_size {
            mappings.push(x);
            x = CirclePoint::double_x(x);
        }
        mappings.reverse();
        fold(&self.coeffs, &mappings)
    }

    /// The same polynomial with coefficients padded up to `2^log_size`.
    pub fn extend(&self, log_size: u32) -> PolyResult<Self> {
        if log_size < self.log_size {
            return Err(PolyError::ShapeMismatch {
                expected: 1 << self.log_size,
                got: 1 << log_size,
            });
        }
        let mut coeffs = Vec::with_capacity(1 << log_size);
        coeffs.extend_from_slice(&self.coeffs);
        coeffs.resize(1 << log_size, M31::ZERO);
        Ok(Self { coeffs, log_size })
    }

    /// Splits `p` into `(left, right)` with
    /// `p(P) = left(P) + π^{n-2}(P.x) · right(P)`.
    pub fn split_at_mid(&self) -> PolyResult<(Self, Self)> {
        if self.log_size == 0 {
            return Err(PolyError::InvalidDomainLogSize(0));
        }
        let (left, right) = self.coeffs.split_at(self.coeffs.len() / 2);
        Ok((
            Self::from_fft_output(left.to_vec(), self.log_size - 1),
            Self::from_fft_output(right.to_vec(), self.log_size - 1),
        ))
    }

    /// Evaluates on `domain`, which must be at least as large as the polynomial.
    pub fn evaluate(&self, domain: CircleDomain, twiddles: &TwiddleTree) -> PolyResult<CircleEvaluation> {
        check_twiddles(domain, twiddles)?;
        let log_size = domain.log_size();
        let mut values = self.extend(log_size)?.coeffs;

        if log_size == 1 {
            let y = domain.half_coset.initial.y;
            let (mut v0, mut v1) = (values[0], values[1]);
            butterfly(&mut v0, &mut v1, y);
            return CircleEvaluation::new(domain, vec![v0, v1]);
        }
        if log_size == 2 {
            let CirclePoint { x, y } = domain.half_coset.initial;
            let (mut v0, mut v1, mut v2, mut v3) = (values[0], values[1], values[2], values[3]);
            butterfly(&mut v0, &mut v2, x);
            butterfly(&mut v1, &mut v3, x);
            butterfly(&mut v0, &mut v1, y);
            butterfly(&mut v2, &mut v3, -y);
            return CircleEvaluation::new(domain, vec![v0, v1, v2, v3]);
        }

        let line_twiddles = domain_line_twiddles_from_tree(domain.half_coset.log_size, &twiddles.twiddles);
        for (layer, layer_twiddles) in line_twiddles.iter().enumerate().rev() {
            for (h, &t) in layer_twiddles.iter().enumerate() {
                fft_layer_loop(&mut values, layer + 1, h, t, butterfly);
            }
        }
        for (h, t) in circle_twiddles_from_line_twiddles(line_twiddles[0]).enumerate() {
            fft_layer_loop(&mut values, 0, h, t, butterfly);
        }
        CircleEvaluation::new(domain, values)
    }
}

pub(super) fn check_twiddles(domain: CircleDomain, twiddles: &TwiddleTree) -> PolyResult<()> {
    if domain.half_coset.is_doubling_of(&twiddles.root_coset) {
        Ok(())
    } else {
        Err(PolyError::IncompatibleTwiddles {
            domain_log_size: domain.log_size(),
            root_log_size: twiddles.root_coset.log_size + 1,
        })
    }
}
