use serde::{Deserialize, Serialize};

use super::domain::LineDomain;
use super::secure_column::SecureColumnByCoords;
use super::{fold, PolyError, PolyResult};
use crate::circle::CirclePoint;
use crate::fft::ibutterfly;
use crate::field::{batch_inverse, M31, QM31};
use crate::utils::bit_reverse;

/// A univariate polynomial over a line domain, in the basis
/// `Π_j π^j(x)^{b_j}` with coefficients in bit-reversed basis order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LinePolyParts")]
pub struct LinePoly {
    coeffs: Vec<QM31>,
    log_size: u32,
}

/// Unchecked serialized form of [`LinePoly`].
#[derive(Deserialize)]
struct LinePolyParts {
    coeffs: Vec<QM31>,
    log_size: u32,
}

impl TryFrom<LinePolyParts> for LinePoly {
    type Error = PolyError;

    fn try_from(parts: LinePolyParts) -> PolyResult<Self> {
        let poly = Self::new(parts.coeffs)?;
        if poly.log_size != parts.log_size {
            return Err(PolyError::ShapeMismatch {
                expected: 1 << parts.log_size.min(usize::BITS - 1),
                got: poly.len(),
            });
        }
        Ok(poly)
    }
}

impl LinePoly {
    pub fn new(coeffs: Vec<QM31>) -> PolyResult<Self> {
        if !coeffs.len().is_power_of_two() {
            return Err(PolyError::NotPowerOfTwo(coeffs.len()));
        }
        let log_size = coeffs.len().ilog2();
        Ok(Self { coeffs, log_size })
    }

    /// Builds a polynomial from coefficients in natural basis order.
    pub fn from_ordered_coefficients(mut coeffs: Vec<QM31>) -> PolyResult<Self> {
        if !bit_reverse(&mut coeffs) {
            return Err(PolyError::NotPowerOfTwo(coeffs.len()));
        }
        Self::new(coeffs)
    }

    pub fn into_ordered_coefficients(mut self) -> Vec<QM31> {
        bit_reverse(&mut self.coeffs);
        self.coeffs
    }

    pub fn coeffs(&self) -> &[QM31] {
        &self.coeffs
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn log_size(&self) -> u32 {
        self.log_size
    }

    pub fn eval_at_point(&self, mut x: QM31) -> QM31 {
        let mut doublings = Vec::with_capacity(self.log_size as usize);
        for _ in 0..self.log_size {
            doublings.push(x);
            x = CirclePoint::double_x(x);
        }
        fold(&self.coeffs, &doublings)
    }
}

/// Secure-field values over a [`LineDomain`] in bit-reversed order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineEvaluation {
    domain: LineDomain,
    pub values: SecureColumnByCoords,
}

impl LineEvaluation {
    pub fn new(domain: LineDomain, values: SecureColumnByCoords) -> PolyResult<Self> {
        if values.len() != domain.size() {
            return Err(PolyError::ShapeMismatch {
                expected: domain.size(),
                got: values.len(),
            });
        }
        Ok(Self { domain, values })
    }

    pub fn new_zero(domain: LineDomain) -> Self {
        Self {
            domain,
            values: SecureColumnByCoords::zeros(domain.size()),
        }
    }

    pub fn domain(&self) -> LineDomain {
        self.domain
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Recovers the [`LinePoly`] of log size `domain.log_size()`.
    pub fn interpolate(&self) -> PolyResult<LinePoly> {
        let mut values = self.values.to_vec();
        bit_reverse(&mut values);
        line_ifft(&mut values, self.domain)?;
        let len_inv = M31::pow2_inverse(self.domain.log_size());
        values.iter_mut().for_each(|v| *v = *v * len_inv);
        LinePoly::new(values)
    }
}

/// Inverse line FFT on natural-order values, without the final scaling.
fn line_ifft(values: &mut [QM31], mut domain: LineDomain) -> PolyResult<()> {
    if values.len() != domain.size() {
        return Err(PolyError::ShapeMismatch {
            expected: domain.size(),
            got: values.len(),
        });
    }
    while domain.size() > 1 {
        let half = domain.size() / 2;
        let xs: Vec<M31> = domain.iter().take(half).collect();
        let x_invs = batch_inverse(&xs)?;
        for chunk in values.chunks_exact_mut(domain.size()) {
            let (left, right) = chunk.split_at_mut(half);
            for ((l, r), x_inv) in left.iter_mut().zip(right.iter_mut()).zip(&x_invs) {
                ibutterfly(l, r, *x_inv);
            }
        }
        domain = domain.double();
    }
    Ok(())
}
