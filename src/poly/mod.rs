//! Polynomials and evaluations over circle and line domains.
//!
//! Evaluations are always stored in bit-reversed domain order. Coefficients
//! of [`CirclePoly`] and [`LinePoly`] follow the FFT basis order, so
//! zero-padding a coefficient vector extends the polynomial to a larger
//! domain without changing it.

mod barycentric;
mod canonic;
mod circle_poly;
mod domain;
mod evaluation;
mod line;
mod secure_column;

use thiserror::Error;

pub use barycentric::{barycentric_weights, BarycentricCache};
pub use canonic::CanonicCoset;
pub use circle_poly::CirclePoly;
pub use domain::{CircleDomain, LineDomain, MAX_CIRCLE_DOMAIN_LOG_SIZE};
pub use evaluation::CircleEvaluation;
pub use line::{LineEvaluation, LinePoly};
pub use secure_column::{SecureColumnByCoords, SecureEvaluation};

use crate::field::{FieldError, QM31};

/// Failures of polynomial and evaluation operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolyError {
    #[error("shape mismatch: expected {expected} values, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("length {0} is not a power of two")]
    NotPowerOfTwo(usize),
    #[error("cannot evaluate at a point of the evaluation domain")]
    PointOnDomain,
    #[error("twiddle tree of log size {root_log_size} cannot serve a domain of log size {domain_log_size}")]
    IncompatibleTwiddles {
        domain_log_size: u32,
        root_log_size: u32,
    },
    #[error("invalid domain log size {0}")]
    InvalidDomainLogSize(u32),
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Result alias for polynomial operations.
pub type PolyResult<T> = Result<T, PolyError>;

/// Evaluates the multilinear-style fold `Σ values[i] · Π factors[j]^{bit_j(i)}`
/// with the first factor splitting the top half.
///
/// `values.len()` must be `2^factors.len()`.
pub fn fold<F>(values: &[F], factors: &[QM31]) -> QM31
where
    F: Copy + Into<QM31>,
{
    match factors.split_first() {
        None => values.first().map(|v| (*v).into()).unwrap_or_default(),
        Some((factor, rest)) => {
            let (lhs, rhs) = values.split_at(values.len() / 2);
            fold(lhs, rest) + fold(rhs, rest) * *factor
        }
    }
}
