//! Field tower used by the circle-STARK engine.
//!
//! * [`M31`]: integers modulo the Mersenne prime `2^31 - 1`.
//! * [`CM31`]: the complex extension `M31[i] / (i^2 + 1)`.
//! * [`QM31`]: the secure extension `CM31[u] / (u^2 - (2 + i))`.
//!
//! Every element is kept in canonical form, so derived equality and hashing
//! are value equality.

mod cm31;
mod m31;
mod qm31;

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use thiserror::Error;

pub use cm31::CM31;
pub use m31::{M31, MODULUS_BITS, P};
pub use qm31::{QM31, R, SECURE_EXTENSION_DEGREE};

/// Base field alias.
pub type BaseField = M31;
/// Secure field alias; all challenges and sampled values live here.
pub type SecureField = QM31;

/// Batches above this size are split into independent Montgomery chains.
pub const BATCH_INVERSE_CHUNK: usize = 1 << 12;

/// Arithmetic failures surfaced by the field tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Attempted to invert the additive identity.
    #[error("division by zero")]
    DivisionByZero,
    /// Byte decoding produced a value outside `[0, P)`.
    #[error("non-canonical field element encoding: {value}")]
    NonCanonical { value: u32 },
}

/// Result alias for field operations.
pub type FieldResult<T> = Result<T, FieldError>;

/// Exponentiation and inversion shared by all tower levels.
pub trait FieldExpOps: Copy + Mul<Output = Self> + MulAssign {
    /// Multiplicative identity.
    const ONE: Self;

    fn square(&self) -> Self {
        *self * *self
    }

    /// Square-and-multiply exponentiation.
    fn pow(&self, exp: u128) -> Self {
        let mut result = Self::ONE;
        let mut base = *self;
        let mut exp = exp;
        while exp > 0 {
            if exp & 1 == 1 {
                result *= base;
            }
            base = base.square();
            exp >>= 1;
        }
        result
    }

    /// Returns the multiplicative inverse or [`FieldError::DivisionByZero`].
    fn try_inverse(&self) -> FieldResult<Self>;
}

/// Arithmetic contract implemented by [`M31`], [`CM31`] and [`QM31`].
pub trait Field:
    FieldExpOps
    + Debug
    + Default
    + PartialEq
    + Eq
    + Send
    + Sync
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + SubAssign
    + Neg<Output = Self>
    + Mul<M31, Output = Self>
    + From<M31>
    + 'static
{
    /// Additive identity.
    const ZERO: Self;

    fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    fn double(&self) -> Self {
        *self + *self
    }

    /// Divides by `rhs`, failing when `rhs` is zero.
    fn try_div(&self, rhs: Self) -> FieldResult<Self> {
        Ok(*self * rhs.try_inverse()?)
    }
}

/// Inverts every element of `values` with a single field inversion per chunk.
///
/// Uses Montgomery's trick: prefix products are accumulated forward, the
/// total is inverted once and the individual inverses are recovered walking
/// backwards. Any zero input fails the whole batch.
pub fn batch_inverse<F: Field>(values: &[F]) -> FieldResult<Vec<F>> {
    if values.len() <= BATCH_INVERSE_CHUNK {
        return batch_inverse_chain(values);
    }

    #[cfg(feature = "parallel")]
    if crate::utils::parallelism_enabled() {
        use rayon::prelude::*;
        let chunks = values
            .par_chunks(BATCH_INVERSE_CHUNK)
            .map(batch_inverse_chain)
            .collect::<FieldResult<Vec<_>>>()?;
        return Ok(chunks.into_iter().flatten().collect());
    }

    let mut out = Vec::with_capacity(values.len());
    for chunk in values.chunks(BATCH_INVERSE_CHUNK) {
        out.extend(batch_inverse_chain(chunk)?);
    }
    Ok(out)
}

fn batch_inverse_chain<F: Field>(values: &[F]) -> FieldResult<Vec<F>> {
    if values.is_empty() {
        return Ok(Vec::new());
    }
    let mut prefix = Vec::with_capacity(values.len());
    let mut acc = F::ONE;
    for value in values {
        if value.is_zero() {
            return Err(FieldError::DivisionByZero);
        }
        prefix.push(acc);
        acc *= *value;
    }
    let mut inv = acc.try_inverse()?;
    let mut out = vec![F::ZERO; values.len()];
    for i in (0..values.len()).rev() {
        out[i] = inv * prefix[i];
        inv *= values[i];
    }
    Ok(out)
}

/// Multilinear folding step: `assignment * (eval1 - eval0) + eval0`.
pub fn fold_mle_evals(assignment: QM31, eval0: QM31, eval1: QM31) -> QM31 {
    assignment * (eval1 - eval0) + eval0
}

#[cfg(test)]
mod tests;
