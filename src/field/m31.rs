use core::fmt;
use core::iter::{Product, Sum};
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};

use super::{Field, FieldError, FieldExpOps, FieldResult};

/// Number of bits of the modulus.
pub const MODULUS_BITS: u32 = 31;
/// The Mersenne prime `2^31 - 1`.
pub const P: u32 = (1 << MODULUS_BITS) - 1;

/// Element of the base field, always held in `[0, P)`.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct M31(pub u32);

impl M31 {
    pub const ZERO: M31 = M31(0);
    pub const ONE: M31 = M31(1);

    /// Wraps `value` without reduction; the caller guarantees `value < P`.
    pub const fn from_u32_unchecked(value: u32) -> Self {
        Self(value)
    }

    /// Maps `[0, 2P)` into `[0, P)`.
    pub const fn partial_reduce(value: u32) -> Self {
        Self(if value >= P { value - P } else { value })
    }

    /// Reduces a product of two canonical elements (any value below `P^2`).
    pub const fn reduce(value: u64) -> Self {
        Self(
            ((((value >> MODULUS_BITS) + value + 1) >> MODULUS_BITS) + value) as u32 & P,
        )
    }

    /// Reduces an arbitrary `u64`.
    pub const fn from_u64(value: u64) -> Self {
        Self((value % P as u64) as u32)
    }

    /// Inverse of `2^log`, using `2^31 = 1` in this field.
    pub fn pow2_inverse(log: u32) -> Self {
        Self(1 << ((MODULUS_BITS - log % MODULUS_BITS) % MODULUS_BITS))
    }

    /// Wraps `value`, rejecting anything outside `[0, P)`.
    pub const fn try_from_canonical(value: u32) -> FieldResult<Self> {
        if value >= P {
            return Err(FieldError::NonCanonical { value });
        }
        Ok(Self(value))
    }

    /// Canonical little-endian encoding.
    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Decodes a canonical little-endian element, rejecting values `>= P`.
    pub fn from_le_bytes(bytes: [u8; 4]) -> FieldResult<Self> {
        Self::try_from_canonical(u32::from_le_bytes(bytes))
    }
}

impl<'de> Deserialize<'de> for M31 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        Self::try_from_canonical(value).map_err(DeError::custom)
    }
}

impl fmt::Debug for M31 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for M31 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for M31 {
    fn from(value: u32) -> Self {
        Self(value % P)
    }
}

impl From<usize> for M31 {
    fn from(value: usize) -> Self {
        Self::from_u64(value as u64)
    }
}

impl From<i32> for M31 {
    fn from(value: i32) -> Self {
        let reduced = M31::from(value.unsigned_abs());
        if value < 0 {
            -reduced
        } else {
            reduced
        }
    }
}

impl Add for M31 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::partial_reduce(self.0 + rhs.0)
    }
}

impl Sub for M31 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::partial_reduce(self.0 + P - rhs.0)
    }
}

impl Neg for M31 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::partial_reduce(P - self.0)
    }
}

impl Mul for M31 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::reduce(self.0 as u64 * rhs.0 as u64)
    }
}

impl AddAssign for M31 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for M31 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for M31 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Sum for M31 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Product for M31 {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ONE, Mul::mul)
    }
}

impl FieldExpOps for M31 {
    const ONE: Self = M31(1);

    /// Fermat inversion, `v^(P - 2)`.
    fn try_inverse(&self) -> FieldResult<Self> {
        if self.0 == 0 {
            return Err(FieldError::DivisionByZero);
        }
        Ok(self.pow((P - 2) as u128))
    }
}

impl Field for M31 {
    const ZERO: Self = M31(0);
}
