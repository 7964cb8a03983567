use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::{Field, FieldExpOps, FieldResult, M31};

/// `a + b·i` with `i^2 = -1`.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CM31(pub M31, pub M31);

impl CM31 {
    pub const fn from_u32_unchecked(a: u32, b: u32) -> Self {
        Self(M31::from_u32_unchecked(a), M31::from_u32_unchecked(b))
    }

    pub const fn from_m31(a: M31, b: M31) -> Self {
        Self(a, b)
    }

    /// `a - b·i`.
    pub fn conjugate(&self) -> Self {
        Self(self.0, -self.1)
    }
}

impl fmt::Debug for CM31 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}i", self.0, self.1)
    }
}

impl fmt::Display for CM31 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<M31> for CM31 {
    fn from(value: M31) -> Self {
        Self(value, M31::ZERO)
    }
}

impl Add for CM31 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0, self.1 + rhs.1)
    }
}

impl Sub for CM31 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0, self.1 - rhs.1)
    }
}

impl Neg for CM31 {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0, -self.1)
    }
}

impl Mul for CM31 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        // (a + bi)(c + di) = (ac - bd) + (ad + bc)i
        Self(
            self.0 * rhs.0 - self.1 * rhs.1,
            self.0 * rhs.1 + self.1 * rhs.0,
        )
    }
}

impl Add<M31> for CM31 {
    type Output = Self;

    fn add(self, rhs: M31) -> Self {
        Self(self.0 + rhs, self.1)
    }
}

impl Sub<M31> for CM31 {
    type Output = Self;

    fn sub(self, rhs: M31) -> Self {
        Self(self.0 - rhs, self.1)
    }
}

impl Mul<M31> for CM31 {
    type Output = Self;

    fn mul(self, rhs: M31) -> Self {
        Self(self.0 * rhs, self.1 * rhs)
    }
}

impl AddAssign for CM31 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for CM31 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for CM31 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl FieldExpOps for CM31 {
    const ONE: Self = CM31(M31::ONE, M31::ZERO);

    /// `(a - bi) / (a^2 + b^2)`.
    fn try_inverse(&self) -> FieldResult<Self> {
        let norm_inv = (self.0.square() + self.1.square()).try_inverse()?;
        Ok(Self(self.0 * norm_inv, -self.1 * norm_inv))
    }
}

impl Field for CM31 {
    const ZERO: Self = CM31(M31::ZERO, M31::ZERO);
}
