use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::{Field, FieldExpOps, FieldResult, CM31, M31};

/// Degree of the secure field over the base field.
pub const SECURE_EXTENSION_DEGREE: usize = 4;

/// Non-residue defining the extension: `u^2 = 2 + i`.
pub const R: CM31 = CM31::from_u32_unchecked(2, 1);

/// `a + b·u` with `a, b` in [`CM31`] and `u^2 = R`.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QM31(pub CM31, pub CM31);

impl QM31 {
    pub const fn from_u32_unchecked(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self(
            CM31::from_u32_unchecked(a, b),
            CM31::from_u32_unchecked(c, d),
        )
    }

    pub const fn from_m31(a: M31, b: M31, c: M31, d: M31) -> Self {
        Self(CM31(a, b), CM31(c, d))
    }

    pub const fn from_m31_array(array: [M31; SECURE_EXTENSION_DEGREE]) -> Self {
        Self::from_m31(array[0], array[1], array[2], array[3])
    }

    /// Coordinates in the basis `[1, i, u, iu]`.
    pub const fn to_m31_array(self) -> [M31; SECURE_EXTENSION_DEGREE] {
        [self.0 .0, self.0 .1, self.1 .0, self.1 .1]
    }

    /// Recombines evaluations of the four coordinate polynomials:
    /// `e0 + e1·i + e2·u + e3·iu`.
    pub fn from_partial_evals(evals: [QM31; SECURE_EXTENSION_DEGREE]) -> Self {
        let mut res = evals[0];
        res += evals[1] * QM31::from_u32_unchecked(0, 1, 0, 0);
        res += evals[2] * QM31::from_u32_unchecked(0, 0, 1, 0);
        res += evals[3] * QM31::from_u32_unchecked(0, 0, 0, 1);
        res
    }

    /// Multiplies by an element of the complex subfield.
    pub fn mul_cm31(self, rhs: CM31) -> Self {
        Self(self.0 * rhs, self.1 * rhs)
    }

    /// Conjugation over `CM31`: `a + b·u` to `a - b·u`.
    pub fn complex_conjugate(&self) -> Self {
        Self(self.0, -self.1)
    }
}

impl fmt::Debug for QM31 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}) + ({:?})u", self.0, self.1)
    }
}

impl fmt::Display for QM31 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<M31> for QM31 {
    fn from(value: M31) -> Self {
        Self(value.into(), CM31::ZERO)
    }
}

impl From<CM31> for QM31 {
    fn from(value: CM31) -> Self {
        Self(value, CM31::ZERO)
    }
}

impl Add for QM31 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0, self.1 + rhs.1)
    }
}

impl Sub for QM31 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0, self.1 - rhs.1)
    }
}

impl Neg for QM31 {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0, -self.1)
    }
}

impl Mul for QM31 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        // (a + bu)(c + du) = (ac + R·bd) + (ad + bc)u
        Self(
            self.0 * rhs.0 + R * self.1 * rhs.1,
            self.0 * rhs.1 + self.1 * rhs.0,
        )
    }
}

impl Add<M31> for QM31 {
    type Output = Self;

    fn add(self, rhs: M31) -> Self {
        Self(self.0 + rhs, self.1)
    }
}

impl Sub<M31> for QM31 {
    type Output = Self;

    fn sub(self, rhs: M31) -> Self {
        Self(self.0 - rhs, self.1)
    }
}

impl Mul<M31> for QM31 {
    type Output = Self;

    fn mul(self, rhs: M31) -> Self {
        Self(self.0 * rhs, self.1 * rhs)
    }
}

impl Mul<QM31> for M31 {
    type Output = QM31;

    fn mul(self, rhs: QM31) -> QM31 {
        rhs * self
    }
}

impl Add<QM31> for M31 {
    type Output = QM31;

    fn add(self, rhs: QM31) -> QM31 {
        rhs + self
    }
}

impl Sub<QM31> for M31 {
    type Output = QM31;

    fn sub(self, rhs: QM31) -> QM31 {
        -rhs + self
    }
}

impl AddAssign for QM31 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for QM31 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for QM31 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Sum for QM31 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl FieldExpOps for QM31 {
    const ONE: Self = QM31(CM31::ONE, CM31::ZERO);

    /// `(a - bu) / (a^2 - R·b^2)`.
    fn try_inverse(&self) -> FieldResult<Self> {
        let b2 = self.1.square();
        // R·b^2 = (2 + i)·b^2 = 2·b^2 + i·b^2
        let ib2 = CM31(-b2.1, b2.0);
        let denom = self.0.square() - (b2 + b2 + ib2);
        let denom_inverse = denom.try_inverse()?;
        Ok(Self(self.0 * denom_inverse, -self.1 * denom_inverse))
    }
}

impl Field for QM31 {
    const ZERO: Self = QM31(CM31::ZERO, CM31::ZERO);
}
