use core::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::point::{CirclePoint, M31_CIRCLE_GEN, M31_CIRCLE_LOG_ORDER};
use crate::field::M31;

/// Discrete logarithm of a circle point with respect to [`M31_CIRCLE_GEN`],
/// reduced modulo `2^31`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CirclePointIndex(pub usize);

impl CirclePointIndex {
    const MASK: usize = (1 << M31_CIRCLE_LOG_ORDER) - 1;

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn generator() -> Self {
        Self(1)
    }

    /// Index of a generator of the subgroup of order `2^log_size`.
    pub const fn subgroup_gen(log_size: u32) -> Self {
        Self(1 << (M31_CIRCLE_LOG_ORDER - log_size)).reduce()
    }

    pub const fn reduce(self) -> Self {
        Self(self.0 & Self::MASK)
    }

    pub fn to_point(self) -> CirclePoint<M31> {
        M31_CIRCLE_GEN.mul(self.0 as u128)
    }

    /// Halves an even index; odd indices have no half in this group.
    pub fn half(self) -> Option<Self> {
        (self.0 & 1 == 0).then_some(Self(self.0 >> 1))
    }
}

impl Add for CirclePointIndex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0).reduce()
    }
}

impl Sub for CirclePointIndex {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 + (1 << M31_CIRCLE_LOG_ORDER) - rhs.0).reduce()
    }
}

impl Mul<usize> for CirclePointIndex {
    type Output = Self;

    fn mul(self, rhs: usize) -> Self {
        Self(self.0.wrapping_mul(rhs)).reduce()
    }
}

impl Neg for CirclePointIndex {
    type Output = Self;

    fn neg(self) -> Self {
        Self((1 << M31_CIRCLE_LOG_ORDER) - self.0).reduce()
    }
}
