use core::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::field::{Field, FieldExpOps, FieldResult, M31, QM31};

/// A point on the unit circle over `F`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CirclePoint<F> {
    pub x: F,
    pub y: F,
}

/// Generator of the full circle group over M31.
pub const M31_CIRCLE_GEN: CirclePoint<M31> = CirclePoint {
    x: M31::from_u32_unchecked(2),
    y: M31::from_u32_unchecked(1268011823),
};

/// `log2` of the order of [`M31_CIRCLE_GEN`].
pub const M31_CIRCLE_LOG_ORDER: u32 = 31;

impl<F: Field> CirclePoint<F> {
    /// The identity `(1, 0)`.
    pub fn zero() -> Self {
        Self {
            x: F::ONE,
            y: F::ZERO,
        }
    }

    pub fn double(&self) -> Self {
        *self + *self
    }

    /// x-coordinate of `2P` given the x-coordinate of `P`.
    pub fn double_x(x: F) -> F {
        let sx = x.square();
        sx + sx - F::ONE
    }

    pub fn repeated_double(&self, n: u32) -> Self {
        let mut res = *self;
        for _ in 0..n {
            res = res.double();
        }
        res
    }

    /// Group inverse `(x, -y)`.
    pub fn conjugate(&self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
        }
    }

    /// `P + (-1, 0)`.
    pub fn antipode(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }

    /// Scalar multiplication by double-and-add.
    pub fn mul(&self, mut scalar: u128) -> Self {
        let mut res = Self::zero();
        let mut cur = *self;
        while scalar > 0 {
            if scalar & 1 == 1 {
                res = res + cur;
            }
            cur = cur.double();
            scalar >>= 1;
        }
        res
    }

    /// Embeds the point into an extension field.
    pub fn into_ef<E: Field + From<F>>(self) -> CirclePoint<E> {
        CirclePoint {
            x: self.x.into(),
            y: self.y.into(),
        }
    }
}

impl CirclePoint<QM31> {
    /// Applies the `CM31`-conjugation to both coordinates.
    pub fn complex_conjugate(&self) -> Self {
        Self {
            x: self.x.complex_conjugate(),
            y: self.y.complex_conjugate(),
        }
    }

    /// Draws a uniformly random secure point through the rational
    /// parametrisation `t -> ((1 - t^2) / (1 + t^2), 2t / (1 + t^2))`.
    pub fn get_random_point(channel: &mut impl Channel) -> FieldResult<Self> {
        let t = channel.draw_secure_felt();
        let t_square = t.square();
        let one_plus_t_square_inv = (t_square + QM31::ONE).try_inverse()?;
        Ok(Self {
            x: (QM31::ONE - t_square) * one_plus_t_square_inv,
            y: t.double() * one_plus_t_square_inv,
        })
    }
}

impl<F: Field> Add for CirclePoint<F> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x * rhs.x - self.y * rhs.y,
            y: self.x * rhs.y + self.y * rhs.x,
        }
    }
}

impl<F: Field> Sub for CirclePoint<F> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + rhs.conjugate()
    }
}

impl<F: Field> Neg for CirclePoint<F> {
    type Output = Self;

    fn neg(self) -> Self {
        self.conjugate()
    }
}
