use super::index::CirclePointIndex;
use super::point::CirclePoint;
use crate::field::M31;

/// The coset `initial + <step>` of size `2^log_size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coset {
    pub initial_index: CirclePointIndex,
    pub initial: CirclePoint<M31>,
    pub step_size: CirclePointIndex,
    pub step: CirclePoint<M31>,
    pub log_size: u32,
}

impl Coset {
    pub fn new(initial_index: CirclePointIndex, log_size: u32) -> Self {
        let step_size = CirclePointIndex::subgroup_gen(log_size);
        Self {
            initial_index,
            initial: initial_index.to_point(),
            step_size,
            step: step_size.to_point(),
            log_size,
        }
    }

    /// The subgroup of order `2^log_size`.
    pub fn subgroup(log_size: u32) -> Self {
        Self::new(CirclePointIndex::zero(), log_size)
    }

    /// `G_{2n} + <G_n>`, the odd multiples of `G_{2n}`.
    pub fn odds(log_size: u32) -> Self {
        Self::new(CirclePointIndex::subgroup_gen(log_size + 1), log_size)
    }

    /// `G_{4n} + <G_n>`; together with its conjugate it forms `odds(log_size + 1)`.
    pub fn half_odds(log_size: u32) -> Self {
        Self::new(CirclePointIndex::subgroup_gen(log_size + 2), log_size)
    }

    pub const fn size(&self) -> usize {
        1 << self.log_size
    }

    pub const fn log_size(&self) -> u32 {
        self.log_size
    }

    pub fn index_at(&self, i: usize) -> CirclePointIndex {
        self.initial_index + self.step_size * i
    }

    pub fn at(&self, i: usize) -> CirclePoint<M31> {
        self.index_at(i).to_point()
    }

    pub fn iter(&self) -> CosetIterator<CirclePoint<M31>> {
        CosetIterator {
            cur: self.initial,
            step: self.step,
            remaining: self.size(),
        }
    }

    pub fn iter_indices(&self) -> CosetIterator<CirclePointIndex> {
        CosetIterator {
            cur: self.initial_index,
            step: self.step_size,
            remaining: self.size(),
        }
    }

    /// The coset of doubled points, half the size.
    pub fn double(&self) -> Self {
        debug_assert!(self.log_size > 0);
        Self {
            initial_index: self.initial_index * 2,
            initial: self.initial.double(),
            step_size: self.step_size * 2,
            step: self.step.double(),
            log_size: self.log_size.saturating_sub(1),
        }
    }

    pub fn repeated_double(&self, n: u32) -> Self {
        (0..n).fold(*self, |coset, _| coset.double())
    }

    pub fn is_doubling_of(&self, other: &Self) -> bool {
        self.log_size <= other.log_size
            && *self == other.repeated_double(other.log_size - self.log_size)
    }

    /// Negates every index, mirroring the coset across the x-axis.
    pub fn conjugate(&self) -> Self {
        let initial_index = -self.initial_index;
        let step_size = -self.step_size;
        Self {
            initial_index,
            initial: initial_index.to_point(),
            step_size,
            step: step_size.to_point(),
            log_size: self.log_size,
        }
    }
}

/// Walks a coset by repeated addition of its step.
#[derive(Clone, Debug)]
pub struct CosetIterator<T> {
    cur: T,
    step: T,
    remaining: usize,
}

impl<T> Iterator for CosetIterator<T>
where
    T: Copy + core::ops::Add<Output = T>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let res = self.cur;
        self.cur = self.cur + self.step;
        Some(res)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for CosetIterator<T> where T: Copy + core::ops::Add<Output = T> {}
