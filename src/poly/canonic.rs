use super::domain::{CircleDomain, MAX_CIRCLE_DOMAIN_LOG_SIZE};
use super::{PolyError, PolyResult};
use crate::circle::{CirclePoint, CirclePointIndex, Coset};
use crate::field::M31;

/// The coset `G_{2n} + <G_n>` of size `n = 2^log_size`.
///
/// Its points form a standard-position circle domain, which makes it the
/// evaluation domain of every committed column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanonicCoset {
    pub coset: Coset,
}

impl CanonicCoset {
    /// # Panics
    ///
    /// If `log_size` is zero or exceeds [`MAX_CIRCLE_DOMAIN_LOG_SIZE`]; use
    /// [`CanonicCoset::try_new`] for unchecked input.
    pub fn new(log_size: u32) -> Self {
        assert!(
            (1..=MAX_CIRCLE_DOMAIN_LOG_SIZE).contains(&log_size),
            "invalid canonic coset log size {log_size}"
        );
        Self {
            coset: Coset::odds(log_size),
        }
    }

    pub fn try_new(log_size: u32) -> PolyResult<Self> {
        if !(1..=MAX_CIRCLE_DOMAIN_LOG_SIZE).contains(&log_size) {
            return Err(PolyError::InvalidDomainLogSize(log_size));
        }
        Ok(Self::new(log_size))
    }

    pub fn coset(&self) -> Coset {
        self.coset
    }

    /// `G_{4n} + <G_{n/2}>`, the half of the coset above the x-axis up to conjugation.
    pub fn half_coset(&self) -> Coset {
        Coset::half_odds(self.log_size() - 1)
    }

    pub fn circle_domain(&self) -> CircleDomain {
        CircleDomain::new(self.half_coset())
    }

    pub fn log_size(&self) -> u32 {
        self.coset.log_size
    }

    pub fn size(&self) -> usize {
        self.coset.size()
    }

    pub fn initial_index(&self) -> CirclePointIndex {
        self.coset.initial_index
    }

    pub fn step_size(&self) -> CirclePointIndex {
        self.coset.step_size
    }

    pub fn step(&self) -> CirclePoint<M31> {
        self.coset.step
    }

    pub fn index_at(&self, index: usize) -> CirclePointIndex {
        self.coset.index_at(index)
    }

    pub fn at(&self, index: usize) -> CirclePoint<M31> {
        self.coset.at(index)
    }
}
