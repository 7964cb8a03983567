use crate::circle::{CirclePoint, CirclePointIndex, Coset, M31_CIRCLE_LOG_ORDER};
use crate::field::M31;

/// Largest supported circle domain.
pub const MAX_CIRCLE_DOMAIN_LOG_SIZE: u32 = M31_CIRCLE_LOG_ORDER - 1;

/// A circle domain `half_coset ∪ conjugate(half_coset)`.
///
/// Natural indices `0..n/2` walk the half coset; `n/2..n` walk its conjugate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircleDomain {
    pub half_coset: Coset,
}

impl CircleDomain {
    pub const fn new(half_coset: Coset) -> Self {
        Self { half_coset }
    }

    pub fn iter(&self) -> impl Iterator<Item = CirclePoint<M31>> {
        self.half_coset
            .iter()
            .chain(self.half_coset.iter().map(|p| p.conjugate()))
    }

    pub fn iter_indices(&self) -> impl Iterator<Item = CirclePointIndex> {
        self.half_coset
            .iter_indices()
            .chain(self.half_coset.iter_indices().map(|i| -i))
    }

    pub const fn size(&self) -> usize {
        1 << self.log_size()
    }

    pub const fn log_size(&self) -> u32 {
        self.half_coset.log_size + 1
    }

    pub fn index_at(&self, i: usize) -> CirclePointIndex {
        if i < self.half_coset.size() {
            self.half_coset.index_at(i)
        } else {
            -self.half_coset.index_at(i - self.half_coset.size())
        }
    }

    pub fn at(&self, i: usize) -> CirclePoint<M31> {
        self.index_at(i).to_point()
    }

    /// Whether this is the domain of a canonic coset.
    pub fn is_canonic(&self) -> bool {
        self.half_coset.initial_index * 4 == self.half_coset.step_size
    }
}

/// The x-coordinates of a coset, the domain of a [`LinePoly`](super::LinePoly).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineDomain {
    coset: Coset,
}

impl LineDomain {
    /// The coset must not contain two points sharing an x-coordinate, which
    /// holds for every `half_odds` coset and its doublings.
    pub const fn new(coset: Coset) -> Self {
        Self { coset }
    }

    pub fn at(&self, i: usize) -> M31 {
        self.coset.at(i).x
    }

    pub const fn size(&self) -> usize {
        self.coset.size()
    }

    pub const fn log_size(&self) -> u32 {
        self.coset.log_size
    }

    pub fn iter(&self) -> impl Iterator<Item = M31> {
        self.coset.iter().map(|p| p.x)
    }

    pub fn coset(&self) -> Coset {
        self.coset
    }

    /// The domain of the squared-and-doubled x-coordinates, half the size.
    pub fn double(&self) -> Self {
        Self {
            coset: self.coset.double(),
        }
    }
}

impl From<CircleDomain> for LineDomain {
    fn from(domain: CircleDomain) -> Self {
        Self::new(domain.half_coset)
    }
}
