use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::circle::Coset;
use crate::field::{batch_inverse, FieldResult, M31};
use crate::poly::CanonicCoset;
use crate::utils::bit_reverse;

/// Twiddle factors for every FFT layer of a root coset and all its doublings.
///
/// Layer `k` holds the x-coordinates of the first half of
/// `root_coset.repeated_double(k)` in bit-reversed order. Layers are
/// concatenated largest first and padded with a trailing one, so both
/// buffers have exactly `root_coset.size()` entries.
#[derive(Clone, Debug)]
pub struct TwiddleTree {
    pub root_coset: Coset,
    pub twiddles: Vec<M31>,
    pub itwiddles: Vec<M31>,
}

impl TwiddleTree {
    /// Computes the tree for `root_coset`, inverting the twiddles in one batch.
    pub fn precompute(root_coset: Coset) -> FieldResult<Self> {
        let twiddles = slow_precompute_twiddles(root_coset);
        let itwiddles = batch_inverse(&twiddles)?;
        Ok(Self {
            root_coset,
            twiddles,
            itwiddles,
        })
    }

    /// The tree serving every canonic domain of size up to `2^log_size`.
    pub fn for_log_size(log_size: u32) -> FieldResult<Self> {
        Self::precompute(CanonicCoset::new(log_size).half_coset())
    }
}

/// The forward twiddle buffer of `coset`, see [`TwiddleTree`].
pub fn slow_precompute_twiddles(mut coset: Coset) -> Vec<M31> {
    let mut twiddles = Vec::with_capacity(coset.size());
    for _ in 0..coset.log_size() {
        let start = twiddles.len();
        twiddles.extend(coset.iter().take(coset.size() / 2).map(|p| p.x));
        bit_reverse(&mut twiddles[start..]);
        coset = coset.double();
    }
    twiddles.push(M31::ONE);
    twiddles
}

/// Slices the line-layer twiddles of a coset of `log_size` out of a tree
/// buffer, largest layer first.
pub fn domain_line_twiddles_from_tree(log_size: u32, buffer: &[M31]) -> Vec<&[M31]> {
    (0..log_size)
        .map(|i| {
            let len = 1usize << i;
            &buffer[buffer.len() - len * 2..buffer.len() - len]
        })
        .rev()
        .collect()
}

/// Circle-layer twiddles derived from the first line layer.
///
/// Every four consecutive bit-reversed domain points are
/// `[(x, y), (-x, -y), (y, -x), (-y, x)]`, and the first line layer stores
/// `[x, y]` for them, so the y-coordinates are `[y, -y, -x, x]`. The same
/// relation holds for the inverse twiddles.
pub fn circle_twiddles_from_line_twiddles(
    first_line_twiddles: &[M31],
) -> impl Iterator<Item = M31> + '_ {
    first_line_twiddles
        .chunks_exact(2)
        .flat_map(|pair| [pair[1], -pair[1], -pair[0], pair[0]])
}

/// Session-scoped memo of twiddle trees keyed by circle-domain log size.
///
/// Trees are built at most once per key and shared read-only afterwards.
#[derive(Debug, Default)]
pub struct TwiddleCache {
    trees: Mutex<HashMap<u32, Arc<TwiddleTree>>>,
}

impl TwiddleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tree for `CanonicCoset(log_size)`, building it on first use.
    pub fn get(&self, log_size: u32) -> FieldResult<Arc<TwiddleTree>> {
        let mut trees = self.trees.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tree) = trees.get(&log_size) {
            return Ok(Arc::clone(tree));
        }
        trace!(log_size, "precomputing twiddle tree");
        let tree = Arc::new(TwiddleTree::for_log_size(log_size)?);
        trees.insert(log_size, Arc::clone(&tree));
        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.trees
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
