use core::ops::Deref;
use std::collections::BTreeSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::Channel;

/// Draws `n_queries` positions in `[0, 2^log_domain_size)` in draw order.
/// Duplicates are kept; [`Queries::new`] removes them.
pub fn draw_queries(channel: &mut impl Channel, log_domain_size: u32, n_queries: usize) -> Vec<usize> {
    let mask = (1u64 << log_domain_size) - 1;
    let mut positions = Vec::with_capacity(n_queries);
    while positions.len() < n_queries {
        let words = channel.draw_u32s();
        positions.extend(
            words
                .into_iter()
                .map(|word| (u64::from(word) & mask) as usize)
                .take(n_queries - positions.len()),
        );
    }
    positions
}

/// Sorted, deduplicated query positions over a domain of `2^log_domain_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queries {
    pub positions: Vec<usize>,
    pub log_domain_size: u32,
}

impl Queries {
    pub fn new(raw_positions: &[usize], log_domain_size: u32) -> Self {
        let positions = raw_positions
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self {
            positions,
            log_domain_size,
        }
    }

    /// Queries on the domain obtained by doubling every point `n_folds` times.
    pub fn fold(&self, n_folds: u32) -> Self {
        let n_folds = n_folds.min(self.log_domain_size);
        Self {
            positions: self.positions.iter().map(|q| q >> n_folds).dedup().collect(),
            log_domain_size: self.log_domain_size - n_folds,
        }
    }
}

impl Deref for Queries {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.positions
    }
}
