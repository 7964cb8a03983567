//! Mixed-degree Merkle commitment over M31 columns.
//!
//! The module fixes the following layout:
//!
//! * **Layers:** a tree whose largest column has `2^n` rows has hash layers
//!   for every log size from `n` down to `0`. Layer `k` holds `2^k` nodes and
//!   layer `0` holds the root.
//! * **Node contents:** node `i` of layer `k` hashes the two children `2i` and
//!   `2i + 1` of layer `k + 1` (absent on the largest layer) followed by the
//!   row `i` values of every column of length `2^k`, in the columns' original
//!   commit order.
//! * **Domain separation:** the hash input starts with a 64-byte prefix,
//!   `"leaf"` for nodes without children and `"node"` otherwise.
//! * **Hash family:** abstracted by [`MerkleHasher`]; Blake2s and BLAKE3
//!   implementations are provided.
//!
//! A decommitment carries the sibling hashes and the unqueried column values
//! that the verifier cannot recompute on its own. Both sides walk the layers
//! from the largest down to the root, visiting node indices in increasing
//! order, so the witness streams are consumed in exactly the order they were
//! produced.
//!
//! The [`lifted`] submodule provides the alternative layout in which every
//! column is lifted onto the largest domain and only leaves carry values.

mod decommitment;
pub mod hasher;
pub mod lifted;
mod prover;
mod verifier;


use core::iter::Peekable;
use std::collections::BTreeMap;

use thiserror::Error;

pub use decommitment::MerkleDecommitment;
pub use hasher::{Blake2sMerkleHasher, Blake3MerkleHasher, MerkleHasher};
pub use lifted::{LiftedMerkleDecommitment, LiftedMerkleProver, LiftedMerkleVerifier};
pub use prover::MerkleProver;
pub use verifier::MerkleVerifier;

use crate::field::M31;

/// Query positions per column log size.
pub type QueriesPerLogSize = BTreeMap<u32, Vec<usize>>;

/// Failure modes of committing to, decommitting or verifying a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    #[error("column {index} has unsupported length {len}")]
    InvalidColumnSize { index: usize, len: usize },
    #[error("query {position} is out of range for layer of log size {log_size}")]
    QueryOutOfRange { log_size: u32, position: usize },
    #[error("witness is too short")]
    WitnessTooShort,
    #[error("witness is too long")]
    WitnessTooLong,
    #[error("too many queried values")]
    TooManyQueriedValues,
    #[error("too few queried values")]
    TooFewQueriedValues,
    #[error("recomputed root does not match the commitment")]
    RootMismatch,
}

pub type MerkleResult<T> = Result<T, MerkleError>;

/// Groups columns by log size, keeping their relative order within a size.
fn columns_by_log_size<'a>(columns: &[&'a [M31]]) -> MerkleResult<BTreeMap<u32, Vec<&'a [M31]>>> {
    let mut grouped: BTreeMap<u32, Vec<&'a [M31]>> = BTreeMap::new();
    for (index, column) in columns.iter().enumerate() {
        if !column.len().is_power_of_two() {
            return Err(MerkleError::InvalidColumnSize {
                index,
                len: column.len(),
            });
        }
        grouped
            .entry(column.len().ilog2())
            .or_default()
            .push(column);
    }
    Ok(grouped)
}

/// Sorted, deduplicated queries of one layer, bounds-checked against it.
fn layer_queries(queries: &QueriesPerLogSize, log_size: u32) -> MerkleResult<Vec<usize>> {
    let mut positions = queries.get(&log_size).cloned().unwrap_or_default();
    positions.sort_unstable();
    positions.dedup();
    if let Some(&position) = positions.iter().find(|&&p| p >> log_size != 0) {
        return Err(MerkleError::QueryOutOfRange { log_size, position });
    }
    Ok(positions)
}

/// Next node to visit in a layer: the smallest of the parents of the nodes
/// visited in the previous layer and the layer's own queries.
fn next_decommitment_node(
    prev_queries: &mut Peekable<impl Iterator<Item = usize>>,
    layer_queries: &mut Peekable<impl Iterator<Item = usize>>,
) -> Option<usize> {
    min_node(prev_queries.peek().map(|q| *q / 2), layer_queries.peek().copied())
}

fn min_node(parent: Option<usize>, own: Option<usize>) -> Option<usize> {
    match (parent, own) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
