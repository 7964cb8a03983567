//! Lifted Merkle commitment.
//!
//! Every column is lifted onto the domain of the largest one: leaf `i` of a
//! tree with `2^n` leaves hashes, for each column of log size `k`, the value
//! at [`lifted_index`]`(i, n - k)`. Columns enter a leaf sorted by log size
//! (ascending, ties in commit order). Inner nodes hash their two children
//! only, so a decommitment is a hash witness and nothing else.
//!
//! Queries are positions in the largest domain. Both sides sort and
//! deduplicate them, and queried values are returned per column in that
//! order.

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, warn};

use super::{MerkleError, MerkleHasher, MerkleResult};
use crate::field::M31;
use crate::utils::lifted_index;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct LiftedMerkleDecommitment<H: MerkleHasher> {
    /// Sibling hashes the verifier cannot derive, in the order it needs them.
    pub hash_witness: Vec<H::Hash>,
}

impl<H: MerkleHasher> Default for LiftedMerkleDecommitment<H> {
    fn default() -> Self {
        Self {
            hash_witness: Vec::new(),
        }
    }
}

/// Committed lifted tree. `layers[k]` holds the `2^k` node hashes of log
/// size `k`.
#[derive(Debug, Clone)]
pub struct LiftedMerkleProver<H: MerkleHasher> {
    layers: Vec<Vec<H::Hash>>,
}

impl<H: MerkleHasher> LiftedMerkleProver<H> {
    /// Commits to `columns`. Every column needs a power-of-two length of at
    /// least two.
    pub fn commit(columns: &[&[M31]]) -> MerkleResult<Self> {
        let _span = debug_span!("merkle.commit_lifted", n_columns = columns.len()).entered();
        let log_sizes = lifted_log_sizes(columns.iter().map(|column| column.len()))?;
        let Some(max_log_size) = log_sizes.iter().copied().max() else {
            return Ok(Self {
                layers: vec![vec![H::hash_node(None, &[])]],
            });
        };
        let order = leaf_order(&log_sizes);

        let leaf = |position: usize| {
            let values: Vec<M31> = order
                .iter()
                .map(|&column| {
                    let shift = max_log_size - log_sizes[column];
                    columns[column][lifted_index(position, shift)]
                })
                .collect();
            H::hash_node(None, &values)
        };
        let mut layers = vec![build_layer(1 << max_log_size, leaf)];
        for _ in 0..max_log_size {
            let Some(previous) = layers.last() else {
                break;
            };
            let next = build_layer(previous.len() / 2, |index| {
                H::hash_node(Some((previous[2 * index], previous[2 * index + 1])), &[])
            });
            layers.push(next);
        }
        layers.reverse();
        debug!(max_log_size, "committed lifted merkle tree");
        Ok(Self { layers })
    }

    pub fn root(&self) -> H::Hash {
        self.layers[0][0]
    }

    pub fn max_log_size(&self) -> u32 {
        (self.layers.len() - 1) as u32
    }

    /// Opens the tree at `positions` of the largest domain. `columns` must be
    /// the committed columns in commit order.
    ///
    /// Returns, per column, the lifted values at the sorted and deduplicated
    /// positions, together with the hash witness.
    pub fn decommit(
        &self,
        positions: &[usize],
        columns: &[&[M31]],
    ) -> MerkleResult<(Vec<Vec<M31>>, LiftedMerkleDecommitment<H>)> {
        let max_log_size = self.max_log_size();
        let log_sizes = lifted_log_sizes(columns.iter().map(|column| column.len()))?;
        if let Some((index, _)) = log_sizes
            .iter()
            .enumerate()
            .find(|&(_, &log_size)| log_size > max_log_size)
        {
            return Err(MerkleError::InvalidColumnSize {
                index,
                len: columns[index].len(),
            });
        }
        let positions = normalized_positions(positions, max_log_size)?;

        let queried_values = columns
            .iter()
            .zip(&log_sizes)
            .map(|(column, &log_size)| {
                positions
                    .iter()
                    .map(|&position| column[lifted_index(position, max_log_size - log_size)])
                    .collect()
            })
            .collect();

        let mut decommitment = LiftedMerkleDecommitment::default();
        let mut layer_positions = positions;
        for log_size in (1..=max_log_size as usize).rev() {
            let layer = &self.layers[log_size];
            let mut parents = Vec::with_capacity(layer_positions.len());
            for pair in layer_positions.chunk_by(|a, b| a ^ 1 == *b) {
                let first = pair[0];
                if pair.len() == 1 {
                    decommitment.hash_witness.push(layer[first ^ 1]);
                }
                parents.push(first >> 1);
            }
            layer_positions = parents;
        }
        Ok((queried_values, decommitment))
    }
}

/// Verifier side of a lifted commitment.
#[derive(Debug, Clone)]
pub struct LiftedMerkleVerifier<H: MerkleHasher> {
    pub root: H::Hash,
    pub column_log_sizes: Vec<u32>,
}

impl<H: MerkleHasher> LiftedMerkleVerifier<H> {
    pub fn new(root: H::Hash, column_log_sizes: Vec<u32>) -> Self {
        Self {
            root,
            column_log_sizes,
        }
    }

    /// Recomputes the root from the opened values and the hash witness.
    ///
    /// `queried_values[c]` holds the values of column `c` at the sorted,
    /// deduplicated `positions`. At least one position is required for a
    /// non-empty tree.
    pub fn verify(
        &self,
        positions: &[usize],
        queried_values: Vec<Vec<M31>>,
        decommitment: LiftedMerkleDecommitment<H>,
    ) -> MerkleResult<()> {
        let Some(max_log_size) = self.column_log_sizes.iter().copied().max() else {
            if !queried_values.is_empty() {
                return Err(MerkleError::TooManyQueriedValues);
            }
            if !decommitment.hash_witness.is_empty() {
                return Err(MerkleError::WitnessTooLong);
            }
            return self.check_root(H::hash_node(None, &[]));
        };
        let positions = normalized_positions(positions, max_log_size)?;
        check_value_shape(&queried_values, self.column_log_sizes.len(), positions.len())?;

        let order = leaf_order(&self.column_log_sizes);
        let mut layer: Vec<(usize, H::Hash)> = positions
            .iter()
            .enumerate()
            .map(|(row, &position)| {
                let values: Vec<M31> = order.iter().map(|&column| queried_values[column][row]).collect();
                (position, H::hash_node(None, &values))
            })
            .collect();

        let mut hash_witness = decommitment.hash_witness.into_iter();
        for _ in 0..max_log_size {
            let mut parents = Vec::with_capacity(layer.len());
            let mut nodes = layer.into_iter().peekable();
            while let Some((index, hash)) = nodes.next() {
                let children = if index & 1 == 0 {
                    match nodes.next_if(|(sibling, _)| *sibling == index + 1) {
                        Some((_, right)) => (hash, right),
                        None => (hash, hash_witness.next().ok_or(MerkleError::WitnessTooShort)?),
                    }
                } else {
                    (hash_witness.next().ok_or(MerkleError::WitnessTooShort)?, hash)
                };
                parents.push((index >> 1, H::hash_node(Some(children), &[])));
            }
            layer = parents;
        }

        if hash_witness.next().is_some() {
            return Err(MerkleError::WitnessTooLong);
        }
        match layer.as_slice() {
            [(_, root)] => self.check_root(*root),
            _ => Err(MerkleError::WitnessTooShort),
        }
    }

    fn check_root(&self, computed: H::Hash) -> MerkleResult<()> {
        if computed == self.root {
            Ok(())
        } else {
            warn!(expected = %self.root, computed = %computed, "lifted merkle root mismatch");
            Err(MerkleError::RootMismatch)
        }
    }
}

fn lifted_log_sizes(lengths: impl Iterator<Item = usize>) -> MerkleResult<Vec<u32>> {
    lengths
        .enumerate()
        .map(|(index, len)| {
            if !len.is_power_of_two() || len < 2 {
                return Err(MerkleError::InvalidColumnSize { index, len });
            }
            Ok(len.ilog2())
        })
        .collect()
}

/// Column indices in the order their values enter a leaf.
fn leaf_order(log_sizes: &[u32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..log_sizes.len()).collect();
    order.sort_by_key(|&column| log_sizes[column]);
    order
}

fn normalized_positions(positions: &[usize], max_log_size: u32) -> MerkleResult<Vec<usize>> {
    let mut positions = positions.to_vec();
    positions.sort_unstable();
    positions.dedup();
    if let Some(&position) = positions.iter().find(|&&p| p >> max_log_size != 0) {
        return Err(MerkleError::QueryOutOfRange {
            log_size: max_log_size,
            position,
        });
    }
    Ok(positions)
}

fn check_value_shape(values: &[Vec<M31>], n_columns: usize, n_positions: usize) -> MerkleResult<()> {
    if values.len() < n_columns {
        return Err(MerkleError::TooFewQueriedValues);
    }
    if values.len() > n_columns {
        return Err(MerkleError::TooManyQueriedValues);
    }
    for column in values {
        if column.len() < n_positions {
            return Err(MerkleError::TooFewQueriedValues);
        }
        if column.len() > n_positions {
            return Err(MerkleError::TooManyQueriedValues);
        }
    }
    Ok(())
}

fn build_layer<T, F>(n_nodes: usize, node_hash: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if crate::utils::parallelism_enabled() {
            use rayon::prelude::*;
            let chunk = crate::utils::preferred_chunk_size(n_nodes);
            return (0..n_nodes)
                .into_par_iter()
                .with_min_len(chunk)
                .map(node_hash)
                .collect();
        }
    }

    (0..n_nodes).map(node_hash).collect()
}
