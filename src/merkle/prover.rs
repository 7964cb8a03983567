use tracing::{debug, debug_span};

use super::{
    columns_by_log_size, layer_queries, next_decommitment_node, MerkleDecommitment, MerkleError,
    MerkleHasher, MerkleResult, QueriesPerLogSize,
};
use crate::field::M31;

/// Committed tree. `layers[k]` holds the `2^k` node hashes of log size `k`.
#[derive(Debug, Clone)]
pub struct MerkleProver<H: MerkleHasher> {
    layers: Vec<Vec<H::Hash>>,
}

impl<H: MerkleHasher> MerkleProver<H> {
    /// Commits to `columns`, each of which must have a power-of-two length.
    /// An empty column set commits to the hash of an empty leaf.
    pub fn commit(columns: &[&[M31]]) -> MerkleResult<Self> {
        let _span = debug_span!("merkle.commit", n_columns = columns.len()).entered();
        let grouped = columns_by_log_size(columns)?;
        let Some(&max_log_size) = grouped.keys().next_back() else {
            return Ok(Self {
                layers: vec![vec![H::hash_node(None, &[])]],
            });
        };

        let mut layers: Vec<Vec<H::Hash>> = Vec::with_capacity(max_log_size as usize + 1);
        for log_size in (0..=max_log_size).rev() {
            let layer_columns = grouped.get(&log_size).map(Vec::as_slice).unwrap_or(&[]);
            let layer = hash_layer::<H>(log_size, layers.last().map(Vec::as_slice), layer_columns);
            layers.push(layer);
        }
        layers.reverse();
        debug!(max_log_size, "committed merkle tree");
        Ok(Self { layers })
    }

    pub fn root(&self) -> H::Hash {
        self.layers[0][0]
    }

    /// Log size of the largest layer.
    pub fn max_log_size(&self) -> u32 {
        (self.layers.len() - 1) as u32
    }

    /// Opens the tree at the given positions. `columns` must be the columns
    /// the tree was committed to, in commit order.
    ///
    /// Returns the queried values, ordered by layer (largest first), then by
    /// node index, then by column, together with the witness.
    pub fn decommit(
        &self,
        queries_per_log_size: &QueriesPerLogSize,
        columns: &[&[M31]],
    ) -> MerkleResult<(Vec<M31>, MerkleDecommitment<H>)> {
        let grouped = columns_by_log_size(columns)?;
        if let Some(&log_size) = grouped.keys().next_back() {
            if log_size > self.max_log_size() {
                let index = columns
                    .iter()
                    .position(|c| c.len() == 1 << log_size)
                    .unwrap_or_default();
                return Err(MerkleError::InvalidColumnSize {
                    index,
                    len: 1 << log_size,
                });
            }
        }

        let mut queried_values = Vec::new();
        let mut decommitment = MerkleDecommitment::empty();
        let mut last_layer_queries: Vec<usize> = Vec::new();

        for log_size in (0..=self.max_log_size()).rev() {
            let layer_columns = grouped.get(&log_size).map(Vec::as_slice).unwrap_or(&[]);
            let previous_layer = self.layers.get(log_size as usize + 1);
            let own_queries = layer_queries(queries_per_log_size, log_size)?;

            let mut prev_queries = last_layer_queries.iter().copied().peekable();
            let mut layer_queries = own_queries.into_iter().peekable();
            let mut visited = Vec::new();

            while let Some(node) = next_decommitment_node(&mut prev_queries, &mut layer_queries) {
                if let Some(previous) = previous_layer {
                    if prev_queries.next_if_eq(&(2 * node)).is_none() {
                        decommitment.hash_witness.push(previous[2 * node]);
                    }
                    if prev_queries.next_if_eq(&(2 * node + 1)).is_none() {
                        decommitment.hash_witness.push(previous[2 * node + 1]);
                    }
                }

                let node_values = layer_columns.iter().map(|column| column[node]);
                if layer_queries.next_if_eq(&node).is_some() {
                    queried_values.extend(node_values);
                } else {
                    decommitment.column_witness.extend(node_values);
                }
                visited.push(node);
            }
            last_layer_queries = visited;
        }

        Ok((queried_values, decommitment))
    }
}

fn hash_layer<H: MerkleHasher>(
    log_size: u32,
    previous_layer: Option<&[H::Hash]>,
    columns: &[&[M31]],
) -> Vec<H::Hash> {
    let node_hash = |index: usize| {
        let children = previous_layer.map(|prev| (prev[2 * index], prev[2 * index + 1]));
        let values: Vec<M31> = columns.iter().map(|column| column[index]).collect();
        H::hash_node(children, &values)
    };
    let n_nodes = 1usize << log_size;

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
