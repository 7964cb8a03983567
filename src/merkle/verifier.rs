use std::collections::BTreeMap;

use tracing::warn;

use super::{
    layer_queries, min_node, MerkleDecommitment, MerkleError, MerkleHasher, MerkleResult,
    QueriesPerLogSize,
};
use crate::field::M31;

/// Verifier side of a commitment: the root plus the log sizes of the
/// committed columns in commit order.
#[derive(Debug, Clone)]
pub struct MerkleVerifier<H: MerkleHasher> {
    pub root: H::Hash,
    pub column_log_sizes: Vec<u32>,
    n_columns_per_log_size: BTreeMap<u32, usize>,
}

impl<H: MerkleHasher> MerkleVerifier<H> {
    pub fn new(root: H::Hash, column_log_sizes: Vec<u32>) -> Self {
        let mut n_columns_per_log_size = BTreeMap::new();
        for &log_size in &column_log_sizes {
            *n_columns_per_log_size.entry(log_size).or_insert(0) += 1;
        }
        Self {
            root,
            column_log_sizes,
            n_columns_per_log_size,
        }
    }

    /// Recomputes the root from the queried values and the witness and
    /// compares it with the commitment.
    ///
    /// `queried_values` must be in the order produced by
    /// [`MerkleProver::decommit`](super::MerkleProver::decommit).
    pub fn verify(
        &self,
        queries_per_log_size: &QueriesPerLogSize,
        queried_values: Vec<M31>,
        decommitment: MerkleDecommitment<H>,
    ) -> MerkleResult<()> {
        let Some(&max_log_size) = self.n_columns_per_log_size.keys().next_back() else {
            return self.check_root(H::hash_node(None, &[]));
        };

        let mut queried_values = queried_values.into_iter();
        let mut hash_witness = decommitment.hash_witness.into_iter();
        let mut column_witness = decommitment.column_witness.into_iter();

        let mut last_layer_hashes: Option<Vec<(usize, H::Hash)>> = None;
        for log_size in (0..=max_log_size).rev() {
            let n_columns = self
                .n_columns_per_log_size
                .get(&log_size)
                .copied()
                .unwrap_or(0);

            let mut prev_layer = last_layer_hashes.take().map(|h| h.into_iter().peekable());
            let mut layer_queries = layer_queries(queries_per_log_size, log_size)?
                .into_iter()
                .peekable();

            let mut layer_hashes = Vec::new();
            loop {
                let parent = prev_layer
                    .as_mut()
                    .and_then(|prev| prev.peek())
                    .map(|(index, _)| *index / 2);
                let Some(node) = min_node(parent, layer_queries.peek().copied()) else {
                    break;
                };

                let children = match prev_layer.as_mut() {
                    Some(prev) => {
                        let left = match prev.next_if(|(index, _)| *index == 2 * node) {
                            Some((_, hash)) => hash,
                            None => hash_witness.next().ok_or(MerkleError::WitnessTooShort)?,
                        };
                        let right = match prev.next_if(|(index, _)| *index == 2 * node + 1) {
                            Some((_, hash)) => hash,
                            None => hash_witness.next().ok_or(MerkleError::WitnessTooShort)?,
                        };
                        Some((left, right))
                    }
                    None => None,
                };

                let values: Vec<M31> = if layer_queries.next_if_eq(&node).is_some() {
                    take_exact(&mut queried_values, n_columns)
                        .ok_or(MerkleError::TooFewQueriedValues)?
                } else {
                    take_exact(&mut column_witness, n_columns)
                        .ok_or(MerkleError::WitnessTooShort)?
                };
                layer_hashes.push((node, H::hash_node(children, &values)));
            }
            last_layer_hashes = Some(layer_hashes);
        }

        if hash_witness.next().is_some() || column_witness.next().is_some() {
            return Err(MerkleError::WitnessTooLong);
        }
        if queried_values.next().is_some() {
            return Err(MerkleError::TooManyQueriedValues);
        }

        let computed_root = match last_layer_hashes.as_deref() {
            Some([(_, root)]) => *root,
            _ => return Err(MerkleError::WitnessTooShort),
        };
        self.check_root(computed_root)
    }

    fn check_root(&self, computed: H::Hash) -> MerkleResult<()> {
        if computed == self.root {
            Ok(())
        } else {
            warn!(expected = %self.root, computed = %computed, "merkle root mismatch");
            Err(MerkleError::RootMismatch)
        }
    }
}

fn take_exact(values: &mut impl Iterator<Item = M31>, n: usize) -> Option<Vec<M31>> {
    let taken: Vec<M31> = values.take(n).collect();
    (taken.len() == n).then_some(taken)
}
