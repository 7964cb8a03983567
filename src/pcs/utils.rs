use std::collections::BTreeSet;

use super::{PcsError, PcsResult, TreeVec, PREPROCESSED_TRACE_IDX};
use crate::merkle::QueriesPerLogSize;
use crate::utils::lifted_index;

/// Maps query positions on a domain of `2^max_log_size` onto the preprocessed
/// tree's domain of `2^pp_max_log_size`.
///
/// A smaller preprocessed domain receives the lifted positions. A larger one
/// receives the first position of the block each query expands to.
pub fn prepare_preprocessed_query_positions(
    query_positions: &[usize],
    max_log_size: u32,
    pp_max_log_size: u32,
) -> Vec<usize> {
    if max_log_size < pp_max_log_size {
        let shift = pp_max_log_size - max_log_size;
        return query_positions
            .iter()
            .map(|&position| ((position >> 1) << (shift + 1)) + (position & 1))
            .collect();
    }
    query_positions
        .iter()
        .map(|&position| lifted_index(position, max_log_size - pp_max_log_size))
        .collect()
}

/// Log size of the lifting domain: the largest extended column log size of
/// the session.
///
/// Fails when nothing was committed or when a tree other than the
/// preprocessed one does not reach the lifting size.
pub fn lifting_log_size(column_log_sizes: &TreeVec<Vec<u32>>) -> PcsResult<u32> {
    let lifting_log_size = column_log_sizes
        .iter()
        .flatten()
        .copied()
        .max()
        .ok_or(PcsError::NoColumns)?;
    for (tree, log_sizes) in column_log_sizes.iter().enumerate() {
        let Some(&log_size) = log_sizes.iter().max() else {
            continue;
        };
        if log_size != lifting_log_size && tree != PREPROCESSED_TRACE_IDX {
            return Err(PcsError::UnsupportedTreeLogSize {
                tree,
                log_size,
                lifting_log_size,
            });
        }
    }
    Ok(lifting_log_size)
}

/// Positions to open in a tree, per column log size, for queries on the
/// lifting domain.
///
/// Only the preprocessed tree may be smaller than the lifting domain; its
/// queries are remapped with [`prepare_preprocessed_query_positions`] first.
pub fn tree_queries(
    queries: &[usize],
    lifting_log_size: u32,
    tree_index: usize,
    column_log_sizes: &[u32],
) -> PcsResult<QueriesPerLogSize> {
    let Some(&tree_log_size) = column_log_sizes.iter().max() else {
        return Ok(QueriesPerLogSize::new());
    };
    if tree_log_size != lifting_log_size && tree_index != PREPROCESSED_TRACE_IDX {
        return Err(PcsError::UnsupportedTreeLogSize {
            tree: tree_index,
            log_size: tree_log_size,
            lifting_log_size,
        });
    }
    let positions =
        prepare_preprocessed_query_positions(queries, lifting_log_size, tree_log_size);

    let log_sizes: BTreeSet<u32> = column_log_sizes.iter().copied().collect();
    Ok(log_sizes
        .into_iter()
        .map(|log_size| {
            let layer: BTreeSet<usize> = positions
                .iter()
                .map(|&position| lifted_index(position, tree_log_size - log_size))
                .collect();
            (log_size, layer.into_iter().collect())
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smaller_preprocessed_domain_is_lifted() {
        let positions = [0, 1, 5, 6, 15];
        assert_eq!(
            prepare_preprocessed_query_positions(&positions, 4, 3),
            vec![0, 1, 3, 2, 7]
        );
        assert_eq!(prepare_preprocessed_query_positions(&positions, 4, 4), positions);
    }

    #[test]
    fn larger_preprocessed_domain_is_projected() {
        assert_eq!(
            prepare_preprocessed_query_positions(&[0, 1, 2, 3], 2, 4),
            vec![0, 1, 8, 9]
        );
    }

    #[test]
    fn lifting_size_is_the_largest_tree() {
        let sizes = TreeVec::new(vec![vec![3], vec![5, 4], vec![], vec![5]]);
        assert_eq!(lifting_log_size(&sizes), Ok(5));
        let sizes = TreeVec::new(vec![vec![5], vec![4]]);
        assert_eq!(
            lifting_log_size(&sizes),
            Err(PcsError::UnsupportedTreeLogSize {
                tree: 1,
                log_size: 4,
                lifting_log_size: 5
            })
        );
        assert_eq!(lifting_log_size(&TreeVec::new(vec![vec![]])), Err(PcsError::NoColumns));
    }

    #[test]
    fn tree_queries_per_log_size() {
        let queries = tree_queries(&[1, 6, 13], 4, 1, &[4, 2, 4]).expect("queries");
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[&4], vec![1, 6, 13]);
        assert_eq!(queries[&2], vec![0, 1, 3]);
    }

    #[test]
    fn only_preprocessed_tree_may_be_smaller() {
        let preprocessed = tree_queries(&[1, 6, 13], 4, PREPROCESSED_TRACE_IDX, &[3]).expect("queries");
        assert_eq!(preprocessed[&3], vec![1, 2, 7]);

        assert_eq!(
            tree_queries(&[1], 4, 2, &[3]),
            Err(PcsError::UnsupportedTreeLogSize {
                tree: 2,
                log_size: 3,
                lifting_log_size: 4
            })
        );
        assert!(tree_queries(&[1], 4, 2, &[]).expect("empty").is_empty());
    }
}
