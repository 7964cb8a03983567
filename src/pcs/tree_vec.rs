use core::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

/// Index of the preprocessed tree, the only one that may be smaller than the
/// lifting domain.
pub const PREPROCESSED_TRACE_IDX: usize = 0;

/// Columns of a single tree, in commit order.
pub type ColumnVec<T> = Vec<T>;

/// One entry per commitment tree, in commit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeVec<T>(pub Vec<T>);

impl<T> TreeVec<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self(values)
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> TreeVec<U> {
        TreeVec(self.0.into_iter().map(f).collect())
    }

    pub fn as_ref(&self) -> TreeVec<&T> {
        TreeVec(self.0.iter().collect())
    }

    pub fn zip<U>(self, other: TreeVec<U>) -> TreeVec<(T, U)> {
        TreeVec(self.0.into_iter().zip(other.0).collect())
    }
}

impl<T> TreeVec<ColumnVec<T>> {
    /// All columns of all trees, tree by tree.
    pub fn flatten(self) -> Vec<T> {
        self.0.into_iter().flatten().collect()
    }

    pub fn n_columns(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    pub fn map_cols<U, F: FnMut(T) -> U>(self, mut f: F) -> TreeVec<ColumnVec<U>> {
        self.map(|column| column.into_iter().map(&mut f).collect())
    }
}

impl<T> TreeVec<ColumnVec<Vec<T>>> {
    /// All per-column entries, column by column and tree by tree.
    pub fn flatten_cols(self) -> Vec<T> {
        self.0.into_iter().flatten().flatten().collect()
    }
}

impl<T> From<Vec<T>> for TreeVec<T> {
    fn from(values: Vec<T>) -> Self {
        Self(values)
    }
}

impl<T> Default for TreeVec<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> IntoIterator for TreeVec<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a TreeVec<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T> FromIterator<T> for TreeVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> Deref for TreeVec<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.0
    }
}

impl<T> DerefMut for TreeVec<T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_keeps_tree_order() {
        let trees = TreeVec::new(vec![vec![1, 2], vec![], vec![3]]);
        assert_eq!(trees.n_columns(), 3);
        assert_eq!(trees.flatten(), vec![1, 2, 3]);
    }

    #[test]
    fn flatten_cols_keeps_point_order() {
        let trees = TreeVec::new(vec![vec![vec!['a', 'b'], vec!['c']], vec![vec!['d']]]);
        assert_eq!(trees.flatten_cols(), vec!['a', 'b', 'c', 'd']);
    }

    #[test]
    fn default_and_iteration_need_no_bounds() {
        // Neither trait is implemented for the element type.
        struct Tree(u32);

        let mut trees = TreeVec::<Tree>::default();
        assert!(trees.is_empty());
        trees.push(Tree(3));
        trees.push(Tree(5));
        assert_eq!((&trees).into_iter().map(|tree| tree.0).sum::<u32>(), 8);

        let sizes: Vec<u32> = trees
            .into_iter()
            .zip(TreeVec::new(vec![1u32, 2]))
            .map(|(tree, extra)| tree.0 + extra)
            .collect();
        assert_eq!(sizes, vec![4, 7]);
    }

    #[test]
    fn zip_and_map() {
        let sizes = TreeVec::new(vec![3u32, 4]);
        let names = TreeVec::new(vec!["pre", "main"]);
        let joined = sizes.zip(names).map(|(size, name)| format!("{name}:{size}"));
        assert_eq!(joined.0, vec!["pre:3", "main:4"]);
    }
}
