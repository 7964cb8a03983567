use core::fmt::Debug;

use crate::field::M31;
use crate::hash::{Blake2sHash, Blake2sHasher, Blake3Hash, Blake3Hasher, HashDigest};

/// Prefix absorbed before the values of a node without children.
pub const LEAF_PREFIX: [u8; 64] = padded_tag(b"leaf");
/// Prefix absorbed before the children of an inner node.
pub const NODE_PREFIX: [u8; 64] = padded_tag(b"node");

const fn padded_tag(tag: &[u8; 4]) -> [u8; 64] {
    let mut out = [0u8; 64];
    let mut i = 0;
    while i < tag.len() {
        out[i] = tag[i];
        i += 1;
    }
    out
}

/// Hash abstraction used by the commitment layer.
pub trait MerkleHasher:
    Debug + Default + Clone + PartialEq + Eq + Send + Sync + 'static
{
    type Hash: HashDigest;

    /// Hashes a node from its optional children and the column values
    /// stored at it.
    fn hash_node(children: Option<(Self::Hash, Self::Hash)>, column_values: &[M31]) -> Self::Hash;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Blake2sMerkleHasher;

impl MerkleHasher for Blake2sMerkleHasher {
    type Hash = Blake2sHash;

    fn hash_node(children: Option<(Blake2sHash, Blake2sHash)>, column_values: &[M31]) -> Blake2sHash {
        let mut hasher = Blake2sHasher::new();
        match children {
            Some((left, right)) => {
                hasher.update(&NODE_PREFIX);
                hasher.update(left.as_ref());
                hasher.update(right.as_ref());
            }
            None => hasher.update(&LEAF_PREFIX),
        }
        for value in column_values {
            hasher.update(&value.to_le_bytes());
        }
        hasher.finalize()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Blake3MerkleHasher;

impl MerkleHasher for Blake3MerkleHasher {
    type Hash = Blake3Hash;

    fn hash_node(children: Option<(Blake3Hash, Blake3Hash)>, column_values: &[M31]) -> Blake3Hash {
        let mut hasher = Blake3Hasher::new();
        match children {
            Some((left, right)) => {
                hasher.update(&NODE_PREFIX);
                hasher.update(left.as_ref());
                hasher.update(right.as_ref());
            }
            None => hasher.update(&LEAF_PREFIX),
        }
        for value in column_values {
            hasher.update(&value.to_le_bytes());
        }
        hasher.finalize()
    }
}
