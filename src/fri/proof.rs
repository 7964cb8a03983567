use serde::{Deserialize, Serialize};

use crate::field::QM31;
use crate::merkle::{MerkleDecommitment, MerkleHasher};
use crate::poly::LinePoly;

/// Opening of one committed FRI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct FriLayerProof<H: MerkleHasher> {
    /// Coset values not implied by the queries, in query order.
    pub fri_witness: Vec<QM31>,
    pub decommitment: MerkleDecommitment<H>,
    pub commitment: H::Hash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct FriProof<H: MerkleHasher> {
    pub first_layer: FriLayerProof<H>,
    pub inner_layers: Vec<FriLayerProof<H>>,
    pub last_layer_poly: LinePoly,
}

impl<H: MerkleHasher> FriProof<H> {
    /// Number of committed layers, the circle layer included.
    pub fn n_layers(&self) -> usize {
        1 + self.inner_layers.len()
    }

    pub fn layers(&self) -> impl Iterator<Item = &FriLayerProof<H>> {
        core::iter::once(&self.first_layer).chain(&self.inner_layers)
    }
}
