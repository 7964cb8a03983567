//! Fiat–Shamir channel shared by the prover and the verifier.
//!
//! The channel is a deterministic state machine over a single 32-byte digest.
//! Every mix replaces the digest with a hash of the old digest and the mixed
//! data; every draw hashes the digest with a draw counter, so consecutive
//! draws differ without touching the digest. Both sides must issue the same
//! operations in the same order. The PCS drives the channel as follows:
//!
//! | Step | Operation | Data |
//! |------|-----------|------|
//! | Commit | [`MerkleChannel::mix_root`] | root of each committed tree, in commit order |
//! | Sample | [`Channel::mix_felts`] | all sampled values, tree → column → point |
//! | Sample | [`Channel::draw_secure_felt`] | random coefficient of the quotient combination |
//! | FRI | [`MerkleChannel::mix_root`], [`Channel::draw_secure_felt`] | layer root, then folding challenge |
//! | FRI | [`Channel::mix_felts`] | last-layer polynomial coefficients |
//! | PoW | [`Channel::mix_u64`] | grinding nonce |
//! | Queries | [`Channel::draw_u32s`] | query positions |

mod blake2s;
mod pow;
mod queries;

use core::fmt::Debug;

pub use blake2s::{Blake2sChannel, BLAKE_BYTES_PER_HASH, FELTS_PER_HASH};
pub use pow::grind;
pub use queries::{draw_queries, Queries};

use crate::field::{M31, QM31};
use crate::hash::HashDigest;
use crate::merkle::{Blake2sMerkleHasher, Blake3MerkleHasher, MerkleHasher};

pub trait Channel: Default + Clone + Debug + Send + Sync {
    const BYTES_PER_HASH: usize;

    /// Whether `H(H(prefix, digest, n_bits), nonce)` has at least `n_bits`
    /// trailing zero bits.
    fn verify_pow_nonce(&self, n_bits: u32, nonce: u64) -> bool;

    // Mix functions.
    fn mix_bytes(&mut self, data: &[u8]);
    fn mix_u32s(&mut self, data: &[u32]);
    fn mix_felts(&mut self, felts: &[QM31]);
    fn mix_u64(&mut self, value: u64);

    // Draw functions.
    fn draw_base_felt(&mut self) -> M31;
    fn draw_secure_felt(&mut self) -> QM31;
    /// Draws `n_felts` uniform secure field elements.
    fn draw_secure_felts(&mut self, n_felts: usize) -> Vec<QM31>;
    /// Draws the words of one hash output.
    fn draw_u32s(&mut self) -> Vec<u32>;
}

/// Pairs a channel with the Merkle hasher whose roots it absorbs.
pub trait MerkleChannel: Default + Debug + Clone + Send + Sync + 'static {
    type C: Channel;
    type H: MerkleHasher;

    fn mix_root(channel: &mut Self::C, root: <Self::H as MerkleHasher>::Hash);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Blake2sMerkleChannel;

impl MerkleChannel for Blake2sMerkleChannel {
    type C = Blake2sChannel;
    type H = Blake2sMerkleHasher;

    fn mix_root(channel: &mut Blake2sChannel, root: <Blake2sMerkleHasher as MerkleHasher>::Hash) {
        channel.mix_bytes(&root.to_bytes());
    }
}

/// BLAKE3 commitments driven by the Blake2s transcript.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Blake3MerkleChannel;

impl MerkleChannel for Blake3MerkleChannel {
    type C = Blake2sChannel;
    type H = Blake3MerkleHasher;

    fn mix_root(channel: &mut Blake2sChannel, root: <Blake3MerkleHasher as MerkleHasher>::Hash) {
        channel.mix_bytes(&root.to_bytes());
    }
}
