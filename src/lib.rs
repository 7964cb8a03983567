//! Circle-STARK commitment engine over the Mersenne-31 field.
//!
//! ```text
//! field ─► circle ─► poly/fft ─► merkle ─► fri ─► pcs ─► proof
//!                                  ▲        ▲      ▲
//!                                  └──── channel ──┘
//! ```
//!
//! Columns of base field values are committed in Merkle trees over canonic
//! circle domains. The [`pcs::CommitmentSchemeProver`] opens them at
//! out-of-domain points by folding every claimed value into a single quotient
//! column whose low degree is established with FRI. The
//! [`pcs::CommitmentSchemeVerifier`] replays the Fiat–Shamir
//! [`channel`] and accepts only if every Merkle opening and the FRI test pass.
//!
//! The crate does not install a `tracing` subscriber. With the default
//! `parallel` feature, column extension, Merkle hashing, quotient evaluation
//! and grinding run on the rayon pool; [`utils::set_parallelism`] switches it
//! off at runtime.

pub mod channel;
pub mod circle;
pub mod config;
pub mod fft;
pub mod field;
pub mod fri;
pub mod hash;
pub mod merkle;
pub mod pcs;
pub mod poly;
pub mod proof;
pub mod ser;
pub mod utils;

use thiserror::Error;

pub use channel::{
    Blake2sChannel, Blake2sMerkleChannel, Blake3MerkleChannel, Channel, MerkleChannel,
};
pub use config::{ConfigError, ProfileConfig, ValidationReport};
pub use field::{FieldError, CM31, M31, QM31};
pub use fri::{FriConfig, FriError};
pub use merkle::MerkleError;
pub use pcs::{
    CommitmentSchemeProof, CommitmentSchemeProver, CommitmentSchemeVerifier, PcsConfig, PcsError,
    TreeVec, VerificationError,
};
pub use poly::PolyError;
pub use proof::{decode_proof, encode_proof, SizeEstimate, StarkProof};
pub use ser::SerError;

/// Every error the engine can surface, for callers that do not need to
/// distinguish the layer it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StarkError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Poly(#[from] PolyError),
    #[error(transparent)]
    Merkle(#[from] MerkleError),
    #[error(transparent)]
    Fri(#[from] FriError),
    #[error(transparent)]
    Pcs(#[from] PcsError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Ser(#[from] SerError),
}

pub type StarkResult<T> = core::result::Result<T, StarkError>;
