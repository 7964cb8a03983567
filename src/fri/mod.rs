//! FRI low-degree test over circle evaluations.
//!
//! The prover folds a secure-field circle evaluation once into a line
//! evaluation and then halves the line domain until it reaches the last-layer
//! size, committing to every layer before drawing its folding challenge. The
//! final evaluation is interpolated and sent in the clear; its degree bound is
//! what makes the test sound.
//!
//! Every committed layer stores the four base-field coordinates of its values
//! in one Merkle tree. Queries open whole folding cosets (the positions
//! `2i` and `2i + 1` in bit-reversed order); sibling values the verifier cannot
//! derive from the previous layer travel in the layer's `fri_witness`.

mod config;
mod folding;
mod proof;
mod prover;
mod verifier;


use thiserror::Error;

pub use config::{
    FriConfig, LOG_MAX_BLOWUP_FACTOR, LOG_MAX_LAST_LAYER_DEGREE_BOUND, MAX_N_QUERIES,
};
pub use folding::{fold_circle_into_line, fold_line, CIRCLE_TO_LINE_FOLD_STEP, FOLD_STEP};
pub use proof::{FriLayerProof, FriProof};
pub use prover::FriProver;
pub use verifier::FriVerifier;

use crate::field::FieldError;
use crate::merkle::MerkleError;
use crate::poly::PolyError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FriError {
    #[error("invalid FRI configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    #[error("column of log size {log_size} is too small for a last layer of log size {last_layer_log_size}")]
    ColumnTooSmall { log_size: u32, last_layer_log_size: u32 },
    #[error("last layer polynomial exceeds the degree bound")]
    InvalidLastLayerDegree,
    #[error("expected {expected} inner layers, proof has {got}")]
    InvalidNumFriLayers { expected: usize, got: usize },
    #[error("expected {expected} query evaluations, got {got}")]
    QueryCountMismatch { expected: usize, got: usize },
    #[error("queries have not been sampled")]
    QueriesNotSampled,
    #[error("fri witness of layer {layer} is too short")]
    WitnessTooShort { layer: usize },
    #[error("fri witness of layer {layer} is too long")]
    WitnessTooLong { layer: usize },
    #[error("commitment of layer {layer} rejected: {source}")]
    Merkle { layer: usize, source: MerkleError },
    #[error("folded values disagree with the last layer polynomial")]
    LastLayerEvaluationsInvalid,
    #[error(transparent)]
    Poly(#[from] PolyError),
    #[error(transparent)]
    Field(#[from] FieldError),
}

pub type FriResult<T> = Result<T, FriError>;
