//! Polynomial commitment scheme over circle evaluations.
//!
//! A session commits to an ordered list of trees. Each tree is a set of base
//! field columns, extended by the blowup factor and committed with one Merkle
//! tree whose root is mixed into the channel. To open, the prover evaluates
//! every column at its sample points, mixes all sampled values, draws a
//! random coefficient and folds every `(column, sample)` pair into one secure
//! quotient column, which is then tested with FRI. The Merkle trees are
//! opened at the positions FRI queried.
//!
//! All columns are lifted to the largest extended domain of the session, the
//! lifting domain: a column of extended log size `e` is read at row `i` of the
//! lifting domain of log size `L` as its value at
//! [`lifted_index(i, L - e)`](crate::utils::lifted_index), which is the value
//! of the column's polynomial at the `(L - e)`-fold doubling of the row's
//! point. Samples are therefore taken at the matching doubling of the
//! requested point.

mod config;
mod proof;
mod prover;
mod quotients;
mod tree_vec;
mod utils;
mod verifier;

#[cfg(test)]
mod tests;

use thiserror::Error;

pub use config::{PcsConfig, MAX_POW_BITS};
pub use proof::{CommitmentSchemeProof, CommitmentSchemeProofAux, ExtendedCommitmentSchemeProof};
pub use prover::{CommitmentSchemeProver, CommitmentTreeProver, CommittedColumn};
pub use quotients::{
    accumulate_row_quotients, complex_conjugate_line_coeffs, compute_fri_quotients, fri_answers,
    ColumnSampleBatch, PointSample, QuotientConstants,
};
pub use tree_vec::{ColumnVec, TreeVec, PREPROCESSED_TRACE_IDX};
pub use utils::{lifting_log_size, prepare_preprocessed_query_positions, tree_queries};
pub use verifier::CommitmentSchemeVerifier;

use crate::field::FieldError;
use crate::fri::FriError;
use crate::merkle::MerkleError;
use crate::poly::PolyError;

/// Failures on the proving side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PcsError {
    #[error("invalid commitment scheme configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    #[error("nothing has been committed")]
    NoColumns,
    #[error("column {column} of the committed tree is not over a canonic domain")]
    NonCanonicDomain { column: usize },
    #[error("{what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("tree {tree} has log size {log_size}, below the lifting log size {lifting_log_size}")]
    UnsupportedTreeLogSize {
        tree: usize,
        log_size: u32,
        lifting_log_size: u32,
    },
    #[error("sample point is fixed by complex conjugation")]
    DegenerateSample,
    #[error("no opened value for column {column} at position {position}")]
    MissingQueriedValue { column: usize, position: usize },
    #[error(transparent)]
    Merkle(#[from] MerkleError),
    #[error(transparent)]
    Fri(#[from] FriError),
    #[error(transparent)]
    Poly(#[from] PolyError),
    #[error(transparent)]
    Field(#[from] FieldError),
}

pub type PcsResult<T> = Result<T, PcsError>;

/// Reasons a proof is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("proof was produced with a different configuration")]
    ConfigMismatch,
    #[error("commitment of tree {tree} differs from the committed root")]
    CommitmentMismatch { tree: usize },
    #[error("proof shape mismatch in {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("invalid proof of work")]
    ProofOfWork,
    #[error("tree {tree} decommitment rejected: {source}")]
    Merkle { tree: usize, source: MerkleError },
    #[error(transparent)]
    Fri(#[from] FriError),
    #[error("composition polynomial disagrees with the constraints at the sample point")]
    ConstraintsNotSatisfied,
    #[error(transparent)]
    Pcs(#[from] PcsError),
}

pub type VerificationResult<T> = Result<T, VerificationError>;
