use core::fmt;

use serde::Serialize;
use thiserror::Error;

/// Section of an encoding that failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SerKind {
    /// Top-level framing: version and trailing data.
    Proof,
    /// Commitment-scheme parameters.
    Config,
    /// Merkle roots of the committed trees.
    Commitments,
    /// Out-of-domain sampled values.
    SampledValues,
    /// Merkle decommitments of the committed trees.
    Decommitments,
    /// Values opened at the query positions.
    QueriedValues,
    /// Embedded FRI proof.
    Fri,
}

impl fmt::Display for SerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerKind::Proof => write!(f, "proof"),
            SerKind::Config => write!(f, "config"),
            SerKind::Commitments => write!(f, "commitments"),
            SerKind::SampledValues => write!(f, "sampled values"),
            SerKind::Decommitments => write!(f, "decommitments"),
            SerKind::QueriedValues => write!(f, "queried values"),
            SerKind::Fri => write!(f, "fri"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerError {
    /// Input ended before the expected number of bytes were read.
    #[error("{kind}: unexpected end of input while reading {field}")]
    UnexpectedEnd { kind: SerKind, field: &'static str },
    /// A length prefix exceeds `u32` or the remaining input.
    #[error("{kind}: invalid length for {field}")]
    InvalidLength { kind: SerKind, field: &'static str },
    /// Non-canonical field element, unknown version or rejected parameter.
    #[error("{kind}: invalid value for {field}")]
    InvalidValue { kind: SerKind, field: &'static str },
    #[error("{kind}: {remaining} trailing bytes after offset {consumed}")]
    TrailingBytes {
        kind: SerKind,
        consumed: usize,
        remaining: usize,
    },
}

impl SerError {
    pub fn unexpected_end(kind: SerKind, field: &'static str) -> Self {
        SerError::UnexpectedEnd { kind, field }
    }

    pub fn invalid_length(kind: SerKind, field: &'static str) -> Self {
        SerError::InvalidLength { kind, field }
    }

    pub fn invalid_value(kind: SerKind, field: &'static str) -> Self {
        SerError::InvalidValue { kind, field }
    }

    pub fn trailing_bytes(kind: SerKind, consumed: usize, remaining: usize) -> Self {
        SerError::TrailingBytes {
            kind,
            consumed,
            remaining,
        }
    }

    /// Section in which the error occurred.
    pub fn kind(&self) -> SerKind {
        match *self {
            SerError::UnexpectedEnd { kind, .. }
            | SerError::InvalidLength { kind, .. }
            | SerError::InvalidValue { kind, .. }
            | SerError::TrailingBytes { kind, .. } => kind,
        }
    }
}

pub type SerResult<T> = core::result::Result<T, SerError>;
