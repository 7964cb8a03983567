//! Byte hashers backing the Merkle commitments and the Fiat–Shamir channel.
//!
//! * [`blake2s`] – Blake2s-256, the default for commitments and transcripts.
//! * [`blake3`] – BLAKE3, an alternative Merkle hasher and the configuration
//!   digest function.

pub mod blake2s;
pub mod blake3;

use core::fmt::{Debug, Display};

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use self::blake2s::{Blake2sHash, Blake2sHasher};
pub use self::blake3::{Blake3Hash, Blake3Hasher};

/// Width of every digest produced in this crate.
pub const DIGEST_SIZE: usize = 32;

/// A fixed-width digest value.
pub trait HashDigest:
    Copy
    + Debug
    + Display
    + Default
    + PartialEq
    + Eq
    + Send
    + Sync
    + AsRef<[u8]>
    + Serialize
    + DeserializeOwned
    + 'static
{
    fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self;

    fn to_bytes(&self) -> [u8; DIGEST_SIZE];
}
