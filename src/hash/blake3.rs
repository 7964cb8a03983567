use core::fmt;

use serde::{Deserialize, Serialize};

use super::{HashDigest, DIGEST_SIZE};

/// A BLAKE3 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Blake3Hash(pub [u8; DIGEST_SIZE]);

impl fmt::Debug for Blake3Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blake3Hash(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for Blake3Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Blake3Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl HashDigest for Blake3Hash {
    fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    fn to_bytes(&self) -> [u8; DIGEST_SIZE] {
        self.0
    }
}

/// Incremental BLAKE3 hasher.
#[derive(Clone, Debug, Default)]
pub struct Blake3Hasher {
    state: blake3::Hasher,
}

impl Blake3Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    pub fn finalize(self) -> Blake3Hash {
        Blake3Hash(*self.state.finalize().as_bytes())
    }

    pub fn hash(data: &[u8]) -> Blake3Hash {
        Blake3Hash(*blake3::hash(data).as_bytes())
    }

    pub fn concat_and_hash(lhs: &Blake3Hash, rhs: &Blake3Hash) -> Blake3Hash {
        let mut hasher = Self::new();
        hasher.update(&lhs.0);
        hasher.update(&rhs.0);
        hasher.finalize()
    }
}
