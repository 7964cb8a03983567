use core::fmt;

use blake2::{Blake2s256, Digest};
use serde::{Deserialize, Serialize};

use super::{HashDigest, DIGEST_SIZE};

/// A Blake2s-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Blake2sHash(pub [u8; DIGEST_SIZE]);

impl fmt::Debug for Blake2sHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blake2sHash(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for Blake2sHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Blake2sHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; DIGEST_SIZE]> for Blake2sHash {
    fn from(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }
}

impl HashDigest for Blake2sHash {
    fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    fn to_bytes(&self) -> [u8; DIGEST_SIZE] {
        self.0
    }
}

/// Incremental Blake2s-256 hasher.
#[derive(Clone, Default)]
pub struct Blake2sHasher {
    state: Blake2s256,
}

impl fmt::Debug for Blake2sHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blake2sHasher").finish_non_exhaustive()
    }
}

impl Blake2sHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.state, data);
    }

    pub fn finalize(self) -> Blake2sHash {
        Blake2sHash(self.state.finalize().into())
    }

    pub fn hash(data: &[u8]) -> Blake2sHash {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }

    pub fn concat_and_hash(lhs: &Blake2sHash, rhs: &Blake2sHash) -> Blake2sHash {
        let mut hasher = Self::new();
        hasher.update(&lhs.0);
        hasher.update(&rhs.0);
        hasher.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_vector() {
        assert_eq!(
            Blake2sHasher::hash(b"").to_string(),
            "69217a3079908094e11121d042354a7c1f55b6482ca1a51e1b250dfd1ed0eef9"
        );
    }

    #[test]
    fn incremental_matches_one_shot() {
        let mut hasher = Blake2sHasher::new();
        hasher.update(b"circle");
        hasher.update(b"-stark");
        assert_eq!(hasher.finalize(), Blake2sHasher::hash(b"circle-stark"));
    }

    #[test]
    fn concat_and_hash_is_ordered() {
        let a = Blake2sHasher::hash(b"a");
        let b = Blake2sHasher::hash(b"b");
        assert_ne!(
            Blake2sHasher::concat_and_hash(&a, &b),
            Blake2sHasher::concat_and_hash(&b, &a)
        );
        let mut joined = a.0.to_vec();
        joined.extend_from_slice(&b.0);
        assert_eq!(Blake2sHasher::concat_and_hash(&a, &b), Blake2sHasher::hash(&joined));
    }
}
