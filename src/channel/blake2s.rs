use core::iter;

use itertools::Itertools;

use super::Channel;
use crate::field::{M31, P, QM31, SECURE_EXTENSION_DEGREE};
use crate::hash::{Blake2sHash, Blake2sHasher};

pub const BLAKE_BYTES_PER_HASH: usize = 32;
pub const FELTS_PER_HASH: usize = 8;

/// Channel drawing its randomness from a Blake2s digest.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Blake2sChannel {
    digest: Blake2sHash,
    n_draws: u32,
}

impl Blake2sChannel {
    pub const POW_PREFIX: u32 = 0x12345678;

    pub fn digest(&self) -> Blake2sHash {
        self.digest
    }

    pub fn update_digest(&mut self, new_digest: Blake2sHash) {
        self.digest = new_digest;
        self.n_draws = 0;
    }

    /// One hash worth of base field elements.
    fn draw_base_felts(&mut self) -> [M31; FELTS_PER_HASH] {
        // Retry probability per round is about 2^-28.
        loop {
            let words = self.draw_word_block();
            if words.iter().all(|&word| word < 2 * P) {
                return words.map(|word| M31::reduce(word as u64));
            }
        }
    }

    fn draw_word_block(&mut self) -> [u32; FELTS_PER_HASH] {
        let mut hasher = Blake2sHasher::new();
        hasher.update(self.digest.as_ref());
        hasher.update(&self.n_draws.to_le_bytes());
        // Separates drawing from mixing a single word.
        hasher.update(&[0u8]);
        self.n_draws += 1;

        let bytes = hasher.finalize().0;
        let mut words = [0u32; FELTS_PER_HASH];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        words
    }

    fn absorb(&mut self, data: &[u8]) {
        let mut hasher = Blake2sHasher::new();
        hasher.update(self.digest.as_ref());
        hasher.update(data);
        self.update_digest(hasher.finalize());
    }
}

impl Channel for Blake2sChannel {
    const BYTES_PER_HASH: usize = BLAKE_BYTES_PER_HASH;

    fn verify_pow_nonce(&self, n_bits: u32, nonce: u64) -> bool {
        let mut hasher = Blake2sHasher::new();
        hasher.update(&Self::POW_PREFIX.to_le_bytes());
        hasher.update(&[0u8; 12]);
        hasher.update(self.digest.as_ref());
        hasher.update(&n_bits.to_le_bytes());
        let prefixed = hasher.finalize();

        let mut hasher = Blake2sHasher::new();
        hasher.update(prefixed.as_ref());
        hasher.update(&nonce.to_le_bytes());
        let result = hasher.finalize().0;

        let mut low = [0u8; 16];
        low.copy_from_slice(&result[..16]);
        u128::from_le_bytes(low).trailing_zeros() >= n_bits
    }

    fn mix_bytes(&mut self, data: &[u8]) {
        self.absorb(data);
    }

    fn mix_u32s(&mut self, data: &[u32]) {
        let bytes = data.iter().flat_map(|word| word.to_le_bytes()).collect_vec();
        self.absorb(&bytes);
    }

    fn mix_felts(&mut self, felts: &[QM31]) {
        let bytes = felts
            .iter()
            .flat_map(|felt| felt.to_m31_array())
            .flat_map(|m31| m31.to_le_bytes())
            .collect_vec();
        self.absorb(&bytes);
    }

    fn mix_u64(&mut self, value: u64) {
        self.mix_u32s(&[value as u32, (value >> 32) as u32]);
    }

    fn draw_base_felt(&mut self) -> M31 {
        self.draw_base_felts()[0]
    }

    fn draw_secure_felt(&mut self) -> QM31 {
        let felts = self.draw_base_felts();
        QM31::from_m31_array([felts[0], felts[1], felts[2], felts[3]])
    }

    fn draw_secure_felts(&mut self, n_felts: usize) -> Vec<QM31> {
        let mut felts = iter::from_fn(|| Some(self.draw_base_felts())).flatten();
        (0..n_felts)
            .map(|_| {
                let mut coords = [M31::default(); SECURE_EXTENSION_DEGREE];
                for coord in &mut coords {
                    // The source iterator is infinite.
                    *coord = felts.next().unwrap_or_default();
                }
                QM31::from_m31_array(coords)
            })
            .collect()
    }

    fn draw_u32s(&mut self) -> Vec<u32> {
        self.draw_word_block().to_vec()
    }
}
