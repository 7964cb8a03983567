use tracing::debug;

use super::Channel;

#[cfg(feature = "parallel")]
const GRIND_BATCH: u64 = 1 << 12;

/// Smallest nonce passing [`Channel::verify_pow_nonce`] for `pow_bits`.
///
/// With the `parallel` feature the search checks batches of nonces on the
/// rayon pool and keeps the first hit of each batch, so the result is the
/// same as the serial search.
pub fn grind<C: Channel>(channel: &C, pow_bits: u32) -> u64 {
    let nonce = search(channel, pow_bits);
    debug!(pow_bits, nonce, "proof of work found");
    nonce
}

#[cfg(feature = "parallel")]
fn search<C: Channel>(channel: &C, pow_bits: u32) -> u64 {
    if !crate::utils::parallelism_enabled() {
        return serial_search(channel, pow_bits);
    }
    use rayon::prelude::*;
    let mut start = 0u64;
    loop {
        let hit = (start..start + GRIND_BATCH)
            .into_par_iter()
            .find_first(|&nonce| channel.verify_pow_nonce(pow_bits, nonce));
        if let Some(nonce) = hit {
            return nonce;
        }
        start += GRIND_BATCH;
    }
}

#[cfg(not(feature = "parallel"))]
fn search<C: Channel>(channel: &C, pow_bits: u32) -> u64 {
    serial_search(channel, pow_bits)
}

fn serial_search<C: Channel>(channel: &C, pow_bits: u32) -> u64 {
    let mut nonce = 0u64;
    while !channel.verify_pow_nonce(pow_bits, nonce) {
        nonce += 1;
    }
    nonce
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Blake2sChannel;

    #[test]
    fn zero_bits_grinds_to_zero() {
        assert_eq!(grind(&Blake2sChannel::default(), 0), 0);
    }

    #[test]
    fn grind_returns_smallest_valid_nonce() {
        let mut channel = Blake2sChannel::default();
        channel.mix_u64(42);
        let nonce = grind(&channel, 8);
        assert!(channel.verify_pow_nonce(8, nonce));
        assert!((0..nonce).all(|n| !channel.verify_pow_nonce(8, n)));
        assert_eq!(serial_search(&channel, 8), nonce);
    }

    #[test]
    fn grinding_is_verifiable_up_to_twelve_bits() {
        let mut channel = Blake2sChannel::default();
        channel.mix_u32s(&[1, 2, 3]);
        for bits in 0..=12 {
            let nonce = grind(&channel, bits);
            assert!(channel.verify_pow_nonce(bits, nonce), "bits = {bits}");
        }
    }
}
