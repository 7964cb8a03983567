use serde::{Deserialize, Serialize};

use super::{PcsError, PcsResult};
use crate::channel::Channel;
use crate::fri::FriConfig;

/// Largest accepted proof-of-work difficulty.
pub const MAX_POW_BITS: u32 = 32;

/// Parameters of the commitment scheme shared by prover and verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PcsConfig {
    pub pow_bits: u32,
    pub fri_config: FriConfig,
}

impl PcsConfig {
    pub fn new(pow_bits: u32, fri_config: FriConfig) -> PcsResult<Self> {
        let config = Self {
            pow_bits,
            fri_config,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PcsResult<()> {
        if self.pow_bits > MAX_POW_BITS {
            return Err(PcsError::InvalidConfig {
                reason: "proof-of-work bits exceed 32",
            });
        }
        self.fri_config.validate()?;
        Ok(())
    }

    pub fn security_bits(&self) -> u32 {
        self.pow_bits.saturating_add(self.fri_config.security_bits())
    }

    /// Binds the transcript to this configuration.
    ///
    /// Not called by the commitment scheme itself; callers that want proofs
    /// tied to their parameters absorb them before the first commitment.
    /// The query count is absorbed as two 32-bit limbs, low limb first.
    pub fn mix_into(&self, channel: &mut impl Channel) {
        let FriConfig {
            log_blowup_factor,
            log_last_layer_degree_bound,
            n_queries,
        } = self.fri_config;
        let n_queries = n_queries as u64;
        channel.mix_u32s(&[
            self.pow_bits,
            log_blowup_factor,
            n_queries as u32,
            (n_queries >> 32) as u32,
            log_last_layer_degree_bound,
        ]);
    }
}

impl Default for PcsConfig {
    fn default() -> Self {
        Self {
            pow_bits: 5,
            fri_config: FriConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Blake2sChannel;

    #[test]
    fn default_security() {
        let config = PcsConfig::default();
        assert_eq!(config.pow_bits, 5);
        assert_eq!(config.security_bits(), 5 + 3);
    }

    #[test]
    fn excessive_pow_bits_are_rejected() {
        assert!(matches!(
            PcsConfig::new(33, FriConfig::default()),
            Err(PcsError::InvalidConfig { .. })
        ));
        assert!(PcsConfig::new(32, FriConfig::default()).is_ok());
    }

    #[test]
    fn mixing_depends_on_every_parameter() {
        let digest = |config: PcsConfig| {
            let mut channel = Blake2sChannel::default();
            config.mix_into(&mut channel);
            channel.digest()
        };
        let base = PcsConfig::default();
        let mut more_queries = base;
        more_queries.fri_config.n_queries += 1;
        let mut more_pow = base;
        more_pow.pow_bits += 1;

        assert_eq!(digest(base), digest(base));
        assert_ne!(digest(base), digest(more_queries));
        assert_ne!(digest(base), digest(more_pow));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn query_counts_do_not_alias() {
        let digest = |config: PcsConfig| {
            let mut channel = Blake2sChannel::default();
            config.mix_into(&mut channel);
            channel.digest()
        };
        let base = PcsConfig::default();
        let mut wide = base;
        wide.fri_config.n_queries += 1 << 32;
        assert_ne!(digest(base), digest(wide));
        assert!(wide.validate().is_err());
        assert_eq!(wide.security_bits(), u32::MAX);
    }
}
