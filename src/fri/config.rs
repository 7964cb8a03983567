use serde::{Deserialize, Serialize};

use super::{FriError, FriResult};

pub const LOG_MAX_BLOWUP_FACTOR: u32 = 16;
pub const LOG_MAX_LAST_LAYER_DEGREE_BOUND: u32 = 10;
/// Largest accepted number of queries.
pub const MAX_N_QUERIES: usize = 1 << 16;

/// Parameters of the FRI protocol shared by prover and verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FriConfig {
    /// Log2 of the ratio between the committed domain and the polynomial
    /// degree bound.
    pub log_blowup_factor: u32,
    /// Log2 of the number of coefficients the last layer polynomial may have.
    pub log_last_layer_degree_bound: u32,
    pub n_queries: usize,
}

impl FriConfig {
    pub fn new(
        log_blowup_factor: u32,
        log_last_layer_degree_bound: u32,
        n_queries: usize,
    ) -> FriResult<Self> {
        let config = Self {
            log_blowup_factor,
            log_last_layer_degree_bound,
            n_queries,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FriResult<()> {
        if self.log_blowup_factor > LOG_MAX_BLOWUP_FACTOR {
            return Err(FriError::InvalidConfig {
                reason: "log blowup factor exceeds 16",
            });
        }
        if self.log_last_layer_degree_bound > LOG_MAX_LAST_LAYER_DEGREE_BOUND {
            return Err(FriError::InvalidConfig {
                reason: "log last layer degree bound exceeds 10",
            });
        }
        if self.n_queries == 0 {
            return Err(FriError::InvalidConfig {
                reason: "at least one query is required",
            });
        }
        if self.n_queries > MAX_N_QUERIES {
            return Err(FriError::InvalidConfig {
                reason: "number of queries exceeds 2^16",
            });
        }
        Ok(())
    }

    pub const fn log_last_layer_domain_size(&self) -> u32 {
        self.log_last_layer_degree_bound + self.log_blowup_factor
    }

    pub const fn last_layer_domain_size(&self) -> usize {
        1 << self.log_last_layer_domain_size()
    }

    /// Conjectured security of the low-degree test. Saturates instead of
    /// overflowing for configurations that were never validated.
    pub fn security_bits(&self) -> u32 {
        let n_queries = u32::try_from(self.n_queries).unwrap_or(u32::MAX);
        self.log_blowup_factor.saturating_mul(n_queries)
    }
}

impl Default for FriConfig {
    fn default() -> Self {
        Self {
            log_blowup_factor: 1,
            log_last_layer_degree_bound: 0,
            n_queries: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters() {
        let config = FriConfig::default();
        assert_eq!(config, FriConfig::new(1, 0, 3).expect("valid"));
        assert_eq!(config.last_layer_domain_size(), 2);
        assert_eq!(config.security_bits(), 3);
    }

    #[test]
    fn bounds_are_enforced() {
        assert!(FriConfig::new(16, 10, 1).is_ok());
        assert!(matches!(
            FriConfig::new(17, 0, 1),
            Err(FriError::InvalidConfig { .. })
        ));
        assert!(matches!(
            FriConfig::new(1, 11, 1),
            Err(FriError::InvalidConfig { .. })
        ));
        assert!(matches!(
            FriConfig::new(1, 0, 0),
            Err(FriError::InvalidConfig { .. })
        ));
        assert!(FriConfig::new(16, 0, MAX_N_QUERIES).is_ok());
        assert!(matches!(
            FriConfig::new(16, 0, 300_000_000),
            Err(FriError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn security_bits_saturate() {
        let config = FriConfig {
            log_blowup_factor: 16,
            log_last_layer_degree_bound: 0,
            n_queries: 300_000_000,
        };
        assert_eq!(config.security_bits(), u32::MAX);
        assert_eq!(
            FriConfig::new(16, 0, MAX_N_QUERIES).expect("valid").security_bits(),
            1 << 20
        );
    }

    #[test]
    fn last_layer_domain_combines_bound_and_blowup() {
        let config = FriConfig::new(2, 3, 10).expect("valid");
        assert_eq!(config.log_last_layer_domain_size(), 5);
        assert_eq!(config.last_layer_domain_size(), 32);
        assert_eq!(config.security_bits(), 20);
    }
}
