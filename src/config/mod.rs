//! Named commitment-scheme profiles, validation and configuration digests.
//!
//! A profile fixes the proof-of-work difficulty and the FRI parameters of a
//! deployment together with the conjectured security it must reach. The
//! [`ConfigDigest`] identifies a configuration across prover and verifier
//! implementations; it is the BLAKE3 hash of [`CONFIG_DIGEST_DOMAIN_TAG`]
//! followed by the canonical encoding below.
//!
//! | Offset | Field | Encoding |
//! |--------|-------|----------|
//! | 0..4 | `pow_bits` | `u32` little-endian |
//! | 4..8 | `fri.log_blowup_factor` | `u32` little-endian |
//! | 8..12 | `fri.log_last_layer_degree_bound` | `u32` little-endian |
//! | 12..20 | `fri.n_queries` | `u64` little-endian |

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fri::{
    FriConfig, LOG_MAX_BLOWUP_FACTOR, LOG_MAX_LAST_LAYER_DEGREE_BOUND, MAX_N_QUERIES,
};
use crate::hash::{Blake3Hasher, DIGEST_SIZE};
use crate::pcs::{PcsConfig, MAX_POW_BITS};

/// Domain separator prepended to the encoded configuration before hashing.
pub const CONFIG_DIGEST_DOMAIN_TAG: &[u8; 19] = b"CIRCLE-STARK-PCS-V1";

/// Length of the canonical configuration encoding.
pub const CONFIG_ENCODING_LEN: usize = 20;

/// Identifier of a configuration profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub u8);

/// Fast parameters for tests and local development. Not secure.
pub const PROFILE_TEST: ProfileId = ProfileId(0);
/// Balanced profile targeting 100 bits of conjectured security.
pub const PROFILE_STANDARD: ProfileId = ProfileId(1);
/// Profile targeting 128 bits, favouring blowup over queries.
pub const PROFILE_HISEC: ProfileId = ProfileId(2);

/// A named configuration and the security it is expected to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfileConfig {
    pub id: ProfileId,
    pub name: &'static str,
    pub pcs: PcsConfig,
    pub min_security_bits: u32,
}

pub const PROFILE_TEST_CONFIG: ProfileConfig = ProfileConfig {
    id: PROFILE_TEST,
    name: "test",
    pcs: PcsConfig {
        pow_bits: 5,
        fri_config: FriConfig {
            log_blowup_factor: 1,
            log_last_layer_degree_bound: 0,
            n_queries: 3,
        },
    },
    min_security_bits: 0,
};

pub const PROFILE_STANDARD_CONFIG: ProfileConfig = ProfileConfig {
    id: PROFILE_STANDARD,
    name: "standard",
    pcs: PcsConfig {
        pow_bits: 20,
        fri_config: FriConfig {
            log_blowup_factor: 2,
            log_last_layer_degree_bound: 0,
            n_queries: 40,
        },
    },
    min_security_bits: 100,
};

pub const PROFILE_HISEC_CONFIG: ProfileConfig = ProfileConfig {
    id: PROFILE_HISEC,
    name: "hisec",
    pcs: PcsConfig {
        pow_bits: 26,
        fri_config: FriConfig {
            log_blowup_factor: 3,
            log_last_layer_degree_bound: 1,
            n_queries: 34,
        },
    },
    min_security_bits: 128,
};

pub const ALL_PROFILES: [ProfileConfig; 3] = [
    PROFILE_TEST_CONFIG,
    PROFILE_STANDARD_CONFIG,
    PROFILE_HISEC_CONFIG,
];

/// Looks up a profile by identifier.
pub fn profile(id: ProfileId) -> Option<&'static ProfileConfig> {
    ALL_PROFILES.iter().find(|profile| profile.id == id)
}

/// Looks up a profile by name.
pub fn profile_by_name(name: &str) -> Option<&'static ProfileConfig> {
    ALL_PROFILES.iter().find(|profile| profile.name == name)
}

/// BLAKE3 digest identifying a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigDigest(pub [u8; DIGEST_SIZE]);

impl fmt::Display for ConfigDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Result of a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationReport {
    pub digest: ConfigDigest,
    pub security_bits: u32,
}

/// Reasons a configuration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("proof-of-work bits {got} exceed the maximum of {max}")]
    InvalidPowBits { max: u32, got: u32 },
    #[error("log blowup factor {got} exceeds the maximum of {max}")]
    InvalidBlowup { max: u32, got: u32 },
    #[error("log last layer degree bound {got} exceeds the maximum of {max}")]
    InvalidLastLayerDegreeBound { max: u32, got: u32 },
    #[error("at least {min} queries are required, got {got}")]
    InvalidQueries { min: usize, got: usize },
    #[error("at most {max} queries are supported, got {got}")]
    TooManyQueries { max: usize, got: usize },
    #[error("configuration provides {got} security bits, profile requires {min}")]
    SecurityBudgetTooLow { min: u32, got: u32 },
}

/// Canonical little-endian encoding of a configuration.
pub fn encode_config(config: &PcsConfig) -> [u8; CONFIG_ENCODING_LEN] {
    let mut out = [0u8; CONFIG_ENCODING_LEN];
    out[0..4].copy_from_slice(&config.pow_bits.to_le_bytes());
    out[4..8].copy_from_slice(&config.fri_config.log_blowup_factor.to_le_bytes());
    out[8..12].copy_from_slice(&config.fri_config.log_last_layer_degree_bound.to_le_bytes());
    out[12..20].copy_from_slice(&(config.fri_config.n_queries as u64).to_le_bytes());
    out
}

pub fn config_digest(config: &PcsConfig) -> ConfigDigest {
    let mut hasher = Blake3Hasher::new();
    hasher.update(CONFIG_DIGEST_DOMAIN_TAG);
    hasher.update(&encode_config(config));
    ConfigDigest(hasher.finalize().0)
}

/// Checks every parameter bound and returns the digest and security level.
pub fn validate(config: &PcsConfig) -> Result<ValidationReport, ConfigError> {
    if config.pow_bits > MAX_POW_BITS {
        return Err(ConfigError::InvalidPowBits {
            max: MAX_POW_BITS,
            got: config.pow_bits,
        });
    }
    let fri = &config.fri_config;
    if fri.log_blowup_factor > LOG_MAX_BLOWUP_FACTOR {
        return Err(ConfigError::InvalidBlowup {
            max: LOG_MAX_BLOWUP_FACTOR,
            got: fri.log_blowup_factor,
        });
    }
    if fri.log_last_layer_degree_bound > LOG_MAX_LAST_LAYER_DEGREE_BOUND {
        return Err(ConfigError::InvalidLastLayerDegreeBound {
            max: LOG_MAX_LAST_LAYER_DEGREE_BOUND,
            got: fri.log_last_layer_degree_bound,
        });
    }
    if fri.n_queries == 0 {
        return Err(ConfigError::InvalidQueries {
            min: 1,
            got: fri.n_queries,
        });
    }
    if fri.n_queries > MAX_N_QUERIES {
        return Err(ConfigError::TooManyQueries {
            max: MAX_N_QUERIES,
            got: fri.n_queries,
        });
    }
    Ok(ValidationReport {
        digest: config_digest(config),
        security_bits: config.security_bits(),
    })
}

impl ProfileConfig {
    /// Validates `config` and checks that it reaches this profile's security.
    pub fn check(&self, config: &PcsConfig) -> Result<ValidationReport, ConfigError> {
        let report = validate(config)?;
        if report.security_bits < self.min_security_bits {
            return Err(ConfigError::SecurityBudgetTooLow {
                min: self.min_security_bits,
                got: report.security_bits,
            });
        }
        Ok(report)
    }
}
