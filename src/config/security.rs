//! Security Configuration
//!
//! Hashing cost, the progressive lockout policy, and the recovery-link
//! threshold. The lockout tiers are evaluated against the post-increment
//! failure count; a successful login is the only thing that resets them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::env;
use crate::utils::security::DEFAULT_BCRYPT_COST;

/// Security configuration errors
#[derive(Error, Debug)]
pub enum SecurityConfigError {
    #[error("Invalid configuration value for {key}: {value} - {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// One lockout tier: at `threshold` cumulative failures (post-increment),
/// lock for `duration_secs`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LockoutTier {
    pub threshold: u32,
    pub duration_secs: u64,
}

/// Progressive lockout policy.
///
/// Tiers are ordered highest threshold first; the first tier the failure
/// count reaches decides the lockout duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutPolicy {
    pub tiers: [LockoutTier; 3],
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            tiers: [
                LockoutTier {
                    threshold: 9,
                    duration_secs: 60,
                },
                LockoutTier {
                    threshold: 6,
                    duration_secs: 30,
                },
                LockoutTier {
                    threshold: 3,
                    duration_secs: 15,
                },
            ],
        }
    }
}

impl LockoutPolicy {
    /// Lockout duration for the given cumulative failure count, or `None`
    /// below the first threshold.
    pub fn lockout_duration(&self, failed_attempts: u32) -> Option<Duration> {
        self.tiers
            .iter()
            .find(|tier| failed_attempts >= tier.threshold)
            .map(|tier| Duration::from_secs(tier.duration_secs))
    }

    /// Whether the count has reached any lockout tier.
    pub fn locks_out(&self, failed_attempts: u32) -> bool {
        self.lockout_duration(failed_attempts).is_some()
    }
}

/// Security configuration for the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// bcrypt cost used for passwords and security answers
    pub bcrypt_cost: u32,

    /// Progressive login lockout policy
    pub lockout: LockoutPolicy,

    /// Consecutive session failures before the recovery link is shown
    pub recovery_link_threshold: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            lockout: LockoutPolicy::default(),
            recovery_link_threshold: 2,
        }
    }
}

impl SecurityConfig {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bcrypt_cost: env::get_u32("SECURITY_BCRYPT_COST", defaults.bcrypt_cost),
            lockout: defaults.lockout,
            recovery_link_threshold: env::get_u32(
                "SECURITY_RECOVERY_LINK_THRESHOLD",
                defaults.recovery_link_threshold,
            ),
        }
    }

    /// Validate invariants the rest of the service relies on.
    pub fn validate(&self) -> Result<(), SecurityConfigError> {
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(SecurityConfigError::InvalidValue {
                key: "SECURITY_BCRYPT_COST".to_string(),
                value: self.bcrypt_cost.to_string(),
                reason: "bcrypt cost must be between 4 and 31".to_string(),
            });
        }
        let thresholds: Vec<u32> = self.lockout.tiers.iter().map(|t| t.threshold).collect();
        if thresholds.windows(2).any(|pair| pair[0] <= pair[1]) {
            return Err(SecurityConfigError::InvalidValue {
                key: "lockout.tiers".to_string(),
                value: format!("{thresholds:?}"),
                reason: "tier thresholds must be strictly descending".to_string(),
            });
        }
        Ok(())
    }
}
