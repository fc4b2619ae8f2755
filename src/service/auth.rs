//! Authentication Service
//!
//! The login lockout engine. Lockout state is re-derived from the stored
//! `lockout_until` timestamp against the clock on every evaluation, never
//! from a cached flag; that is what lets an expired lockout heal itself
//! without any background job.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

use crate::config::LockoutPolicy;
use crate::models::User;
use crate::store::{CredentialStore, StoreError};
use crate::utils::{error::AppError, security::verify_secret};

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Backing-store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Hashing failure
    #[error("hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Store(e) => AppError::Store(e),
            AuthError::Hashing(e) => AppError::Hashing(e),
        }
    }
}

/// Result of evaluating one login attempt.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Credentials verified; counters were reset
    Success(User),

    /// The account is locked; the password was NOT checked.
    /// Carries the whole seconds left so callers can render a countdown
    LockedOut { remaining_seconds: u64 },

    /// Unknown identifier or wrong password, deliberately indistinguishable
    InvalidCredentials,
}

/// Evaluates login attempts against the credential store.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    policy: LockoutPolicy,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, policy: LockoutPolicy) -> Self {
        Self { store, policy }
    }

    /// Evaluates one login attempt.
    ///
    /// Order matters: the lockout window is checked before the password is
    /// ever touched (fail closed), and a failure that crosses a lockout
    /// threshold reports the lockout in the same request that caused it.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let Some(user) = self.store.find_by_identifier(identifier).await? else {
            // No row means no counter to escalate; the response must not
            // reveal that the identifier does not exist.
            return Ok(LoginOutcome::InvalidCredentials);
        };

        let now = Utc::now();
        if let Some(remaining) = remaining_lockout_seconds(user.lockout_until, now) {
            return Ok(LoginOutcome::LockedOut {
                remaining_seconds: remaining,
            });
        }

        if verify_secret(password, &user.password_hash)? {
            self.store.clear_login_failures(user.id).await?;
            log::info!("successful login for user {}", user.id);
            return Ok(LoginOutcome::Success(user.into()));
        }

        let failure = self
            .store
            .record_login_failure(user.id, &self.policy)
            .await?;
        log::warn!(
            "failed login for user {} (attempt {})",
            user.id,
            failure.failed_login_attempts
        );

        if let Some(remaining) = remaining_lockout_seconds(failure.lockout_until, Utc::now()) {
            return Ok(LoginOutcome::LockedOut {
                remaining_seconds: remaining,
            });
        }
        Ok(LoginOutcome::InvalidCredentials)
    }
}

/// Whole seconds left on a lockout, or `None` when the stored expiry is
/// absent or already in the past. A sub-second remainder still counts as
/// locked for one more second.
fn remaining_lockout_seconds(
    lockout_until: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<u64> {
    let until = lockout_until?;
    if until <= now {
        return None;
    }
    Some((until - now).num_seconds().max(1) as u64)
}
