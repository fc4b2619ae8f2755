//! Credential Store
//!
//! The narrow query surface the authentication core needs from its backing
//! store: lookup by identifier or id, uniqueness probes, insert with
//! uniqueness enforcement, and conditional counter updates. The concurrency
//! hazards (counter read-modify-write, registration uniqueness races) are
//! resolved here by the database's atomic update and unique-constraint
//! semantics, not by application-level locking.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCredentialStore;
pub use postgres::PgCredentialStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::config::LockoutPolicy;
use crate::models::{NewUser, UserRecord};

/// A uniquely-constrained user field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    IdNumber,
    Username,
    Email,
}

impl UniqueField {
    /// Request-payload field name this constraint maps back to.
    pub fn field_name(self) -> &'static str {
        match self {
            UniqueField::IdNumber => "id_number",
            UniqueField::Username => "username",
            UniqueField::Email => "email",
        }
    }

    /// User-facing conflict message.
    pub fn conflict_message(self) -> &'static str {
        match self {
            UniqueField::IdNumber => "ID Number already exists.",
            UniqueField::Username => "Username already exists.",
            UniqueField::Email => "Email already exists.",
        }
    }
}

/// Credential store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// No row for the given user id
    #[error("user not found")]
    NotFound,

    /// Insert rejected by a uniqueness constraint; carries the conflicting
    /// field so callers can surface a field-level error
    #[error("{} already exists", .0.field_name())]
    Conflict(UniqueField),

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Counter state after recording a failed login attempt.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FailureRecord {
    pub failed_login_attempts: i32,
    pub lockout_until: Option<DateTime<Utc>>,
}

/// Narrow persistence interface for member credential records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Liveness probe for the health endpoint.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Look a user up by login identifier: matches `username` or `id_number`.
    async fn find_by_identifier(&self, identifier: &str)
        -> Result<Option<UserRecord>, StoreError>;

    /// Look a user up by primary key.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Whether a user with this external id number already exists.
    async fn id_number_exists(&self, id_number: &str) -> Result<bool, StoreError>;

    /// Whether the username and/or the email are already taken.
    async fn username_email_exists(
        &self,
        username: &str,
        email: &str,
    ) -> Result<(bool, bool), StoreError>;

    /// Insert a new user row with counters at zero. Uniqueness races lost at
    /// insert time surface as [`StoreError::Conflict`] naming the field.
    async fn insert_user(&self, user: NewUser) -> Result<Uuid, StoreError>;

    /// Atomically increment the failure counter and derive the new lockout
    /// expiry from `policy` in the same store operation, returning both so
    /// the request that crossed a threshold can report the lockout itself.
    async fn record_login_failure(
        &self,
        user_id: Uuid,
        policy: &LockoutPolicy,
    ) -> Result<FailureRecord, StoreError>;

    /// Reset the failure counter and clear any lockout (successful login).
    async fn clear_login_failures(&self, user_id: Uuid) -> Result<(), StoreError>;

    /// Overwrite the password hash and clear the failure counter and lockout
    /// (successful recovery lifts any lockout).
    async fn reset_password(&self, user_id: Uuid, password_hash: &str)
        -> Result<(), StoreError>;
}
