//! In-Memory Credential Store
//!
//! [`CredentialStore`] implementation over a mutex-guarded map. Mirrors the
//! uniqueness and atomic-counter semantics of the PostgreSQL store so the
//! service layer can be exercised without a database; used throughout the
//! test suite and usable for local experiments.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::config::LockoutPolicy;
use crate::models::{NewUser, UserRecord};

use super::{CredentialStore, FailureRecord, StoreError, UniqueField};

/// Credential store held entirely in memory.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Test hook: overwrite a user's lockout expiry directly.
    pub fn set_lockout_until(&self, user_id: Uuid, until: Option<chrono::DateTime<Utc>>) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
            user.lockout_until = until;
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .values()
            .find(|u| u.username == identifier || u.id_number == identifier)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn id_number_exists(&self, id_number: &str) -> Result<bool, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().any(|u| u.id_number == id_number))
    }

    async fn username_email_exists(
        &self,
        username: &str,
        email: &str,
    ) -> Result<(bool, bool), StoreError> {
        let users = self.users.lock().unwrap();
        let username_taken = users.values().any(|u| u.username == username);
        let email_taken = users.values().any(|u| u.email == email);
        Ok((username_taken, email_taken))
    }

    async fn insert_user(&self, user: NewUser) -> Result<Uuid, StoreError> {
        let mut users = self.users.lock().unwrap();

        // Uniqueness backstop, in constraint order.
        if users.values().any(|u| u.id_number == user.id_number) {
            return Err(StoreError::Conflict(UniqueField::IdNumber));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(UniqueField::Username));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }

        let id = Uuid::new_v4();
        let [a1, a2, a3] = user.security;
        users.insert(
            id,
            UserRecord {
                id,
                id_number: user.id_number,
                first_name: user.first_name,
                middle_initial: user.middle_initial,
                last_name: user.last_name,
                name_extension: user.name_extension,
                birthdate: user.birthdate,
                age: user.age,
                sex: user.sex,
                address: user.address,
                username: user.username,
                email: user.email,
                password_hash: user.password_hash,
                security_q1: a1.question.key().to_string(),
                security_a1_hash: a1.answer_hash,
                security_q2: a2.question.key().to_string(),
                security_a2_hash: a2.answer_hash,
                security_q3: a3.question.key().to_string(),
                security_a3_hash: a3.answer_hash,
                failed_login_attempts: 0,
                lockout_until: None,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn record_login_failure(
        &self,
        user_id: Uuid,
        policy: &LockoutPolicy,
    ) -> Result<FailureRecord, StoreError> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound)?;

        user.failed_login_attempts += 1;
        user.lockout_until = policy
            .lockout_duration(user.failed_login_attempts as u32)
            .map(|d| Utc::now() + Duration::seconds(d.as_secs() as i64));

        Ok(FailureRecord {
            failed_login_attempts: user.failed_login_attempts,
            lockout_until: user.lockout_until,
        })
    }

    async fn clear_login_failures(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.failed_login_attempts = 0;
        user.lockout_until = None;
        Ok(())
    }

    async fn reset_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.password_hash = password_hash.to_string();
        user.failed_login_attempts = 0;
        user.lockout_until = None;
        Ok(())
    }
}
