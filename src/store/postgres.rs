//! PostgreSQL Credential Store
//!
//! SQLx-backed implementation of [`CredentialStore`]. The failure-counter
//! update is a single `UPDATE ... RETURNING` so concurrent attempts against
//! the same row serialize on the row lock and no increment is lost.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::LockoutPolicy;
use crate::models::{NewUser, UserRecord};

use super::{CredentialStore, FailureRecord, StoreError, UniqueField};

const USER_COLUMNS: &str = "id, id_number, first_name, middle_initial, last_name, \
     name_extension, birthdate, age, sex, address, username, email, password_hash, \
     security_q1, security_a1_hash, security_q2, security_a2_hash, security_q3, \
     security_a3_hash, failed_login_attempts, lockout_until, created_at";

/// Credential store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Map a uniqueness violation back to the conflicting field by constraint name.
fn map_insert_error(error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        match db_error.constraint() {
            Some("users_id_number_key") => return StoreError::Conflict(UniqueField::IdNumber),
            Some("users_username_key") => return StoreError::Conflict(UniqueField::Username),
            Some("users_email_key") => return StoreError::Conflict(UniqueField::Email),
            _ => {}
        }
    }
    StoreError::Database(error)
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR id_number = $1"
        );
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn id_number_exists(&self, id_number: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id_number = $1)",
        )
        .bind(id_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn username_email_exists(
        &self,
        username: &str,
        email: &str,
    ) -> Result<(bool, bool), StoreError> {
        let taken = sqlx::query_as::<_, (bool, bool)>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1), \
                    EXISTS(SELECT 1 FROM users WHERE email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn insert_user(&self, user: NewUser) -> Result<Uuid, StoreError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO users (id_number, first_name, middle_initial, last_name, \
                 name_extension, birthdate, age, sex, address, username, email, \
                 password_hash, security_q1, security_a1_hash, security_q2, \
                 security_a2_hash, security_q3, security_a3_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, \
                 $15, $16, $17, $18) \
             RETURNING id",
        )
        .bind(&user.id_number)
        .bind(&user.first_name)
        .bind(&user.middle_initial)
        .bind(&user.last_name)
        .bind(&user.name_extension)
        .bind(user.birthdate)
        .bind(user.age)
        .bind(&user.sex)
        .bind(&user.address)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.security[0].question.key())
        .bind(&user.security[0].answer_hash)
        .bind(user.security[1].question.key())
        .bind(&user.security[1].answer_hash)
        .bind(user.security[2].question.key())
        .bind(&user.security[2].answer_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(id)
    }

    async fn record_login_failure(
        &self,
        user_id: Uuid,
        policy: &LockoutPolicy,
    ) -> Result<FailureRecord, StoreError> {
        // Increment and lockout derivation happen in one statement: the row
        // lock serializes concurrent attempts and the CASE sees the
        // post-increment count.
        let record = sqlx::query_as::<_, FailureRecord>(
            "UPDATE users \
             SET failed_login_attempts = failed_login_attempts + 1, \
                 lockout_until = CASE \
                     WHEN failed_login_attempts + 1 >= $2 THEN NOW() + make_interval(secs => $5) \
                     WHEN failed_login_attempts + 1 >= $3 THEN NOW() + make_interval(secs => $6) \
                     WHEN failed_login_attempts + 1 >= $4 THEN NOW() + make_interval(secs => $7) \
                     ELSE NULL \
                 END \
             WHERE id = $1 \
             RETURNING failed_login_attempts, lockout_until",
        )
        .bind(user_id)
        .bind(policy.tiers[0].threshold as i32)
        .bind(policy.tiers[1].threshold as i32)
        .bind(policy.tiers[2].threshold as i32)
        .bind(policy.tiers[0].duration_secs as f64)
        .bind(policy.tiers[1].duration_secs as f64)
        .bind(policy.tiers[2].duration_secs as f64)
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or(StoreError::NotFound)
    }

    async fn clear_login_failures(&self, user_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, lockout_until = NULL WHERE id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn reset_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users \
             SET password_hash = $2, failed_login_attempts = 0, lockout_until = NULL \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
