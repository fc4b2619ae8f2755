//! User Model
//!
//! Credential-record data structures: the public user view, the internal
//! record carrying hashed secrets and lockout counters, and the insert
//! payload produced by a validated registration.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::security_question::SecurityQuestionId;

/// User representation for external responses.
///
/// Never carries the password hash, the answer hashes, or the raw answers.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Opaque, stable primary key assigned at creation
    pub id: Uuid,

    /// External-facing identifier, format `NNNN-NNNN`, unique and immutable
    pub id_number: String,

    /// Unique login handle, case-sensitive as stored
    pub username: String,

    /// Unique email address
    pub email: String,

    pub first_name: String,
    pub middle_initial: Option<String>,
    pub last_name: String,
    pub name_extension: Option<String>,
    pub birthdate: NaiveDate,
    pub age: i32,
    pub sex: String,

    /// Composite address joined from its registered components
    pub address: String,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,
}

/// Internal credential record including hashed secrets and lockout state.
///
/// Used by the credential store and the authentication core; never exposed
/// in API responses.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub id_number: String,
    pub first_name: String,
    pub middle_initial: Option<String>,
    pub last_name: String,
    pub name_extension: Option<String>,
    pub birthdate: NaiveDate,
    pub age: i32,
    pub sex: String,
    pub address: String,
    pub username: String,
    pub email: String,

    /// bcrypt hash of the password; the clear form is never stored or logged
    pub password_hash: String,

    /// Security slots as stored: catalog key plus bcrypt answer hash
    pub security_q1: String,
    pub security_a1_hash: String,
    pub security_q2: String,
    pub security_a2_hash: String,
    pub security_q3: String,
    pub security_a3_hash: String,

    /// Cumulative failed login attempts; reset to 0 on success
    pub failed_login_attempts: i32,

    /// Lockout expiry; `None` means not locked. May be stale (in the past)
    /// and must be re-checked against the clock at every use, never cached
    pub lockout_until: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// The three stored question keys, in slot order.
    pub fn question_keys(&self) -> [&str; 3] {
        [&self.security_q1, &self.security_q2, &self.security_q3]
    }

    /// The three stored answer hashes, in slot order.
    pub fn answer_hashes(&self) -> [&str; 3] {
        [
            &self.security_a1_hash,
            &self.security_a2_hash,
            &self.security_a3_hash,
        ]
    }
}

impl From<UserRecord> for User {
    /// Strips every secret-bearing field for external use.
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            id_number: record.id_number,
            username: record.username,
            email: record.email,
            first_name: record.first_name,
            middle_initial: record.middle_initial,
            last_name: record.last_name,
            name_extension: record.name_extension,
            birthdate: record.birthdate,
            age: record.age,
            sex: record.sex,
            address: record.address,
            created_at: record.created_at,
        }
    }
}

/// A registered security slot: catalog question plus hashed answer.
#[derive(Debug, Clone)]
pub struct SecurityAnswer {
    pub question: SecurityQuestionId,
    pub answer_hash: String,
}

/// Insert payload for a freshly validated registration.
///
/// All secrets arrive already hashed; counters start at zero.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id_number: String,
    pub first_name: String,
    pub middle_initial: Option<String>,
    pub last_name: String,
    pub name_extension: Option<String>,
    pub birthdate: NaiveDate,
    pub age: i32,
    pub sex: String,
    pub address: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub security: [SecurityAnswer; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            id_number: "2024-0001".to_string(),
            first_name: "Juan".to_string(),
            middle_initial: None,
            last_name: "Cruz".to_string(),
            name_extension: Some("Jr.".to_string()),
            birthdate: NaiveDate::from_ymd_opt(1995, 3, 12).unwrap(),
            age: 30,
            sex: "male".to_string(),
            address: "San Isidro, Davao City, Davao del Sur, Philippines, 8000".to_string(),
            username: "juancruz".to_string(),
            email: "juan@example.com".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            security_q1: "favorite_pet_name".to_string(),
            security_a1_hash: "$2b$04$a1".to_string(),
            security_q2: "city_of_birth".to_string(),
            security_a2_hash: "$2b$04$a2".to_string(),
            security_q3: "dream_job".to_string(),
            security_a3_hash: "$2b$04$a3".to_string(),
            failed_login_attempts: 0,
            lockout_until: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_view_strips_secrets() {
        let record = sample_record();
        let user: User = record.clone().into();

        assert_eq!(user.id, record.id);
        assert_eq!(user.username, "juancruz");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hash"));
        assert!(!json.contains("security"));
    }

    #[test]
    fn test_slot_accessors_keep_order() {
        let record = sample_record();
        assert_eq!(
            record.question_keys(),
            ["favorite_pet_name", "city_of_birth", "dream_job"]
        );
        assert_eq!(record.answer_hashes()[2], "$2b$04$a3");
    }
}
