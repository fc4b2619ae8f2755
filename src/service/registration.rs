//! Registration Service
//!
//! The registration validation pipeline. Every rule is checked
//! independently so a submission reports all of its violations in one pass;
//! on success the password and the three security answers are hashed
//! independently and the new credential record is inserted with its
//! counters at zero.

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::models::{NewUser, RegisterRequest, SecurityAnswer};
use crate::store::{CredentialStore, StoreError};
use crate::utils::{
    error::{AppError, FieldErrors},
    security::hash_secret_with_cost,
    validation::{compute_age, parse_birthdate},
};

/// Registration errors
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// One or more fields failed validation; the map carries all of them
    #[error("Validation failed for {} field(s)", .0.len())]
    Invalid(FieldErrors),

    /// Backing-store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Hashing failure
    #[error("hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

impl From<RegistrationError> for AppError {
    fn from(error: RegistrationError) -> Self {
        match error {
            RegistrationError::Invalid(fields) => AppError::Validation(fields),
            RegistrationError::Store(e) => AppError::Store(e),
            RegistrationError::Hashing(e) => AppError::Hashing(e),
        }
    }
}

/// Result type for registration operations
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Gates every write of a new credential record into the store.
pub struct RegistrationService {
    store: Arc<dyn CredentialStore>,
    bcrypt_cost: u32,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn CredentialStore>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// Validates a raw registration and inserts the new user.
    ///
    /// Field rules and the id-number uniqueness probe run unconditionally;
    /// the username/email uniqueness probe runs only once every field rule
    /// passes, so account existence is not leaked to garbage input. The
    /// store's unique constraints remain the final backstop for races, and
    /// a lost race comes back as the corresponding field error.
    pub async fn register(&self, request: RegisterRequest) -> RegistrationResult<Uuid> {
        let mut errors: FieldErrors = match request.validate() {
            Ok(()) => FieldErrors::new(),
            Err(validation_errors) => validation_errors.into(),
        };

        let questions = request.questions();
        if questions[0] == questions[1]
            || questions[0] == questions[2]
            || questions[1] == questions[2]
        {
            errors.insert("security_q1", "Each security question must be unique.");
        }

        let id_number_format_ok = !errors.contains("id_number");
        let field_rules_pass = errors.is_empty();

        // Checked early, independent of every other field.
        if id_number_format_ok && self.store.id_number_exists(&request.id_number).await? {
            errors.insert("id_number", "ID Number already exists.");
        }

        if field_rules_pass {
            let (username_taken, email_taken) = self
                .store
                .username_email_exists(&request.username, &request.email)
                .await?;
            if username_taken {
                errors.insert("username", "Username already exists.");
            }
            if email_taken {
                errors.insert("email", "Email already exists.");
            }
        }

        if !errors.is_empty() {
            return Err(RegistrationError::Invalid(errors));
        }

        // Validation guarantees the birthdate parses; re-deriving keeps this
        // path total instead of panicking.
        let birthdate = parse_birthdate(&request.birthdate).ok_or_else(|| {
            RegistrationError::Invalid(FieldErrors::single(
                "birthdate",
                "Invalid birthdate format.",
            ))
        })?;
        let age = compute_age(birthdate, chrono::Utc::now().date_naive());

        let password_hash = hash_secret_with_cost(&request.password, self.bcrypt_cost)?;
        let answers = request.answers();
        let security = [
            SecurityAnswer {
                question: questions[0],
                answer_hash: hash_secret_with_cost(answers[0], self.bcrypt_cost)?,
            },
            SecurityAnswer {
                question: questions[1],
                answer_hash: hash_secret_with_cost(answers[1], self.bcrypt_cost)?,
            },
            SecurityAnswer {
                question: questions[2],
                answer_hash: hash_secret_with_cost(answers[2], self.bcrypt_cost)?,
            },
        ];

        let address = compose_address(&request);
        let new_user = NewUser {
            id_number: request.id_number,
            first_name: request.first_name,
            middle_initial: request.middle_initial.filter(|v| !v.is_empty()),
            last_name: request.last_name,
            name_extension: request.name_extension.filter(|v| !v.is_empty()),
            birthdate,
            age,
            sex: request.sex,
            address,
            username: request.username,
            email: request.email,
            password_hash,
            security,
        };

        match self.store.insert_user(new_user).await {
            Ok(user_id) => Ok(user_id),
            // Lost uniqueness race: surface the conflicting field, not a
            // generic failure.
            Err(StoreError::Conflict(field)) => Err(RegistrationError::Invalid(
                FieldErrors::single(field.field_name(), field.conflict_message()),
            )),
            Err(other) => Err(other.into()),
        }
    }
}

// Join the registered address components, skipping empty optional parts.
fn compose_address(request: &RegisterRequest) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(purok) = request.purok.as_deref() {
        if !purok.is_empty() {
            parts.push(purok);
        }
    }
    for part in [
        &request.barangay,
        &request.city_municipality,
        &request.province,
        &request.country,
        &request.zip_code,
    ] {
        if !part.is_empty() {
            parts.push(part);
        }
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SecurityQuestionId;
    use crate::store::InMemoryCredentialStore;
    use crate::utils::security::verify_secret;

    const TEST_COST: u32 = 4;

    fn service() -> (Arc<InMemoryCredentialStore>, RegistrationService) {
        let store = Arc::new(InMemoryCredentialStore::new());
        let service = RegistrationService::new(store.clone(), TEST_COST);
        (store, service)
    }

    fn request(id_number: &str, username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            id_number: id_number.to_string(),
            first_name: "Juan".to_string(),
            middle_initial: None,
            last_name: "Cruz".to_string(),
            name_extension: None,
            birthdate: "1995-03-12".to_string(),
            sex: "male".to_string(),
            purok: Some("Purok 7".to_string()),
            barangay: "San Isidro".to_string(),
            city_municipality: "Davao City".to_string(),
            province: "Davao del Sur".to_string(),
            country: "Philippines".to_string(),
            zip_code: "8000".to_string(),
            email: email.to_string(),
            username: username.to_string(),
            password: "SecurePass123!".to_string(),
            confirm_password: "SecurePass123!".to_string(),
            security_q1: SecurityQuestionId::FavoritePetName,
            security_q2: SecurityQuestionId::CityOfBirth,
            security_q3: SecurityQuestionId::DreamJob,
            security_a1: "Bantay".to_string(),
            security_a2: "Davao".to_string(),
            security_a3: "Pilot".to_string(),
        }
    }

    fn invalid_fields(error: RegistrationError) -> FieldErrors {
        match error {
            RegistrationError::Invalid(fields) => fields,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_success_hashes_secrets() {
        let (store, service) = service();

        let user_id = service
            .register(request("2024-0001", "juan", "juan@example.com"))
            .await
            .unwrap();

        let record = store.find_by_id(user_id).await.unwrap().unwrap();
        assert_ne!(record.password_hash, "SecurePass123!");
        assert!(verify_secret("SecurePass123!", &record.password_hash).unwrap());
        assert!(verify_secret("Bantay", &record.security_a1_hash).unwrap());
        assert!(verify_secret("Pilot", &record.security_a3_hash).unwrap());
        assert_eq!(record.failed_login_attempts, 0);
        assert!(record.lockout_until.is_none());
        assert_eq!(
            record.address,
            "Purok 7, San Isidro, Davao City, Davao del Sur, Philippines, 8000"
        );
    }

    #[tokio::test]
    async fn test_all_three_conflicts_reported_together() {
        let (_store, service) = service();
        service
            .register(request("2024-0001", "juan", "juan@example.com"))
            .await
            .unwrap();

        let error = service
            .register(request("2024-0001", "juan", "juan@example.com"))
            .await
            .unwrap_err();
        let fields = invalid_fields(error);

        assert!(fields.contains("id_number"));
        assert!(fields.contains("username"));
        assert!(fields.contains("email"));
    }

    #[tokio::test]
    async fn test_id_conflict_checked_even_with_other_field_errors() {
        let (_store, service) = service();
        service
            .register(request("2024-0001", "juan", "juan@example.com"))
            .await
            .unwrap();

        let mut second = request("2024-0001", "maria", "maria@example.com");
        second.first_name = "MARIA".to_string(); // local rule violation

        let fields = invalid_fields(service.register(second).await.unwrap_err());
        assert!(fields.contains("id_number"));
        assert!(fields.contains("first_name"));
        // Existence of username/email must not leak while input is unsound.
        assert!(!fields.contains("username"));
        assert!(!fields.contains("email"));
    }

    #[tokio::test]
    async fn test_duplicate_questions_rejected() {
        let (_store, service) = service();
        let mut req = request("2024-0001", "juan", "juan@example.com");
        req.security_q2 = SecurityQuestionId::FavoritePetName;

        let fields = invalid_fields(service.register(req).await.unwrap_err());
        assert!(fields.contains("security_q1"));
    }

    #[tokio::test]
    async fn test_invalid_submission_reports_every_field() {
        let (store, service) = service();
        let mut req = request("bad", "user with spaces", "not-an-email");
        req.password = "weak".to_string();
        req.confirm_password = "other".to_string();

        let fields = invalid_fields(service.register(req).await.unwrap_err());
        assert!(fields.contains("id_number"));
        assert!(fields.contains("username"));
        assert!(fields.contains("email"));
        assert!(fields.contains("password"));
        assert!(fields.contains("confirm_password"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_empty_optionals_stored_as_none() {
        let (store, service) = service();
        let mut req = request("2024-0001", "juan", "juan@example.com");
        req.middle_initial = Some(String::new());
        req.purok = None;

        let user_id = service.register(req).await.unwrap();
        let record = store.find_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(record.middle_initial, None);
        assert_eq!(
            record.address,
            "San Isidro, Davao City, Davao del Sur, Philippines, 8000"
        );
    }
}
