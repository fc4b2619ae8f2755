//! Request and Response Models
//!
//! Data structures for API request and response payloads with validation.
//! Field rules live in `utils::validation`; the derive below wires every
//! field so a single `validate()` call reports all violations at once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::security_question::SecurityQuestionId;
use crate::models::user::User;
use crate::utils::validation::{
    address_validator, birthdate_validator, email_validator, extension_name_validator,
    id_number_validator, optional_address_validator, optional_person_name_validator,
    password_strength_validator, person_name_validator, username_validator, zip_code_validator,
};

/// Raw registration submission, exactly as collected from the form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// External member identifier, format `xxxx-xxxx`
    #[validate(custom(function = "id_number_validator"))]
    pub id_number: String,

    #[validate(custom(function = "person_name_validator"))]
    pub first_name: String,

    #[validate(custom(function = "optional_person_name_validator"))]
    pub middle_initial: Option<String>,

    #[validate(custom(function = "person_name_validator"))]
    pub last_name: String,

    /// Optional Jr./Sr./Roman-numeral extension, kept as raw text
    #[validate(custom(function = "extension_name_validator"))]
    pub name_extension: Option<String>,

    /// `YYYY-MM-DD`; the member must be of legal age
    #[validate(custom(function = "birthdate_validator"))]
    pub birthdate: String,

    #[validate(length(min = 1, message = "Sex is required."))]
    pub sex: String,

    /// Optional street-level address line
    #[validate(custom(function = "optional_address_validator"))]
    pub purok: Option<String>,

    #[validate(custom(function = "address_validator"))]
    pub barangay: String,

    #[validate(custom(function = "address_validator"))]
    pub city_municipality: String,

    #[validate(custom(function = "address_validator"))]
    pub province: String,

    #[validate(custom(function = "address_validator"))]
    pub country: String,

    #[validate(custom(function = "zip_code_validator"))]
    pub zip_code: String,

    #[validate(custom(function = "email_validator"))]
    pub email: String,

    #[validate(custom(function = "username_validator"))]
    pub username: String,

    /// Must carry all four character classes; violations name the missing ones
    #[validate(length(min = 8, message = "Password must be at least 8 characters long."))]
    #[validate(custom(function = "password_strength_validator"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,

    /// Selected catalog questions; must be pairwise distinct
    pub security_q1: SecurityQuestionId,
    pub security_q2: SecurityQuestionId,
    pub security_q3: SecurityQuestionId,

    #[validate(length(min = 1, message = "Security Question 1 and Answer are required."))]
    pub security_a1: String,

    #[validate(length(min = 1, message = "Security Question 2 and Answer are required."))]
    pub security_a2: String,

    #[validate(length(min = 1, message = "Security Question 3 and Answer are required."))]
    pub security_a3: String,
}

impl RegisterRequest {
    /// The three selected questions, in slot order.
    pub fn questions(&self) -> [SecurityQuestionId; 3] {
        [self.security_q1, self.security_q2, self.security_q3]
    }

    /// The three raw answers, in slot order.
    pub fn answers(&self) -> [&str; 3] {
        [&self.security_a1, &self.security_a2, &self.security_a3]
    }
}

/// Login submission: one identifier field matching username or ID number.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username or ID Number is required."))]
    pub identifier: String,

    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

/// First recovery stage: identify the account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BeginRecoveryRequest {
    #[validate(length(min = 1, message = "Please enter your username or ID number."))]
    pub identifier: String,
}

/// Second recovery stage: three answers plus their re-entry confirmations.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAnswersRequest {
    pub user_id: Uuid,
    pub answers: [String; 3],
    pub confirmations: [String; 3],
}

/// Terminal recovery operation: set the replacement password.
#[derive(Debug, Clone, Deserialize)]
pub struct SetPasswordRequest {
    pub new_password: String,
    pub confirm_password: String,
}

/// Response for a successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub message: String,
}

/// Response for a login attempt; `outcome` discriminates the three cases
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub outcome: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Whole seconds left on an active lockout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
    /// UX nudge from the browser session, independent of the lockout
    pub show_recovery_link: bool,
}

/// One question prompt shown during recovery
#[derive(Debug, Serialize)]
pub struct SecurityPrompt {
    pub id: String,
    pub prompt: String,
}

/// Response for a successful recovery-identifier lookup
#[derive(Debug, Serialize)]
pub struct RecoveryChallengeResponse {
    pub user_id: Uuid,
    pub username: String,
    pub prompts: Vec<SecurityPrompt>,
}

/// One catalog entry in the questions listing
#[derive(Debug, Serialize)]
pub struct QuestionCatalogEntry {
    pub id: &'static str,
    pub prompt: &'static str,
}

/// Response for the security-question catalog
#[derive(Debug, Serialize)]
pub struct QuestionCatalogResponse {
    pub version: u32,
    pub questions: Vec<QuestionCatalogEntry>,
}

/// Minimal message-only response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for health check
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::FieldErrors;

    fn valid_register_request() -> RegisterRequest {
        RegisterRequest {
            id_number: "2024-0001".to_string(),
            first_name: "Juan".to_string(),
            middle_initial: Some("D".to_string()),
            last_name: "Cruz".to_string(),
            name_extension: Some("Jr.".to_string()),
            birthdate: "1995-03-12".to_string(),
            sex: "male".to_string(),
            purok: Some("Purok 7".to_string()),
            barangay: "San Isidro".to_string(),
            city_municipality: "Davao City".to_string(),
            province: "Davao del Sur".to_string(),
            country: "Philippines".to_string(),
            zip_code: "8000".to_string(),
            email: "juan@example.com".to_string(),
            username: "juancruz".to_string(),
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

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_register_request().validate().is_ok());
    }

    #[test]
    fn test_all_violations_reported_in_one_pass() {
        let mut request = valid_register_request();
        request.id_number = "20240001".to_string();
        request.first_name = "JUAN".to_string();
        request.zip_code = "12".to_string();
        request.email = "not-an-email".to_string();
        request.password = "weak".to_string();
        request.confirm_password = "different".to_string();

        let errors: FieldErrors = request.validate().unwrap_err().into();
        assert!(errors.contains("id_number"));
        assert!(errors.contains("first_name"));
        assert!(errors.contains("zip_code"));
        assert!(errors.contains("email"));
        assert!(errors.contains("password"));
        assert!(errors.contains("confirm_password"));
    }

    #[test]
    fn test_password_confirmation_is_a_distinct_field_error() {
        let mut request = valid_register_request();
        request.confirm_password = "SecurePass123?".to_string();

        let errors: FieldErrors = request.validate().unwrap_err().into();
        assert!(errors.contains("confirm_password"));
        assert!(!errors.contains("password"));
    }

    #[test]
    fn test_short_password_and_missing_classes_both_reported() {
        let mut request = valid_register_request();
        request.password = "short".to_string();
        request.confirm_password = "short".to_string();

        let errors: FieldErrors = request.validate().unwrap_err().into();
        let messages = errors.get("password").unwrap().join(" ");
        assert!(messages.contains("at least 8 characters"));
        assert!(messages.contains("uppercase"));
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let mut request = valid_register_request();
        request.middle_initial = None;
        request.name_extension = None;
        request.purok = None;

        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_login_request_requires_both_fields() {
        let request = LoginRequest {
            identifier: String::new(),
            password: String::new(),
        };
        let errors: FieldErrors = request.validate().unwrap_err().into();
        assert!(errors.contains("identifier"));
        assert!(errors.contains("password"));
    }
}
