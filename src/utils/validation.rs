//! Validation Utilities
//!
//! Field-level validation functions for registration input. Each function
//! checks one field in full and returns the first violation for that field;
//! callers run every field so that a single submission reports all of its
//! problems at once.

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use validator::ValidationError;

/// Minimum age accepted at registration.
pub const MINIMUM_AGE: i32 = 18;

fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Validates the external member identifier, format `NNNN-NNNN`.
pub fn id_number_validator(id_number: &str) -> Result<(), ValidationError> {
    static ID_NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = ID_NUMBER_REGEX.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{4}$").expect("Failed to compile id number regex")
    });

    if id_number.is_empty() {
        return Err(field_error("id_number_required", "ID Number is required."));
    }
    if !regex.is_match(id_number) {
        return Err(field_error(
            "id_number_format",
            "ID Number must be in the format xxxx-xxxx.",
        ));
    }
    Ok(())
}

/// Validates a personal-name field (first name, last name, middle initial).
///
/// Letters, spaces, hyphens and periods only; no doubled spaces; not all
/// capitals past one character; no 3 consecutive identical letters; every
/// word capitalized followed by lowercase letters.
pub fn person_name_validator(name: &str) -> Result<(), ValidationError> {
    static CHARSET_REGEX: OnceLock<Regex> = OnceLock::new();
    static CASING_REGEX: OnceLock<Regex> = OnceLock::new();

    let charset = CHARSET_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z\s.-]*$").expect("Failed to compile name regex"));
    let casing = CASING_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Z][a-z]*(\s[A-Z][a-z]*)*$").expect("Failed to compile name casing regex")
    });

    if name.is_empty() {
        return Err(field_error("name_required", "This field is required."));
    }
    if !charset.is_match(name) {
        return Err(field_error(
            "name_charset",
            "Contains invalid characters (special characters not allowed).",
        ));
    }
    if name.contains("  ") {
        return Err(field_error("name_double_space", "Contains double spaces."));
    }
    if name.len() > 1 && name == name.to_uppercase() {
        return Err(field_error(
            "name_all_caps",
            "Cannot be all capital letters.",
        ));
    }
    if has_triple_repeat(name) {
        return Err(field_error(
            "name_triple_repeat",
            "Contains 3 consecutive identical letters.",
        ));
    }
    if !casing.is_match(name) {
        return Err(field_error(
            "name_casing",
            "Must start with a capital letter and be followed by lowercase letters.",
        ));
    }
    Ok(())
}

// Case-insensitive check for three identical characters in a row.
fn has_triple_repeat(value: &str) -> bool {
    let lowered: Vec<char> = value.to_lowercase().chars().collect();
    lowered.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}

/// Like [`person_name_validator`] but permits an empty value, for optional
/// name parts such as the middle initial.
pub fn optional_person_name_validator(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Ok(());
    }
    person_name_validator(name)
}

/// Validates the optional name extension (Jr., Sr., Roman numerals).
///
/// Recognized extension tokens are accepted outright; anything else is held
/// to a restricted character set.
pub fn extension_name_validator(extension: &str) -> Result<(), ValidationError> {
    const ALLOWED: [&str; 14] = [
        "i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x", "jr", "sr", "jr.", "sr.",
    ];

    if extension.is_empty() || ALLOWED.contains(&extension.to_lowercase().as_str()) {
        return Ok(());
    }

    static EXTENSION_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EXTENSION_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9.\s]*$").expect("Failed to compile extension regex")
    });
    if !regex.is_match(extension) {
        return Err(field_error(
            "extension_charset",
            "Extension name contains invalid characters.",
        ));
    }
    Ok(())
}

/// Validates an address component (barangay, city, province, country).
pub fn address_validator(address: &str) -> Result<(), ValidationError> {
    static ADDRESS_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = ADDRESS_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9\s.,-]*$").expect("Failed to compile address regex")
    });

    if address.is_empty() {
        return Err(field_error("address_required", "This field is required."));
    }
    if !regex.is_match(address) {
        return Err(field_error(
            "address_charset",
            "Contains invalid characters.",
        ));
    }
    Ok(())
}

/// Like [`address_validator`] but permits an empty value.
pub fn optional_address_validator(address: &str) -> Result<(), ValidationError> {
    if address.is_empty() {
        return Ok(());
    }
    address_validator(address)
}

/// Validates the zip code: digits only, 4 to 10 of them.
pub fn zip_code_validator(zip_code: &str) -> Result<(), ValidationError> {
    static ZIP_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = ZIP_REGEX
        .get_or_init(|| Regex::new(r"^[0-9]{4,10}$").expect("Failed to compile zip code regex"));

    if zip_code.is_empty() {
        return Err(field_error("zip_required", "Zip Code is required."));
    }
    if !regex.is_match(zip_code) {
        return Err(field_error(
            "zip_format",
            "Zip Code must contain only numbers (4-10 digits).",
        ));
    }
    Ok(())
}

/// Validates email address format.
pub fn email_validator(email: &str) -> Result<(), ValidationError> {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if email.is_empty() {
        return Err(field_error("email_required", "Email is required."));
    }
    if !regex.is_match(email) {
        return Err(field_error("email_format", "Invalid email format."));
    }
    Ok(())
}

/// Validates the username: letters, digits, and underscores only.
pub fn username_validator(username: &str) -> Result<(), ValidationError> {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if username.is_empty() {
        return Err(field_error("username_required", "Username is required."));
    }
    if !regex.is_match(username) {
        return Err(field_error(
            "username_charset",
            "Username can only contain letters, numbers, and underscores.",
        ));
    }
    Ok(())
}

/// Parses a birthdate in `YYYY-MM-DD` form.
pub fn parse_birthdate(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Computes age in whole years using calendar truncation: a person is `n`
/// years old from their `n`-th birthday onward, not a day earlier.
pub fn compute_age(birthdate: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        age -= 1;
    }
    age
}

/// Validates the birthdate field: parseable and at least [`MINIMUM_AGE`].
pub fn birthdate_validator(birthdate: &str) -> Result<(), ValidationError> {
    if birthdate.is_empty() {
        return Err(field_error("birthdate_required", "Birthdate is required."));
    }
    let Some(parsed) = parse_birthdate(birthdate) else {
        return Err(field_error("birthdate_format", "Invalid birthdate format."));
    };
    if compute_age(parsed, Utc::now().date_naive()) < MINIMUM_AGE {
        return Err(field_error(
            "birthdate_underage",
            "You must be at least 18 years old (legal age only).",
        ));
    }
    Ok(())
}

/// Character classes missing from a candidate password.
pub fn password_missing_classes(password: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        missing.push("at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        missing.push("at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        missing.push("at least one number");
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        missing.push("at least one special character");
    }
    missing
}

/// Validates password strength, naming every missing character class.
pub fn password_strength_validator(password: &str) -> Result<(), ValidationError> {
    let missing = password_missing_classes(password);
    if missing.is_empty() {
        return Ok(());
    }
    Err(field_error(
        "password_strength",
        format!("Password must contain {}.", missing.join(", ")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_number_validator() {
        assert!(id_number_validator("1234-5678").is_ok());
        assert!(id_number_validator("").is_err());
        assert!(id_number_validator("12345678").is_err());
        assert!(id_number_validator("123-45678").is_err());
        assert!(id_number_validator("abcd-efgh").is_err());
    }

    #[test]
    fn test_person_name_accepts_proper_names() {
        assert!(person_name_validator("Juan").is_ok());
        assert!(person_name_validator("Maria Clara").is_ok());
        assert!(person_name_validator("J").is_ok());
    }

    #[test]
    fn test_person_name_rejections() {
        assert!(person_name_validator("").is_err());
        assert!(person_name_validator("Juan2").is_err()); // digit in charset
        assert!(person_name_validator("Juan  Cruz").is_err()); // double space
        assert!(person_name_validator("JUAN").is_err()); // all caps
        assert!(person_name_validator("Jooonas").is_err()); // triple repeat
        assert!(person_name_validator("juan").is_err()); // lowercase start
        assert!(person_name_validator("JuAn").is_err()); // capital mid-word
    }

    #[test]
    fn test_triple_repeat_is_case_insensitive() {
        assert!(has_triple_repeat("aAa"));
        assert!(!has_triple_repeat("aba"));
    }

    #[test]
    fn test_extension_name_validator() {
        assert!(extension_name_validator("").is_ok());
        assert!(extension_name_validator("Jr.").is_ok());
        assert!(extension_name_validator("III").is_ok());
        assert!(extension_name_validator("ix").is_ok());
        assert!(extension_name_validator("2nd").is_ok()); // restricted charset, allowed
        assert!(extension_name_validator("Jr!").is_err());
    }

    #[test]
    fn test_address_validators() {
        assert!(address_validator("Purok 7, San Isidro").is_ok());
        assert!(address_validator("").is_err());
        assert!(address_validator("Blk 5 #10").is_err());
        assert!(optional_address_validator("").is_ok());
        assert!(optional_address_validator("Zone 2").is_ok());
    }

    #[test]
    fn test_zip_code_validator() {
        assert!(zip_code_validator("9000").is_ok());
        assert!(zip_code_validator("1234567890").is_ok());
        assert!(zip_code_validator("123").is_err());
        assert!(zip_code_validator("12345678901").is_err());
        assert!(zip_code_validator("90a0").is_err());
        assert!(zip_code_validator("").is_err());
    }

    #[test]
    fn test_email_validator() {
        assert!(email_validator("user@example.com").is_ok());
        assert!(email_validator("test.user+tag@domain.co.uk").is_ok());
        assert!(email_validator("").is_err());
        assert!(email_validator("invalid.email").is_err());
        assert!(email_validator("@domain.com").is_err());
    }

    #[test]
    fn test_username_validator() {
        assert!(username_validator("juan_cruz99").is_ok());
        assert!(username_validator("").is_err());
        assert!(username_validator("juan cruz").is_err());
        assert!(username_validator("juan-cruz").is_err());
    }

    #[test]
    fn test_compute_age_calendar_boundaries() {
        let birth = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        // Day before the 18th birthday.
        assert_eq!(
            compute_age(birth, NaiveDate::from_ymd_opt(2018, 6, 14).unwrap()),
            17
        );
        // Exactly the 18th birthday.
        assert_eq!(
            compute_age(birth, NaiveDate::from_ymd_opt(2018, 6, 15).unwrap()),
            18
        );
        assert_eq!(
            compute_age(birth, NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()),
            18
        );
    }

    #[test]
    fn test_birthdate_validator_format() {
        assert!(birthdate_validator("").is_err());
        assert!(birthdate_validator("15-06-2000").is_err());
        assert!(birthdate_validator("1990-01-31").is_ok());
        assert!(birthdate_validator("2024-01-01").is_err()); // underage
    }

    #[test]
    fn test_password_missing_classes() {
        assert!(password_missing_classes("Aa1!aaaa").is_empty());
        assert_eq!(
            password_missing_classes("aaaa"),
            vec![
                "at least one uppercase letter",
                "at least one number",
                "at least one special character"
            ]
        );
    }

    #[test]
    fn test_password_strength_message_names_missing_classes() {
        let error = password_strength_validator("alllower").unwrap_err();
        let message = error.message.unwrap().to_string();
        assert!(message.contains("uppercase"));
        assert!(message.contains("number"));
        assert!(message.contains("special character"));
        assert!(!message.contains("lowercase"));
    }
}
