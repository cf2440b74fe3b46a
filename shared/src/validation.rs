//! Input validation functions
//!
//! Field validators return `Result<(), String>` with a user-facing message.
//! Request-level validation collects those messages into [`FieldErrors`],
//! keyed by the wire field name.

use serde::Serialize;
use std::collections::BTreeMap;
use validator::ValidateEmail;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const BLANK_MESSAGE: &str = "This field may not be blank.";

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const FULL_NAME_MAX_LENGTH: usize = 255;

/// Per-field validation messages, serialized as `{"field": ["msg", ...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field error map
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn extend(&mut self, field: &str, messages: impl IntoIterator<Item = String>) {
        for message in messages {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when no errors were recorded
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Check that a field is present and not blank, recording the error otherwise
pub fn require<'a>(errors: &mut FieldErrors, field: &str, value: Option<&'a str>) -> Option<&'a str> {
    match value {
        None => {
            errors.add(field, REQUIRED_MESSAGE);
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, BLANK_MESSAGE);
            None
        }
        Some(v) => Some(v),
    }
}

/// Run a field validator, recording its message on failure
pub fn check<'a, F>(errors: &mut FieldErrors, field: &str, value: &'a str, validator: F) -> Option<&'a str>
where
    F: Fn(&str) -> Result<(), String>,
{
    match validator(value) {
        Ok(()) => Some(value),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

/// Validate a maximum length in characters
pub fn validate_max_length(value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            max
        ));
    }
    Ok(())
}

/// Validate username format: letters, digits and `@ . + - _`
pub fn validate_username(username: &str) -> Result<(), String> {
    validate_max_length(username, USERNAME_MAX_LENGTH)?;
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !username.chars().all(allowed) {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }
    Ok(())
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    validate_max_length(email, EMAIL_MAX_LENGTH)?;
    if !email.validate_email() {
        return Err("Enter a valid email address.".to_string());
    }
    Ok(())
}

/// Validate the optional profile display name
pub fn validate_full_name(full_name: &str) -> Result<(), String> {
    validate_max_length(full_name, FULL_NAME_MAX_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("johndoe")]
    #[case("john.doe+test@example")]
    #[case("jöhn_dœ-1")]
    fn test_valid_usernames(#[case] username: &str) {
        assert!(validate_username(username).is_ok());
    }

    #[rstest]
    #[case("john doe")]
    #[case("john/doe")]
    #[case("john$")]
    fn test_invalid_usernames(#[case] username: &str) {
        assert!(validate_username(username).is_err());
    }

    #[test]
    fn test_username_too_long() {
        let username = "a".repeat(USERNAME_MAX_LENGTH + 1);
        let err = validate_username(&username).unwrap_err();
        assert!(err.contains("150"));
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("john@example.com").is_ok());
        assert_eq!(
            validate_email("not-an-email").unwrap_err(),
            "Enter a valid email address."
        );
    }

    #[test]
    fn test_full_name_length() {
        assert!(validate_full_name("John Doe").is_ok());
        assert!(validate_full_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_require_records_missing_and_blank() {
        let mut errors = FieldErrors::new();
        assert!(require(&mut errors, "username", None).is_none());
        assert!(require(&mut errors, "email", Some("   ")).is_none());
        assert_eq!(require(&mut errors, "password", Some("pw")), Some("pw"));

        assert_eq!(errors.get("username").unwrap(), [REQUIRED_MESSAGE]);
        assert_eq!(errors.get("email").unwrap(), [BLANK_MESSAGE]);
        assert!(!errors.contains("password"));
    }

    #[test]
    fn test_check_passes_value_through() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            check(&mut errors, "email", "john@example.com", validate_email),
            Some("john@example.com")
        );
        assert_eq!(check(&mut errors, "email", "nope", validate_email), None);
        assert_eq!(errors.get("email").unwrap(), ["Enter a valid email address."]);
    }

    #[test]
    fn test_field_errors_serialize_as_map_of_lists() {
        let mut errors = FieldErrors::single("username", "taken");
        errors.add("username", "too long");
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value, serde_json::json!({"username": ["taken", "too long"]}));
        assert!(errors.into_result().is_err());
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
