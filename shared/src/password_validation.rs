//! Password strength validation
//!
//! Mirrors the usual web-framework defaults: similarity to the account's own
//! attributes, a minimum length, a rejection list of common passwords, and a
//! ban on all-digit passwords. Every failing rule is reported, not just the
//! first.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Quick-ratio at or above which a password counts as too similar
pub const MAX_SIMILARITY: f64 = 0.7;

static COMMON_PASSWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    include_str!("common_passwords.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
});

/// Upper bound on the similarity of two strings, ignoring character order:
/// twice the size of the common character multiset over the total length.
fn quick_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_default() += 1;
    }
    let matches = a
        .chars()
        .filter(|c| match available.get_mut(c) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        })
        .count();

    2.0 * matches as f64 / total as f64
}

/// A very long password cannot be too similar to a much shorter value
fn exceeds_length_ratio(password_len: usize, value_len: usize) -> bool {
    password_len >= 10 * value_len && (value_len as f64) < MAX_SIMILARITY / 2.0 * password_len as f64
}

/// Reject passwords too similar to one of the account's attributes
///
/// `attributes` pairs a human-readable attribute name with its value. Each
/// value is compared whole and split on non-word characters, so
/// `john@example.com` also checks `john` and `example`. Only the first
/// matching attribute is reported.
pub fn validate_not_similar(password: &str, attributes: &[(&str, &str)]) -> Result<(), String> {
    let password = password.to_lowercase();
    let password_len = password.chars().count();

    for (name, value) in attributes {
        if value.is_empty() {
            continue;
        }
        let value = value.to_lowercase();
        let parts = value
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .chain(std::iter::once(value.as_str()));

        for part in parts {
            if exceeds_length_ratio(password_len, part.chars().count()) {
                continue;
            }
            if quick_ratio(&password, part) >= MAX_SIMILARITY {
                return Err(format!("The password is too similar to the {}.", name));
            }
        }
    }
    Ok(())
}

/// Reject passwords shorter than [`PASSWORD_MIN_LENGTH`] characters
pub fn validate_minimum_length(password: &str) -> Result<(), String> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "This password is too short. It must contain at least {} characters.",
            PASSWORD_MIN_LENGTH
        ));
    }
    Ok(())
}

/// Reject passwords on the common-password list (case-insensitive)
pub fn validate_not_common(password: &str) -> Result<(), String> {
    let normalized = password.trim().to_lowercase();
    if COMMON_PASSWORDS.contains(normalized.as_str()) {
        return Err("This password is too common.".to_string());
    }
    Ok(())
}

/// Reject passwords made only of digits
pub fn validate_not_numeric(password: &str) -> Result<(), String> {
    if !password.is_empty() && password.chars().all(|c| c.is_numeric()) {
        return Err("This password is entirely numeric.".to_string());
    }
    Ok(())
}

/// Run every password rule and collect the failure messages
pub fn validate_password_strength(password: &str, attributes: &[(&str, &str)]) -> Vec<String> {
    [
        validate_not_similar(password, attributes),
        validate_minimum_length(password),
        validate_not_common(password),
        validate_not_numeric(password),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}
