//! Input validation and sanitization.
//!
//! All checks are pure; failures come back as a field-keyed error map so
//! clients can surface them next to the offending input.

use regex::Regex;
use std::collections::BTreeMap;
use std::str::FromStr;

use super::types::Role;

/// Field name -> human readable problem. Ordered map so response bodies
/// are stable.
pub type FieldErrors = BTreeMap<&'static str, String>;

pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 100;

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Syntactic email check plus the RFC length cap.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH
        && Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// 8..=128 characters with at least one lowercase, one uppercase and one
/// digit.
#[must_use]
pub fn valid_password(password: &str) -> bool {
    let length = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return false;
    }

    password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Trim and HTML-escape free-text identity fields before they are stored
/// or echoed back.
#[must_use]
pub fn sanitize(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.trim().chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Presence and format checks for a login attempt.
///
/// # Errors
///
/// Returns the field-keyed problems when email or password are missing or
/// the email is malformed.
pub fn validate_login(email: Option<&str>, password: Option<&str>) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    match email {
        None => {
            errors.insert("email", "Email is required".to_string());
        }
        Some(email) if !valid_email(&normalize_email(email)) => {
            errors.insert("email", "Please provide a valid email address".to_string());
        }
        Some(_) => {}
    }

    if password.map_or(true, str::is_empty) {
        errors.insert("password", "Password is required".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Full field validation for a registration request. All problems are
/// collected, not just the first.
///
/// # Errors
///
/// Returns the field-keyed problems on any failed check.
pub fn validate_registration(
    name: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
    role: &str,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    match name.map(str::trim) {
        None => {
            errors.insert(
                "name",
                format!("Name must be at least {MIN_NAME_LENGTH} characters long"),
            );
        }
        Some(name) if name.chars().count() < MIN_NAME_LENGTH => {
            errors.insert(
                "name",
                format!("Name must be at least {MIN_NAME_LENGTH} characters long"),
            );
        }
        Some(name) if name.chars().count() > MAX_NAME_LENGTH => {
            errors.insert(
                "name",
                format!("Name must be less than {MAX_NAME_LENGTH} characters"),
            );
        }
        Some(_) => {}
    }

    match email {
        None => {
            errors.insert("email", "Email is required".to_string());
        }
        Some(email) if !valid_email(&normalize_email(email)) => {
            errors.insert("email", "Please provide a valid email address".to_string());
        }
        Some(_) => {}
    }

    match password {
        None => {
            errors.insert("password", "Password is required".to_string());
        }
        Some(password) if !valid_password(password) => {
            errors.insert(
                "password",
                "Password must be at least 8 characters with uppercase, lowercase, and number"
                    .to_string(),
            );
        }
        Some(_) => {}
    }

    if Role::from_str(role).is_err() {
        errors.insert("role", "Invalid role specified".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("a b@example.com"));
    }

    #[test]
    fn valid_email_enforces_length_cap() {
        let local = "a".repeat(243);
        assert!(valid_email(&format!("{local}@example.com"))); // 254 chars
        let local = "a".repeat(244);
        assert!(!valid_email(&format!("{local}@example.com"))); // 255 chars
    }

    #[test]
    fn password_policy_vectors() {
        assert!(valid_password("Passw0rd"));
        assert!(!valid_password("password")); // no uppercase, no digit
        assert!(!valid_password("P1a!")); // too short
        assert!(!valid_password("PASSW0RD")); // no lowercase
        assert!(!valid_password(&format!("Aa1{}", "x".repeat(126)))); // 129 chars
        assert!(valid_password(&format!("Aa1{}", "x".repeat(125)))); // 128 chars
    }

    #[test]
    fn sanitize_trims_and_escapes() {
        assert_eq!(
            sanitize("  <b>O'Neill & Sons</b>/  "),
            "&lt;b&gt;O&#x27;Neill &amp; Sons&lt;&#x2F;b&gt;&#x2F;"
        );
        assert_eq!(sanitize("plain name"), "plain name");
    }

    #[test]
    fn login_validation_keys_errors_by_field() {
        let errors = validate_login(None, None).unwrap_err();
        assert_eq!(
            errors.get("email").map(String::as_str),
            Some("Email is required")
        );
        assert_eq!(
            errors.get("password").map(String::as_str),
            Some("Password is required")
        );

        let errors = validate_login(Some("nope"), Some("Passw0rd")).unwrap_err();
        assert!(errors.contains_key("email"));
        assert!(!errors.contains_key("password"));

        assert!(validate_login(Some("a@example.com"), Some("Passw0rd")).is_ok());
    }

    #[test]
    fn registration_validation_collects_all_problems() {
        let errors =
            validate_registration(Some(" x "), Some("bad"), Some("short"), "boss").unwrap_err();
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("password"));
        assert!(errors.contains_key("role"));

        assert!(validate_registration(
            Some("Alex Ferguson"),
            Some("alex@example.com"),
            Some("Passw0rd"),
            "moderator"
        )
        .is_ok());
    }

    #[test]
    fn registration_name_bounds() {
        let long = "x".repeat(101);
        assert!(validate_registration(Some(&long), Some("a@b.co"), Some("Passw0rd"), "user")
            .is_err());
        let max = "x".repeat(100);
        assert!(
            validate_registration(Some(&max), Some("a@b.co"), Some("Passw0rd"), "user").is_ok()
        );
    }
}
