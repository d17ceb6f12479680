// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request body validation.
//!
//! Credential format rules:
//!
//! - username: 3 to 20 characters from `A-Z a-z 0-9 _ . -`
//! - password: 12 to 100 characters, starting with an uppercase letter and
//!   containing a lowercase letter, a digit and a character that is neither a
//!   letter nor a digit

use crate::error::ValidationErrors;

/// Username length bounds, inclusive.
pub const USERNAME_LEN: (usize, usize) = (3, 20);

/// Password length bounds, inclusive.
pub const PASSWORD_LEN: (usize, usize) = (12, 100);

/// A request body that can check its own fields.
pub trait Validate {
    /// Collects every field error into `errors`.
    fn validate(&self, errors: &mut ValidationErrors);
}

/// Checks that a required field is present and non-empty.
pub fn check_not_empty(field: &str, value: &str, errors: &mut ValidationErrors) -> bool {
    if value.is_empty() {
        errors.add(field, format!("{} should not be empty", field));
        false
    } else {
        true
    }
}

/// Checks the username format.
pub fn check_username(field: &str, value: &str, errors: &mut ValidationErrors) {
    if !check_not_empty(field, value, errors) {
        return;
    }

    let len = value.chars().count();
    if len < USERNAME_LEN.0 {
        errors.add(
            field,
            format!("{} must be longer than or equal to {} characters", field, USERNAME_LEN.0),
        );
    }
    if len > USERNAME_LEN.1 {
        errors.add(
            field,
            format!("{} must be shorter than or equal to {} characters", field, USERNAME_LEN.1),
        );
    }

    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-');
    if !value.chars().all(allowed) {
        errors.add(field, "Use only letters, numbers, \".\", \"-\" or \"_\"");
    }
}

/// Checks the password strength rules.
pub fn check_password(field: &str, value: &str, errors: &mut ValidationErrors) {
    if !check_not_empty(field, value, errors) {
        return;
    }

    let len = value.chars().count();
    if len < PASSWORD_LEN.0 {
        errors.add(
            field,
            format!("{} must be longer than or equal to {} characters", field, PASSWORD_LEN.0),
        );
    }
    if len > PASSWORD_LEN.1 {
        errors.add(
            field,
            format!("{} must be shorter than or equal to {} characters", field, PASSWORD_LEN.1),
        );
    }

    let starts_upper = value.chars().next().is_some_and(|c| c.is_ascii_uppercase());
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_special = value.chars().any(|c| !c.is_ascii_alphanumeric());
    let single_line = !value.contains(['\n', '\r']);

    if !(starts_upper && has_lower && has_digit && has_special && single_line) {
        errors.add(
            field,
            "Password must begin with an uppercase letter and include at least one lowercase letter, number and special characters",
        );
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn username_errors(value: &str) -> usize {
        let mut errors = ValidationErrors::new();
        check_username("username", value, &mut errors);
        errors.fields.len()
    }

    fn password_errors(value: &str) -> usize {
        let mut errors = ValidationErrors::new();
        check_password("password", value, &mut errors);
        errors.fields.len()
    }

    #[test]
    fn test_usernames() {
        assert_eq!(username_errors("alice"), 0);
        assert_eq!(username_errors("brian_s"), 0);
        assert_eq!(username_errors("a.b-c_1"), 0);
        assert_eq!(username_errors("abc"), 0);
        assert_eq!(username_errors(&"a".repeat(20)), 0);

        assert_eq!(username_errors(""), 1);
        assert_eq!(username_errors("ab"), 1);
        assert_eq!(username_errors(&"a".repeat(21)), 1);
        assert_eq!(username_errors("alice smith"), 1);
        assert_eq!(username_errors("al!ce"), 1);
        assert_eq!(username_errors("a!"), 2);
    }

    #[test]
    fn test_passwords() {
        assert_eq!(password_errors("Str0ng!Pass1"), 0);
        assert_eq!(password_errors("P@ssw0rd1234"), 0);
        assert_eq!(password_errors("Abcdefghij1_"), 0);

        assert_eq!(password_errors(""), 1);
        assert_eq!(password_errors("Str0ng!Pas"), 1);
        assert_eq!(password_errors("str0ng!pass1"), 1);
        assert_eq!(password_errors("Strong!Passw"), 1);
        assert_eq!(password_errors("Str0ngPasswd"), 1);
        assert_eq!(password_errors("STR0NG!PASS1"), 1);
        assert_eq!(password_errors(&format!("Str0ng!{}", "a".repeat(94))), 1);
    }
}
