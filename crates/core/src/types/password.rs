//! Password policy.
//!
//! Raw passwords never get a type of their own here - they are only checked
//! against the policy and then handed to the hasher.

use thiserror::Error;

/// A single rule a candidate password failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordViolation {
    /// Shorter than the minimum length.
    #[error("Passwords must be at least {min} characters.")]
    TooShort {
        /// Minimum length in characters.
        min: usize,
    },
    /// No ASCII digit.
    #[error("Passwords must have at least one digit ('0'-'9').")]
    MissingDigit,
    /// No lowercase letter.
    #[error("Passwords must have at least one lowercase ('a'-'z').")]
    MissingLowercase,
    /// No uppercase letter.
    #[error("Passwords must have at least one uppercase ('A'-'Z').")]
    MissingUppercase,
    /// Only letters and digits.
    #[error("Passwords must have at least one non alphanumeric character.")]
    MissingNonAlphanumeric,
}

/// Requirements every account password must meet.
///
/// The default matches the service's production settings: eight characters
/// with at least one digit, lowercase, uppercase and symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct PasswordPolicy {
    /// Minimum length in characters.
    pub min_length: usize,
    /// Require an ASCII digit.
    pub require_digit: bool,
    /// Require a lowercase letter.
    pub require_lowercase: bool,
    /// Require an uppercase letter.
    pub require_uppercase: bool,
    /// Require a character that is neither a letter nor a digit.
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

impl PasswordPolicy {
    /// Check a password against every rule.
    ///
    /// # Errors
    ///
    /// Returns every violated rule, in a stable order, so callers can report
    /// all reasons at once.
    pub fn validate(&self, password: &str) -> Result<(), Vec<PasswordViolation>> {
        let mut violations = Vec::new();

        if password.chars().count() < self.min_length {
            violations.push(PasswordViolation::TooShort {
                min: self.min_length,
            });
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push(PasswordViolation::MissingDigit);
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            violations.push(PasswordViolation::MissingLowercase);
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            violations.push(PasswordViolation::MissingUppercase);
        }
        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            violations.push(PasswordViolation::MissingNonAlphanumeric);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password_passes() {
        assert_eq!(PasswordPolicy::default().validate("Admin@123!"), Ok(()));
    }

    #[test]
    fn test_reports_every_violation() {
        let violations = PasswordPolicy::default().validate("abc").unwrap_err();
        assert_eq!(
            violations,
            vec![
                PasswordViolation::TooShort { min: 8 },
                PasswordViolation::MissingDigit,
                PasswordViolation::MissingUppercase,
                PasswordViolation::MissingNonAlphanumeric,
            ]
        );
    }

    #[test]
    fn test_empty_password_fails_all_rules() {
        let violations = PasswordPolicy::default().validate("").unwrap_err();
        assert_eq!(violations.len(), 5);
    }

    #[test]
    fn test_relaxed_policy() {
        let policy = PasswordPolicy {
            min_length: 4,
            require_digit: false,
            require_lowercase: false,
            require_uppercase: false,
            require_non_alphanumeric: false,
        };
        assert_eq!(policy.validate("abcd"), Ok(()));
    }

    #[test]
    fn test_violation_messages() {
        assert_eq!(
            PasswordViolation::TooShort { min: 8 }.to_string(),
            "Passwords must be at least 8 characters."
        );
    }
}
