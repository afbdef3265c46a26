//! Login email address.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why a string is not an acceptable login email.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must contain exactly one @ symbol")]
    AtSymbol,
    #[error("email needs text before and after the @ symbol")]
    MissingPart,
}

/// The login identity of an account.
///
/// Input is trimmed. The address keeps the casing it was registered with;
/// [`Email::normalized`] is the key two addresses are compared on, so
/// `Ana@Example.com` and `ana@example.COM` are the same account.
///
/// ```
/// use bolao_core::Email;
///
/// let email = Email::parse(" Ana.Silva@Example.com ").unwrap();
/// assert_eq!(email.as_str(), "Ana.Silva@Example.com");
/// assert_eq!(email.normalized(), "ana.silva@example.com");
///
/// assert!(Email::parse("ana@").is_err());
/// assert!(Email::parse("a@b@c").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Validate and trim a login email.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] naming the first rule the input breaks.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let address = input.trim();
        if address.is_empty() {
            return Err(EmailError::Empty);
        }
        if address.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        match address.split_once('@') {
            Some((_, domain)) if domain.contains('@') => Err(EmailError::AtSymbol),
            Some((local, domain)) if local.is_empty() || domain.is_empty() => {
                Err(EmailError::MissingPart)
            }
            Some(_) => Ok(Self(address.to_owned())),
            None => Err(EmailError::AtSymbol),
        }
    }

    /// Case-insensitive comparison key.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
