//! Display name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`DisplayName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayNameError {
    /// The name is empty or only whitespace.
    #[error("name is required")]
    Empty,
    /// The name is longer than allowed.
    #[error("name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },
}

/// Free-text name shown for an account.
///
/// Trimmed, required, at most 100 characters (counted as `char`s so accented
/// names are not penalized for their UTF-8 width).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Maximum length of a display name, in characters.
    pub const MAX_LENGTH: usize = 100;

    /// Parse a `DisplayName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`DisplayName::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, DisplayNameError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(DisplayNameError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `DisplayName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
