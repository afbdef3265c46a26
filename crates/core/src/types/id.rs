//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Ids are opaque
//! UUIDs assigned at creation and never reused.

use thiserror::Error;

/// Error returned when a string is not a well-formed identifier.
#[derive(Debug, Clone, Error)]
#[error("invalid identifier: {0}")]
pub struct IdParseError(String);

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `uuid::Uuid` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Construction methods: `generate()`, `from_uuid()`, `parse()`
/// - `Display` and `FromStr` using the hyphenated form
///
/// # Example
///
/// ```rust
/// # use bolao_core::define_id;
/// define_id!(UserId);
/// define_id!(TokenId);
///
/// let user_id = UserId::generate();
/// let token_id = TokenId::generate();
///
/// // These are different types, so this won't compile:
/// // let _: UserId = token_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Generate a fresh random ID.
            #[must_use]
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }

            /// Parse an ID from its string form.
            ///
            /// # Errors
            ///
            /// Returns `IdParseError` if the input is not a UUID.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::types::id::IdParseError> {
                ::uuid::Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| $crate::types::id::IdParseError::new(s))
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdParseError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

impl IdParseError {
    /// Create a parse error for the given input.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self(input.to_owned())
    }
}

define_id!(UserId);
define_id!(ResetTokenId);
