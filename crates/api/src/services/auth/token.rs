//! Bearer token issuance and validation.
//!
//! Tokens are HS256 JWTs carrying the account id, email and display name.
//! Issuer, audience and expiry are checked on every validation with no
//! leeway; there is no server-side revocation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use bolao_core::UserId;

use crate::config::TokenConfig;
use crate::models::user::{CurrentUser, User};

/// Errors from issuing or validating a bearer token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed.
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Token is past its expiry.
    #[error("token expired")]
    Expired,

    /// Signature, issuer, audience or structure is wrong.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// Subject claim is not an account id.
    #[error("invalid subject claim")]
    InvalidSubject,
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account id
    pub sub: String,
    pub email: String,
    pub name: String,
    /// Unique token identifier
    pub jti: String,
    pub iss: String,
    pub aud: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl TokenClaims {
    /// Identity of the account the token was issued to.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidSubject` if `sub` is not a valid id.
    pub fn current_user(&self) -> Result<CurrentUser, TokenError> {
        let id = UserId::parse(&self.sub).map_err(|_| TokenError::InvalidSubject)?;
        Ok(CurrentUser {
            id,
            email: self.email.clone(),
            name: self.name.clone(),
        })
    }
}

/// Signs and verifies bearer tokens with one process-wide secret.
///
/// Built once at start-up and shared by reference.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer from configuration.
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: config.ttl,
        }
    }

    /// Issue a token for `user`, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token for `user` as if the current time were `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: user.id.to_string(),
            email: user.email.to_string(),
            name: user.name.to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Verify signature, issuer, audience and expiry.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for an expired token and
    /// `TokenError::Invalid` for any other failure.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use bolao_core::{DisplayName, Email};

    use super::*;
    use crate::models::user::PasswordVerifier;

    fn config(secret: &str, issuer: &str) -> TokenConfig {
        TokenConfig {
            secret: SecretString::from(secret),
            issuer: issuer.to_string(),
            audience: "your-api-users".to_string(),
            ttl: Duration::hours(24),
        }
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&config("kF8#vQ2!mZ7@rW4$tY9^bN3&hJ6*pL1x", "your-api"))
    }

    fn user() -> User {
        User {
            id: UserId::generate(),
            email: Email::parse("ana@example.com").unwrap(),
            name: DisplayName::parse("Ana Silva").unwrap(),
            email_confirmed: true,
            created_at: Utc::now(),
            password: PasswordVerifier::new(String::new()),
        }
    }

    #[test]
    fn test_issue_then_validate_resolves_subject() {
        let issuer = issuer();
        let user = user();
        let token = issuer.issue(&user).unwrap();

        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.iss, "your-api");
        assert_eq!(claims.aud, "your-api-users");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);

        let current = claims.current_user().unwrap();
        assert_eq!(current.id, user.id);
        assert_eq!(current.email, "ana@example.com");
        assert_eq!(current.name, "Ana Silva");
    }

    #[test]
    fn test_each_token_has_fresh_jti() {
        let issuer = issuer();
        let user = user();
        let a = issuer.validate(&issuer.issue(&user).unwrap()).unwrap();
        let b = issuer.validate(&issuer.issue(&user).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let token = issuer
            .issue_at(&user(), Utc::now() - Duration::hours(25))
            .unwrap();
        assert!(matches!(issuer.validate(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let issuer = issuer();
        let token = issuer.issue(&user()).unwrap();
        let (head, signature) = token.rsplit_once('.').unwrap();
        let flipped = if signature.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{head}.{flipped}{}", &signature[1..]);
        assert!(matches!(issuer.validate(&tampered), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issuer().issue(&user()).unwrap();
        let other = TokenIssuer::new(&config("Zq9@Lm4#Rt7!Wx2$Kp5^Hv8&Nc3*Bj6y", "your-api"));
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let secret = "kF8#vQ2!mZ7@rW4$tY9^bN3&hJ6*pL1x";
        let token = TokenIssuer::new(&config(secret, "someone-else"))
            .issue(&user())
            .unwrap();
        assert!(issuer().validate(&token).is_err());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let mut other = config("kF8#vQ2!mZ7@rW4$tY9^bN3&hJ6*pL1x", "your-api");
        other.audience = "another-api-users".to_string();
        let token = TokenIssuer::new(&other).issue(&user()).unwrap();

        assert!(matches!(
            issuer().validate(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(issuer().validate("not-a-token").is_err());
        assert!(issuer().validate("").is_err());
    }
}
