//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BOLAO_JWT_SECRET` - Bearer token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `BOLAO_DATABASE_URL` - `SQLite` connection string (fallback: `DATABASE_URL`,
//!   default: `sqlite://bolao.db`)
//! - `BOLAO_HOST` - Bind address (default: 127.0.0.1)
//! - `BOLAO_PORT` - Listen port (default: 5000)
//! - `BOLAO_JWT_ISSUER` - Token issuer (default: your-api)
//! - `BOLAO_JWT_AUDIENCE` - Token audience (default: your-api-users)
//! - `BOLAO_TOKEN_TTL_HOURS` - Bearer token lifetime, 1 to 8760 (default: 24)
//! - `BOLAO_RESET_TOKEN_TTL_MINUTES` - Password reset token lifetime, 1 to 10080
//!   (default: 1440)
//! - `BOLAO_ARGON2_MEMORY_KIB` / `BOLAO_ARGON2_ITERATIONS` / `BOLAO_ARGON2_PARALLELISM`
//! - `BOLAO_ADMIN_EMAIL` / `BOLAO_ADMIN_NAME` / `BOLAO_ADMIN_PASSWORD` - Seed account
//! - `BOLAO_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::Duration;
use secrecy::SecretString;
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const MAX_TOKEN_TTL_HOURS: i64 = 8_760;
const MAX_RESET_TOKEN_TTL_MINUTES: i64 = 10_080;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token settings
    pub token: TokenConfig,
    /// Password reset token lifetime
    pub reset_token_ttl: Duration,
    /// Argon2 cost parameters
    pub password_hashing: PasswordHashConfig,
    /// Account to ensure at startup, if configured
    pub admin_seed: Option<AdminSeedConfig>,
    /// Emit JSON logs instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Bearer token signing and validation settings.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC-SHA256 signing secret
    pub secret: SecretString,
    /// `iss` claim written and required
    pub issuer: String,
    /// `aud` claim written and required
    pub audience: String,
    /// Lifetime of an issued token
    pub ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Administrator account ensured at startup.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct AdminSeedConfig {
    pub email: String,
    pub name: String,
    pub password: SecretString,
}

impl std::fmt::Debug for AdminSeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeedConfig")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("BOLAO_DATABASE_URL");
        let host = parse_env_or_default::<IpAddr>("BOLAO_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("BOLAO_PORT", "5000")?;
        let token = TokenConfig::from_env()?;
        let reset_token_ttl = bounded_lifetime(
            "BOLAO_RESET_TOKEN_TTL_MINUTES",
            parse_env_or_default("BOLAO_RESET_TOKEN_TTL_MINUTES", "1440")?,
            MAX_RESET_TOKEN_TTL_MINUTES,
            Duration::try_minutes,
        )?;
        let password_hashing = PasswordHashConfig::from_env()?;
        let admin_seed = AdminSeedConfig::from_env();
        let log_json = get_optional_env("BOLAO_LOG_JSON").is_some();
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            token,
            reset_token_ttl,
            password_hashing,
            admin_seed,
            log_json,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl TokenConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = get_signing_secret("BOLAO_JWT_SECRET")?;

        let ttl = bounded_lifetime(
            "BOLAO_TOKEN_TTL_HOURS",
            parse_env_or_default("BOLAO_TOKEN_TTL_HOURS", "24")?,
            MAX_TOKEN_TTL_HOURS,
            Duration::try_hours,
        )?;

        Ok(Self {
            secret,
            issuer: get_env_or_default("BOLAO_JWT_ISSUER", "your-api"),
            audience: get_env_or_default("BOLAO_JWT_AUDIENCE", "your-api-users"),
            ttl,
        })
    }
}

impl PasswordHashConfig {
    /// Load Argon2 cost parameters, falling back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a value doesn't parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            memory_kib: parse_env_or_default(
                "BOLAO_ARGON2_MEMORY_KIB",
                &defaults.memory_kib.to_string(),
            )?,
            iterations: parse_env_or_default(
                "BOLAO_ARGON2_ITERATIONS",
                &defaults.iterations.to_string(),
            )?,
            parallelism: parse_env_or_default(
                "BOLAO_ARGON2_PARALLELISM",
                &defaults.parallelism.to_string(),
            )?,
        })
    }
}

impl AdminSeedConfig {
    fn from_env() -> Option<Self> {
        let email = get_optional_env("BOLAO_ADMIN_EMAIL")?;
        let password = get_optional_env("BOLAO_ADMIN_PASSWORD")?;
        Some(Self {
            email,
            name: get_env_or_default("BOLAO_ADMIN_NAME", "Administrator"),
            password: SecretString::from(password),
        })
    }
}

/// Database URL alone, for tools that never sign tokens.
///
/// Loads `.env` like [`ApiConfig::from_env`] but requires no secret.
#[must_use]
pub fn database_url_from_env() -> SecretString {
    let _ = dotenvy::dotenv();
    get_database_url("BOLAO_DATABASE_URL")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`, then a local file.
fn get_database_url(primary_key: &str) -> SecretString {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_or_else(
            |_| SecretString::from("sqlite://bolao.db"),
            SecretString::from,
        )
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Turn a count of `unit`s into a lifetime, accepting only `1..=max`.
fn bounded_lifetime(
    key: &str,
    count: i64,
    max: i64,
    unit: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    if !(1..=max).contains(&count) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 1 and {max} (got {count})"),
        ));
    }
    unit(count).ok_or_else(|| {
        ConfigError::InvalidEnvVar(key.to_string(), format!("{count} is out of range"))
    })
}

/// Bits of Shannon entropy per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0_u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    counts
        .values()
        .map(|&n| f64::from(n) / f64::from(total))
        .map(|p| -p * p.log2())
        .sum()
}

/// Reject signing secrets that are short, look like a placeholder or are
/// too repetitive to be random.
fn check_signing_secret(key: &str, secret: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| Err(ConfigError::InsecureSecret(key.to_string(), reason));

    let length = secret.chars().count();
    if length < MIN_JWT_SECRET_LENGTH {
        return insecure(format!(
            "must be at least {MIN_JWT_SECRET_LENGTH} characters (got {length})"
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return insecure(format!("appears to be a placeholder (contains '{pattern}')"));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return insecure(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}); generate it randomly"
        ));
    }

    Ok(())
}

/// Load a signing secret and check it.
fn get_signing_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    check_signing_secret(key, &value)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_literal_development_key_is_rejected() {
        let result = check_signing_secret(
            "BOLAO_JWT_SECRET",
            "your-super-secret-jwt-key-that-should-be-at-least-32-characters-long",
        );
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_repetitive_secret_is_rejected() {
        let result = check_signing_secret("TEST_VAR", &"ab".repeat(20));
        let Err(ConfigError::InsecureSecret(_, reason)) = result else {
            panic!("expected rejection");
        };
        assert!(reason.contains("entropy"));
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let Err(ConfigError::InsecureSecret(_, reason)) =
            check_signing_secret("TEST_VAR", "aB3$xY9!mK2@")
        else {
            panic!("expected rejection");
        };
        assert!(reason.contains("at least 32"));
    }

    #[test]
    fn test_random_secret_is_accepted() {
        assert!(check_signing_secret("TEST_VAR", "kF8#vQ2!mZ7@rW4$tY9^bN3&hJ6*pL1x").is_ok());
    }

    #[test]
    fn test_lifetime_bounds() {
        let hours = |count| {
            bounded_lifetime(
                "BOLAO_TOKEN_TTL_HOURS",
                count,
                MAX_TOKEN_TTL_HOURS,
                Duration::try_hours,
            )
        };
        assert_eq!(hours(24).unwrap(), Duration::hours(24));
        assert_eq!(hours(MAX_TOKEN_TTL_HOURS).unwrap(), Duration::hours(8_760));
        for bad in [0, -1, MAX_TOKEN_TTL_HOURS + 1, i64::MAX, i64::MIN] {
            let Err(ConfigError::InvalidEnvVar(key, _)) = hours(bad) else {
                panic!("{bad} should be rejected");
            };
            assert_eq!(key, "BOLAO_TOKEN_TTL_HOURS");
        }

        let minutes = |count| {
            bounded_lifetime(
                "BOLAO_RESET_TOKEN_TTL_MINUTES",
                count,
                MAX_RESET_TOKEN_TTL_MINUTES,
                Duration::try_minutes,
            )
        };
        assert_eq!(minutes(1440).unwrap(), Duration::days(1));
        assert!(minutes(0).is_err());
        assert!(minutes(-60).is_err());
        assert!(minutes(i64::MAX).is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            token: TokenConfig {
                secret: SecretString::from("kF8#vQ2!mZ7@rW4$tY9^bN3&hJ6*pL1x"),
                issuer: "your-api".to_string(),
                audience: "your-api-users".to_string(),
                ttl: Duration::hours(24),
            },
            reset_token_ttl: Duration::minutes(1440),
            password_hashing: PasswordHashConfig::default(),
            admin_seed: None,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_token_config_debug_redacts_secret() {
        let config = TokenConfig {
            secret: SecretString::from("super_secret_signing_key_value"),
            issuer: "your-api".to_string(),
            audience: "your-api-users".to_string(),
            ttl: Duration::hours(24),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("your-api-users"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_signing_key_value"));
    }

    #[test]
    fn test_admin_seed_debug_redacts_password() {
        let seed = AdminSeedConfig {
            email: "admin@bolao.dev".to_string(),
            name: "Administrator".to_string(),
            password: SecretString::from("Admin@123!"),
        };
        let debug_output = format!("{seed:?}");
        assert!(debug_output.contains("admin@bolao.dev"));
        assert!(!debug_output.contains("Admin@123!"));
    }
}
