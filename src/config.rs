//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup (optionally from a `.env` file) and
//! shared read-only through `AppState`.

use std::env;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

/// Default access token lifetime (1 hour).
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 60 * 60;
/// Longest accepted access token lifetime (1 day).
pub const MAX_ACCESS_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
/// Default refresh token lifetime.
pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 30;
/// Longest accepted refresh token lifetime (10 years).
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 3650;
/// Email verification links stay valid for one day.
pub const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;
/// Password reset links stay valid for one hour.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;
/// Maximum accepted upload size (10 MB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which document store implementation backs the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Firestore (production).
    Firestore,
    /// In-process store (tests and local development).
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL (CORS origin and link target in emails)
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Document store implementation
    pub store_backend: StoreBackend,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Directory that receives uploaded files
    pub upload_dir: PathBuf,
    /// Optional webhook that delivers transactional email
    pub email_webhook_url: Option<String>,
    /// Access token lifetime in seconds
    pub access_token_ttl_secs: u64,
    /// Refresh token lifetime in days
    pub refresh_token_ttl_days: i64,

    // --- Secrets ---
    /// JWT signing key for access tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Optional PostgreSQL connection string
    pub database_url: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            upload_dir: env::temp_dir().join("athlete-hub-uploads"),
            email_webhook_url: None,
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_days: DEFAULT_REFRESH_TOKEN_TTL_DAYS,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            database_url: None,
        }
    }
}

impl Config {
    /// Config for tests: in-memory store, no relational store, no email webhook.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?;
        if jwt_signing_key.len() < 32 {
            return Err(ConfigError::Invalid("JWT_SIGNING_KEY"));
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend: env::var("STORE_BACKEND")
                .unwrap_or_else(|_| "firestore".to_string())
                .parse()?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            email_webhook_url: optional_var("EMAIL_WEBHOOK_URL"),
            access_token_ttl_secs: parse_bounded(
                "ACCESS_TOKEN_TTL_SECS",
                optional_var("ACCESS_TOKEN_TTL_SECS"),
                DEFAULT_ACCESS_TOKEN_TTL_SECS,
                1..=MAX_ACCESS_TOKEN_TTL_SECS,
            )?,
            refresh_token_ttl_days: parse_bounded(
                "REFRESH_TOKEN_TTL_DAYS",
                optional_var("REFRESH_TOKEN_TTL_DAYS"),
                DEFAULT_REFRESH_TOKEN_TTL_DAYS,
                1..=MAX_REFRESH_TOKEN_TTL_DAYS,
            )?,
            jwt_signing_key: jwt_signing_key.into_bytes(),
            database_url: optional_var("DATABASE_URL"),
        })
    }
}

/// Read an env var, treating empty values as unset.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an optional numeric setting, falling back to `default` when unset.
fn parse_bounded<T>(
    name: &'static str,
    raw: Option<String>,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: T = raw.parse().map_err(|_| ConfigError::Invalid(name))?;
    if !range.contains(&value) {
        return Err(ConfigError::Invalid(name));
    }
    Ok(value)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
