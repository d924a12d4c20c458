//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Role carried by every user and embedded in access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Role {
    Athlete,
    Coach,
    Admin,
    Organization,
    Scout,
    Physiotherapist,
    Nutritionist,
    FinancialAdvisor,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Athlete,
        Role::Coach,
        Role::Admin,
        Role::Organization,
        Role::Scout,
        Role::Physiotherapist,
        Role::Nutritionist,
        Role::FinancialAdvisor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Athlete => "athlete",
            Role::Coach => "coach",
            Role::Admin => "admin",
            Role::Organization => "organization",
            Role::Scout => "scout",
            Role::Physiotherapist => "physiotherapist",
            Role::Nutritionist => "nutritionist",
            Role::FinancialAdvisor => "financial_advisor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record stored in the `users` collection.
///
/// Token fields hold SHA-256 digests, never the values handed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// UUID (also used as document ID)
    pub id: String,
    /// Lower-cased, unique
    pub email: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Digest of the single active refresh token
    #[serde(default)]
    pub refresh_token_hash: Option<String>,
    #[serde(default)]
    pub refresh_token_expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub verification_token_hash: Option<String>,
    #[serde(default)]
    pub verification_token_expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub reset_token_hash: Option<String>,
    #[serde(default)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Build a fresh, unverified and active user.
    pub fn new(
        email: &str,
        password_hash: String,
        first_name: String,
        last_name: String,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: normalize_email(email),
            password_hash,
            first_name,
            last_name,
            role,
            is_verified: false,
            is_active: true,
            refresh_token_hash: None,
            refresh_token_expires_at: None,
            verification_token_hash: None,
            verification_token_expires_at: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Drop the stored refresh token (logout, password change).
    pub fn clear_refresh_token(&mut self) {
        self.refresh_token_hash = None;
        self.refresh_token_expires_at = None;
    }
}

/// Emails are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Public view of a user; never includes credentials or tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_verified: bool,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            is_verified: user.is_verified,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}
