// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session and token issuance.
//!
//! - Access tokens: HS256 JWTs carrying user id and role, fixed TTL.
//! - Refresh tokens: 32 random bytes, one active value per user, stored as
//!   a SHA-256 digest and rotated on every login and refresh.
//! - Verification and reset tokens: single-use random values with an
//!   absolute expiry, cleared when consumed.

use crate::config::{
    Config, MAX_ACCESS_TOKEN_TTL_SECS, MAX_REFRESH_TOKEN_TTL_DAYS, RESET_TOKEN_TTL_MINUTES,
    VERIFICATION_TOKEN_TTL_HOURS,
};
use crate::db::Db;
use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::models::{Role, User};
use crate::services::password::{hash_password, verify_dummy_password, verify_password};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Serialize;
use sha2::{Digest, Sha256};

const OPAQUE_TOKEN_BYTES: usize = 32;

pub const PLEASE_VERIFY_EMAIL: &str = "Please verify your email before logging in";
pub const ACCOUNT_DEACTIVATED: &str = "Account is deactivated";

/// Access + refresh token pair handed to the client.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

/// A freshly minted single-use token. Only `digest` is persisted.
#[derive(Debug, Clone)]
pub struct OneTimeToken {
    pub token: String,
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

/// Details needed to create an account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// SHA-256 digest (hex) of an opaque token.
pub fn digest_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Issues and validates every token type.
#[derive(Clone)]
pub struct SessionService {
    signing_key: Vec<u8>,
    access_ttl_secs: u64,
    refresh_ttl: Duration,
    rng: SystemRandom,
}

impl SessionService {
    /// Lifetimes outside the accepted ranges are clamped into them.
    pub fn new(config: &Config) -> Self {
        Self {
            signing_key: config.jwt_signing_key.clone(),
            access_ttl_secs: config.access_token_ttl_secs.clamp(1, MAX_ACCESS_TOKEN_TTL_SECS),
            refresh_ttl: Duration::days(
                config
                    .refresh_token_ttl_days
                    .clamp(1, MAX_REFRESH_TOKEN_TTL_DAYS),
            ),
            rng: SystemRandom::new(),
        }
    }

    /// Random URL-safe token.
    fn generate_token(&self) -> Result<String> {
        let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Refresh token lifetime, for the refresh cookie's max-age.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Mint a single-use token valid for `ttl`.
    pub fn issue_one_time_token(&self, ttl: Duration) -> Result<OneTimeToken> {
        let token = self.generate_token()?;
        Ok(OneTimeToken {
            digest: digest_token(&token),
            token,
            expires_at: Utc::now() + ttl,
        })
    }

    /// Mint a token pair and store the refresh digest on `user`,
    /// replacing any previous one. The caller persists the user.
    fn issue_pair(&self, user: &mut User) -> Result<TokenPair> {
        let access_token = create_jwt(&user.id, user.role, &self.signing_key, self.access_ttl_secs)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;
        let refresh_token = self.generate_token()?;

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.refresh_ttl)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Refresh token expiry overflows")))?;
        user.refresh_token_hash = Some(digest_token(&refresh_token));
        user.refresh_token_expires_at = Some(expires_at);
        user.updated_at = now;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.access_ttl_secs,
        })
    }

    // ─── Account Lifecycle ───────────────────────────────────────

    /// Create an unverified account and its email verification token.
    pub async fn register(&self, db: &Db, registration: Registration) -> Result<(User, OneTimeToken)> {
        if db.find_user_by_email(&registration.email).await?.is_some() {
            return Err(AppError::BadRequest(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&registration.password)?;
        let mut user = User::new(
            &registration.email,
            password_hash,
            registration.first_name,
            registration.last_name,
            registration.role,
        );

        let verification = self.issue_one_time_token(Duration::hours(VERIFICATION_TOKEN_TTL_HOURS))?;
        user.verification_token_hash = Some(verification.digest.clone());
        user.verification_token_expires_at = Some(verification.expires_at);

        db.put(&user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        Ok((user, verification))
    }

    /// Consume an email verification token.
    pub async fn verify_email(&self, db: &Db, token: &str) -> Result<User> {
        let mut user = db
            .find_user_by_verification_digest(&digest_token(token))
            .await?
            .filter(|u| is_unexpired(u.verification_token_expires_at))
            .ok_or_else(|| {
                AppError::BadRequest("Invalid or expired verification token".to_string())
            })?;

        user.is_verified = true;
        user.verification_token_hash = None;
        user.verification_token_expires_at = None;
        user.updated_at = Utc::now();
        db.put(&user).await?;

        tracing::info!(user_id = %user.id, "Email verified");
        Ok(user)
    }

    // ─── Sessions ────────────────────────────────────────────────

    /// Check credentials and account state, then start a session.
    pub async fn login(&self, db: &Db, email: &str, password: &str) -> Result<(User, TokenPair)> {
        let Some(mut user) = db.find_user_by_email(email).await? else {
            verify_dummy_password(password);
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_verified {
            return Err(AppError::Forbidden(PLEASE_VERIFY_EMAIL.to_string()));
        }

        if !user.is_active {
            return Err(AppError::Forbidden(ACCOUNT_DEACTIVATED.to_string()));
        }

        let tokens = self.issue_pair(&mut user)?;
        user.last_login_at = Some(Utc::now());
        db.put(&user).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok((user, tokens))
    }

    /// Exchange a refresh token for a new pair, invalidating the old one.
    pub async fn refresh(&self, db: &Db, refresh_token: &str) -> Result<(User, TokenPair)> {
        let mut user = db
            .find_user_by_refresh_digest(&digest_token(refresh_token))
            .await?
            .filter(|u| is_unexpired(u.refresh_token_expires_at))
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::Forbidden(ACCOUNT_DEACTIVATED.to_string()));
        }

        let tokens = self.issue_pair(&mut user)?;
        db.put(&user).await?;

        tracing::debug!(user_id = %user.id, "Refresh token rotated");
        Ok((user, tokens))
    }

    /// Drop the user's refresh token. Issued access tokens remain valid
    /// until they expire.
    pub async fn logout(&self, db: &Db, user_id: &str) -> Result<()> {
        let Some(mut user) = db.get::<User>(user_id).await? else {
            return Ok(());
        };

        user.clear_refresh_token();
        user.updated_at = Utc::now();
        db.put(&user).await?;

        tracing::info!(user_id, "User logged out");
        Ok(())
    }

    // ─── Passwords ───────────────────────────────────────────────

    /// Mint a reset token if the account exists.
    ///
    /// Returns `None` for unknown emails; callers must not reveal the difference.
    pub async fn start_password_reset(&self, db: &Db, email: &str) -> Result<Option<(User, OneTimeToken)>> {
        let Some(mut user) = db.find_user_by_email(email).await? else {
            return Ok(None);
        };

        let reset = self.issue_one_time_token(Duration::minutes(RESET_TOKEN_TTL_MINUTES))?;
        user.reset_token_hash = Some(reset.digest.clone());
        user.reset_token_expires_at = Some(reset.expires_at);
        user.updated_at = Utc::now();
        db.put(&user).await?;

        tracing::info!(user_id = %user.id, "Password reset requested");
        Ok(Some((user, reset)))
    }

    /// Consume a reset token and set a new password. Ends the current session.
    pub async fn reset_password(&self, db: &Db, token: &str, new_password: &str) -> Result<User> {
        let mut user = db
            .find_user_by_reset_digest(&digest_token(token))
            .await?
            .filter(|u| is_unexpired(u.reset_token_expires_at))
            .ok_or_else(|| AppError::BadRequest("Invalid or expired reset token".to_string()))?;

        user.password_hash = hash_password(new_password)?;
        user.reset_token_hash = None;
        user.reset_token_expires_at = None;
        user.clear_refresh_token();
        user.updated_at = Utc::now();
        db.put(&user).await?;

        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(user)
    }

    /// Change password for a signed-in user. Ends the current session.
    pub async fn change_password(
        &self,
        db: &Db,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<User> {
        let mut user = db
            .get::<User>(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !verify_password(current_password, &user.password_hash)? {
            return Err(AppError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        user.password_hash = hash_password(new_password)?;
        user.clear_refresh_token();
        user.updated_at = Utc::now();
        db.put(&user).await?;

        tracing::info!(user_id, "Password changed");
        Ok(user)
    }
}

fn is_unexpired(expires_at: Option<DateTime<Utc>>) -> bool {
    expires_at.is_some_and(|at| at > Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SessionService {
        SessionService::new(&Config::test_default())
    }

    fn registration(email: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: "password123".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Runner".to_string(),
            role: Role::Athlete,
        }
    }

    async fn verified_user(db: &Db, sessions: &SessionService, email: &str) -> User {
        let (_, verification) = sessions.register(db, registration(email)).await.unwrap();
        sessions.verify_email(db, &verification.token).await.unwrap()
    }

    #[test]
    fn test_digest_is_stable_hex() {
        let d = digest_token("abc");
        assert_eq!(d.len(), 64);
        assert_eq!(d, digest_token("abc"));
        assert_ne!(d, digest_token("abd"));
    }

    #[test]
    fn test_one_time_tokens_are_unique() {
        let s = service();
        let a = s.issue_one_time_token(Duration::hours(1)).unwrap();
        let b = s.issue_one_time_token(Duration::hours(1)).unwrap();
        assert_ne!(a.token, b.token);
        assert_eq!(a.digest, digest_token(&a.token));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Db::in_memory();
        let s = service();
        s.register(&db, registration("dup@example.com")).await.unwrap();
        let err = s
            .register(&db, registration("DUP@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_unverified_login_denied_without_tokens() {
        let db = Db::in_memory();
        let s = service();
        let (user, _) = s.register(&db, registration("new@example.com")).await.unwrap();

        let err = s
            .login(&db, "new@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == PLEASE_VERIFY_EMAIL));

        let stored: User = db.get(&user.id).await.unwrap().unwrap();
        assert!(stored.refresh_token_hash.is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let db = Db::in_memory();
        let s = service();
        verified_user(&db, &s, "pw@example.com").await;

        let err = s.login(&db, "pw@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        let err = s.login(&db, "missing@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_out_of_range_ttls_are_clamped() {
        let db = Db::in_memory();

        let huge = SessionService::new(&Config {
            refresh_token_ttl_days: 1_000_000_000,
            access_token_ttl_secs: u64::MAX,
            ..Config::test_default()
        });
        verified_user(&db, &huge, "huge@example.com").await;
        let (user, pair) = huge.login(&db, "huge@example.com", "password123").await.unwrap();
        assert_eq!(pair.expires_in, MAX_ACCESS_TOKEN_TTL_SECS);
        assert!(
            user.refresh_token_expires_at.unwrap()
                <= Utc::now() + Duration::days(MAX_REFRESH_TOKEN_TTL_DAYS)
        );

        let negative = SessionService::new(&Config {
            refresh_token_ttl_days: -1,
            ..Config::test_default()
        });
        verified_user(&db, &negative, "neg@example.com").await;
        let (_, pair) = negative.login(&db, "neg@example.com", "password123").await.unwrap();
        assert!(negative.refresh(&db, &pair.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_inactive_login_denied() {
        let db = Db::in_memory();
        let s = service();
        let mut user = verified_user(&db, &s, "off@example.com").await;
        user.is_active = false;
        db.put(&user).await.unwrap();

        let err = s
            .login(&db, "off@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == ACCOUNT_DEACTIVATED));
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_old_token_dies() {
        let db = Db::in_memory();
        let s = service();
        verified_user(&db, &s, "rot@example.com").await;

        let (_, first) = s.login(&db, "rot@example.com", "password123").await.unwrap();
        let (_, second) = s.refresh(&db, &first.refresh_token).await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);

        let err = s.refresh(&db, &first.refresh_token).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
        assert!(s.refresh(&db, &second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_second_login_invalidates_first_session() {
        let db = Db::in_memory();
        let s = service();
        verified_user(&db, &s, "single@example.com").await;

        let (_, first) = s.login(&db, "single@example.com", "password123").await.unwrap();
        let (_, _second) = s.login(&db, "single@example.com", "password123").await.unwrap();
        assert!(s.refresh(&db, &first.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_refresh_token_rejected() {
        let db = Db::in_memory();
        let s = service();
        verified_user(&db, &s, "exp@example.com").await;
        let (mut user, pair) = s.login(&db, "exp@example.com", "password123").await.unwrap();

        user.refresh_token_expires_at = Some(Utc::now() - Duration::seconds(1));
        db.put(&user).await.unwrap();

        assert!(s.refresh(&db, &pair.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_logout_clears_refresh_token() {
        let db = Db::in_memory();
        let s = service();
        verified_user(&db, &s, "out@example.com").await;
        let (user, pair) = s.login(&db, "out@example.com", "password123").await.unwrap();

        s.logout(&db, &user.id).await.unwrap();
        assert!(s.refresh(&db, &pair.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_verification_token_single_use() {
        let db = Db::in_memory();
        let s = service();
        let (_, verification) = s.register(&db, registration("once@example.com")).await.unwrap();

        assert!(s.verify_email(&db, &verification.token).await.is_ok());
        assert!(s.verify_email(&db, &verification.token).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_verification_token_rejected() {
        let db = Db::in_memory();
        let s = service();
        let (mut user, verification) =
            s.register(&db, registration("late@example.com")).await.unwrap();
        user.verification_token_expires_at = Some(Utc::now() - Duration::minutes(1));
        db.put(&user).await.unwrap();

        assert!(s.verify_email(&db, &verification.token).await.is_err());
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let db = Db::in_memory();
        let s = service();
        verified_user(&db, &s, "reset@example.com").await;
        let (_, session) = s.login(&db, "reset@example.com", "password123").await.unwrap();

        assert!(s
            .start_password_reset(&db, "unknown@example.com")
            .await
            .unwrap()
            .is_none());

        let (_, reset) = s
            .start_password_reset(&db, "reset@example.com")
            .await
            .unwrap()
            .unwrap();
        s.reset_password(&db, &reset.token, "new-password-1")
            .await
            .unwrap();

        // Token consumed, old session ended, new password works
        assert!(s.reset_password(&db, &reset.token, "again-123").await.is_err());
        assert!(s.refresh(&db, &session.refresh_token).await.is_err());
        assert!(s.login(&db, "reset@example.com", "new-password-1").await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let db = Db::in_memory();
        let s = service();
        let user = verified_user(&db, &s, "change@example.com").await;

        let err = s
            .change_password(&db, &user.id, "wrong", "new-password-1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        s.change_password(&db, &user.id, "password123", "new-password-1")
            .await
            .unwrap();
        assert!(s.login(&db, "change@example.com", "new-password-1").await.is_ok());
    }
}
