// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account and session routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use super::extract::ValidJson;
use super::{created_with_message, ok, ok_message, ApiResponse};
use crate::config::{Config, MAX_ACCESS_TOKEN_TTL_SECS, MAX_REFRESH_TOKEN_TTL_DAYS};
use crate::error::{AppError, Result};
use crate::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::models::{Role, User, UserProfile};
use crate::services::authz::Actor;
use crate::services::session::{Registration, TokenPair};
use crate::AppState;

/// HttpOnly cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "athlete_hub_refresh";

const REFRESH_COOKIE_PATH: &str = "/api/auth";

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh-token", post(refresh_token))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/auth/verify-email/{token}", get(verify_email))
}

/// Routes that need a signed-in user.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/me", get(get_me).put(update_me))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/change-password", put(change_password))
}

// ─── Cookies ─────────────────────────────────────────────────

fn secure_cookies(config: &Config) -> bool {
    config.frontend_url.starts_with("https://")
}

fn session_cookies(jar: CookieJar, config: &Config, tokens: &TokenPair) -> CookieJar {
    let secure = secure_cookies(config);

    let access = Cookie::build((ACCESS_TOKEN_COOKIE, tokens.access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(
            tokens.expires_in.min(MAX_ACCESS_TOKEN_TTL_SECS) as i64,
        ));

    let refresh = Cookie::build((REFRESH_TOKEN_COOKIE, tokens.refresh_token.clone()))
        .path(REFRESH_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::days(
            config
                .refresh_token_ttl_days
                .clamp(1, MAX_REFRESH_TOKEN_TTL_DAYS),
        ));

    jar.add(access).add(refresh)
}

/// Always emits expired cookies, even when the request carried none
/// (Bearer clients). They must repeat the path they were set with.
fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    let expired = |name: &'static str, path: &'static str| {
        Cookie::build((name, ""))
            .path(path)
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::ZERO)
    };
    jar.add(expired(ACCESS_TOKEN_COOKIE, "/"))
        .add(expired(REFRESH_TOKEN_COOKIE, REFRESH_COOKIE_PATH))
}

// ─── Registration & Verification ─────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    /// Defaults to athlete
    pub role: Option<Role>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserEnvelope {
    pub user: UserProfile,
}

async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserEnvelope>>)> {
    let role = body.role.unwrap_or(Role::Athlete);
    if role == Role::Admin {
        return Err(AppError::BadRequest(
            "Cannot self-register as admin".to_string(),
        ));
    }

    let (user, verification) = state
        .sessions
        .register(
            &state.db,
            Registration {
                email: body.email,
                password: body.password,
                first_name: body.first_name.trim().to_string(),
                last_name: body.last_name.trim().to_string(),
                role,
            },
        )
        .await?;

    state
        .email
        .send_verification(&user.email, &user.first_name, &verification.token)
        .await;

    Ok(created_with_message(
        UserEnvelope {
            user: UserProfile::from(&user),
        },
        "Registration successful. Please check your email to verify your account.",
    ))
}

async fn verify_email(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state.sessions.verify_email(&state.db, &token).await?;
    Ok(ok_message("Email verified successfully. You can now log in."))
}

// ─── Sessions ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub expires_in: u64,
}

impl SessionResponse {
    fn new(user: &User, tokens: TokenPair) -> Self {
        Self {
            user: UserProfile::from(user),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type.to_string(),
            expires_in: tokens.expires_in,
        }
    }
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidJson(body): ValidJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<SessionResponse>>)> {
    let (user, tokens) = state
        .sessions
        .login(&state.db, &body.email, &body.password)
        .await?;

    let jar = session_cookies(jar, &state.config, &tokens);
    Ok((jar, ok(SessionResponse::new(&user, tokens))))
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Rotate the refresh token. Accepts the token in the body or the cookie.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, Json<ApiResponse<SessionResponse>>)> {
    let presented = body
        .and_then(|Json(b)| b.refresh_token)
        .or_else(|| jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string()))
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let (user, tokens) = state.sessions.refresh(&state.db, &presented).await?;

    let jar = session_cookies(jar, &state.config, &tokens);
    Ok((jar, ok(SessionResponse::new(&user, tokens))))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<()>>)> {
    state.sessions.logout(&state.db, &actor.id).await?;
    Ok((clear_session_cookies(jar), ok_message("Logged out successfully")))
}

// ─── Password Management ─────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

/// Same answer whether or not the account exists.
async fn forgot_password(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<()>>> {
    if let Some((user, reset)) = state
        .sessions
        .start_password_reset(&state.db, &body.email)
        .await?
    {
        state
            .email
            .send_password_reset(&user.email, &user.first_name, &reset.token)
            .await;
    }

    Ok(ok_message(
        "If an account exists for that email, a password reset link has been sent.",
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub password: String,
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>> {
    state
        .sessions
        .reset_password(&state.db, &body.token, &body.password)
        .await?;
    Ok(ok_message("Password has been reset. Please log in."))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    jar: CookieJar,
    ValidJson(body): ValidJson<ChangePasswordRequest>,
) -> Result<(CookieJar, Json<ApiResponse<()>>)> {
    state
        .sessions
        .change_password(
            &state.db,
            &actor.id,
            &body.current_password,
            &body.new_password,
        )
        .await?;
    Ok((
        clear_session_cookies(jar),
        ok_message("Password changed. Please log in again."),
    ))
}

// ─── Current User ────────────────────────────────────────────

async fn load_user(state: &AppState, actor: &Actor) -> Result<User> {
    state
        .db
        .get::<User>(&actor.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<UserEnvelope>>> {
    let user = load_user(&state, &actor).await?;
    Ok(ok(UserEnvelope {
        user: UserProfile::from(&user),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ValidJson(body): ValidJson<UpdateMeRequest>,
) -> Result<Json<ApiResponse<UserEnvelope>>> {
    let mut user = load_user(&state, &actor).await?;

    if let Some(first_name) = body.first_name {
        user.first_name = first_name.trim().to_string();
    }
    if let Some(last_name) = body.last_name {
        user.last_name = last_name.trim().to_string();
    }
    user.updated_at = Utc::now();
    state.db.put(&user).await?;

    tracing::info!(user_id = %user.id, "Profile updated");
    Ok(ok(UserEnvelope {
        user: UserProfile::from(&user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            token_type: "Bearer",
            expires_in: 3600,
        }
    }

    #[test]
    fn test_session_cookie_attributes_localhost() {
        let config = Config::test_default();
        let jar = session_cookies(CookieJar::new(), &config, &pair());

        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(access.value(), "access");
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_ne!(access.secure(), Some(true));

        let refresh = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
        assert_eq!(refresh.path(), Some(REFRESH_COOKIE_PATH));
        assert_eq!(refresh.max_age(), Some(time::Duration::days(30)));
    }

    #[test]
    fn test_session_cookies_secure_for_https_frontend() {
        let config = Config {
            frontend_url: "https://hub.example.com".into(),
            ..Config::test_default()
        };
        let jar = session_cookies(CookieJar::new(), &config, &pair());
        assert_eq!(jar.get(ACCESS_TOKEN_COOKIE).unwrap().secure(), Some(true));
        assert_eq!(jar.get(REFRESH_TOKEN_COOKIE).unwrap().secure(), Some(true));
    }

    #[test]
    fn test_clear_session_cookies_without_incoming_cookies() {
        let jar = clear_session_cookies(CookieJar::new());

        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(access.value(), "");
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.max_age(), Some(time::Duration::ZERO));

        let refresh = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
        assert_eq!(refresh.value(), "");
        assert_eq!(refresh.path(), Some(REFRESH_COOKIE_PATH));
        assert_eq!(refresh.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn test_refresh_cookie_age_stays_in_range() {
        let config = Config {
            refresh_token_ttl_days: 1_000_000_000,
            ..Config::test_default()
        };
        let jar = session_cookies(CookieJar::new(), &config, &pair());
        assert_eq!(
            jar.get(REFRESH_TOKEN_COOKIE).unwrap().max_age(),
            Some(time::Duration::days(MAX_REFRESH_TOKEN_TTL_DAYS))
        );
    }
}
