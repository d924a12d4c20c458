// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.

use crate::error::AppError;
use crate::models::{Role, User};
use crate::services::authz::Actor;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cookie that may carry the access token instead of the header.
pub const ACCESS_TOKEN_COOKIE: &str = "athlete_hub_token";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Role at the time the token was issued
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Middleware that requires a valid access token for an existing, active user.
///
/// On success the request carries the caller as an [`Actor`] extension,
/// which handlers take as an explicit `Extension<Actor>` argument.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Header first, then cookie
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
        _ => match jar.get(ACCESS_TOKEN_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => return Err(AppError::Unauthorized),
        },
    };

    let claims = decode_jwt(&token, &state.config.jwt_signing_key)?;

    // The account may have been removed or deactivated since the token was issued.
    let user = state
        .db
        .get::<User>(&claims.sub)
        .await?
        .ok_or(AppError::InvalidToken)?;

    if !user.is_active {
        tracing::warn!(user_id = %user.id, "Rejected token for deactivated account");
        return Err(AppError::Forbidden("Account is deactivated".to_string()));
    }

    let actor = Actor::new(user.id, user.role);
    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}

/// Create an access token for a user.
pub fn create_jwt(
    user_id: &str,
    role: Role,
    signing_key: &[u8],
    ttl_secs: u64,
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        iat: now,
        exp: now
            .checked_add(usize::try_from(ttl_secs)?)
            .ok_or_else(|| anyhow::anyhow!("Token expiry overflows"))?,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Validate signature and expiry of an access token.
pub fn decode_jwt(token: &str, signing_key: &[u8]) -> Result<Claims, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            AppError::InvalidToken
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_jwt_key_32_bytes_minimum!!";

    #[test]
    fn test_jwt_round_trip_carries_role() {
        let token = create_jwt("user-1", Role::Physiotherapist, KEY, 3600).unwrap();
        let claims = decode_jwt(&token, KEY).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, Role::Physiotherapist);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_jwt_wrong_key_rejected() {
        let token = create_jwt("user-1", Role::Athlete, KEY, 3600).unwrap();
        let err = decode_jwt(&token, b"another_key_that_is_32_bytes_long").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn test_expired_jwt_rejected() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let claims = Claims {
            sub: "user-1".into(),
            role: Role::Athlete,
            iat: 1_000_000,
            exp: 1_000_060,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(KEY),
        )
        .unwrap();

        assert!(decode_jwt(&token, KEY).is_err());
    }
}
