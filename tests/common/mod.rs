// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use athlete_hub::config::Config;
use athlete_hub::db::{Db, FirestoreDb, RelationalStore};
use athlete_hub::middleware::auth::create_jwt;
use athlete_hub::models::{Athlete, Role, User};
use athlete_hub::routes::create_router;
use athlete_hub::services::password::hash_password;
use athlete_hub::AppState;
use axum::body::Body;
use axum::http::{header, Request, Response};
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Firestore-backed store pointed at the emulator.
#[allow(dead_code)]
pub async fn test_firestore() -> Db {
    Db::Firestore(
        FirestoreDb::new("test-project")
            .await
            .expect("Failed to connect to Firestore emulator"),
    )
}

#[allow(dead_code)]
pub const PASSWORD: &str = "correct horse battery";

/// Test app over a fresh in-memory store with uploads in a private temp dir.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config {
        upload_dir: std::env::temp_dir().join(format!("athlete-hub-test-{}", uuid::Uuid::new_v4())),
        ..Config::test_default()
    };
    let state = Arc::new(AppState::new(
        config,
        Db::in_memory(),
        RelationalStore::disabled(),
    ));
    (create_router(state.clone()), state)
}

/// Store a verified, active user with the given role.
#[allow(dead_code)]
pub async fn seed_user(state: &AppState, email: &str, role: Role) -> User {
    let mut user = User::new(
        email,
        hash_password(PASSWORD).unwrap(),
        "Test".to_string(),
        role.to_string(),
        role,
    );
    user.is_verified = true;
    state.db.put(&user).await.unwrap();
    user
}

/// Store an empty athlete profile owned by `user`.
#[allow(dead_code)]
pub async fn seed_athlete(state: &AppState, user: &User) -> Athlete {
    let athlete = Athlete::new(&user.id);
    state.db.put(&athlete).await.unwrap();
    athlete
}

/// Access token for `user`.
#[allow(dead_code)]
pub fn token_for(state: &AppState, user: &User) -> String {
    create_jwt(
        &user.id,
        user.role,
        &state.config.jwt_signing_key,
        state.config.access_token_ttl_secs,
    )
    .unwrap()
}

/// Send one request through a clone of the router.
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
