// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod athletes;
pub mod auth;
pub mod career;
pub mod extract;
pub mod financial;
pub mod injury;
pub mod items;
pub mod performance;

use crate::config::MAX_UPLOAD_BYTES;
use crate::db::StoreStatus;
use crate::middleware::security::UPLOADS_PREFIX;
use crate::middleware::{add_security_headers, require_auth};
use crate::AppState;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, Method, StatusCode};
use axum::response::IntoResponse;
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Multipart framing overhead allowed on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

// ─── Response Envelope ───────────────────────────────────────

/// Success envelope: `{ "status": "success", "data": ..., "message": ... }`.
///
/// Errors use the same shape with `"fail"` or `"error"`; see
/// [`crate::error::AppError`].
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 200 with data.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        status: "success",
        data: Some(data),
        message: None,
    })
}

/// 201 with data.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(data))
}

/// 201 when `was_created`, otherwise 200.
pub fn created_or_ok<T: Serialize>(data: T, was_created: bool) -> (StatusCode, Json<ApiResponse<T>>) {
    if was_created {
        created(data)
    } else {
        (StatusCode::OK, ok(data))
    }
}

/// 201 with data and a message.
pub fn created_with_message<T: Serialize>(
    data: T,
    message: impl Into<String>,
) -> (StatusCode, Json<ApiResponse<T>>) {
    let (status, Json(mut body)) = created(data);
    body.message = Some(message.into());
    (status, Json(body))
}

/// 200 with only a message.
pub fn ok_message(message: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        status: "success",
        data: None,
        message: Some(message.into()),
    })
}

// ─── Health ──────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub document_store: String,
    pub relational_store: String,
    pub build_id: String,
}

fn status_label(status: StoreStatus) -> &'static str {
    match status {
        StoreStatus::Connected => "connected",
        StoreStatus::Disconnected => "disconnected",
        StoreStatus::Disabled => "disabled",
    }
}

/// Health check; 503 when the document store is unreachable.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (documents, relational) = tokio::join!(state.db.status(), state.relational.status());
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();

    let healthy = documents == StoreStatus::Connected;
    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        document_store: status_label(documents).to_string(),
        relational_store: status_label(relational).to_string(),
        build_id,
    };

    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(body))
}

// ─── Router ──────────────────────────────────────────────────

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .merge(auth::public_routes());

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .nest("/api/athletes", athletes::routes())
        .nest("/api/performance", performance::routes())
        .nest("/api/injury", injury::routes())
        .nest("/api/career", career::routes())
        .nest("/api/financial", financial::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service(UPLOADS_PREFIX, ServeDir::new(&state.config.upload_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES))
        .layer(middleware::from_fn(add_security_headers))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
