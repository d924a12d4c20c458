// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security headers middleware.

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Path prefix of statically served uploads.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// Add security headers to all responses.
///
/// API responses carry tokens and personal data and are never cached.
/// Uploaded files may be embedded by the frontend from another origin.
pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let is_upload = req.uri().path().starts_with(UPLOADS_PREFIX);
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'; sandbox"),
    );
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));

    if is_upload {
        headers.insert(
            "Cross-Origin-Resource-Policy",
            HeaderValue::from_static("cross-origin"),
        );
    } else {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::{routing::get, Router};
    use tower::ServiceExt; // for oneshot

    fn app() -> Router {
        Router::new()
            .route("/api/ping", get(|| async { "pong" }))
            .route("/uploads/{file}", get(|| async { "bytes" }))
            .layer(axum::middleware::from_fn(add_security_headers))
    }

    #[tokio::test]
    async fn test_api_security_headers() {
        let response = app()
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
        assert_eq!(
            headers.get("Content-Security-Policy").unwrap(),
            "default-src 'none'; frame-ancestors 'none'; sandbox"
        );
        assert_eq!(headers.get("Referrer-Policy").unwrap(), "no-referrer");
        assert_eq!(headers.get("Cache-Control").unwrap(), "no-store");
        assert!(headers.get("Cross-Origin-Resource-Policy").is_none());
    }

    #[tokio::test]
    async fn test_upload_headers_allow_cross_origin_embedding() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/uploads/photo.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get("Cross-Origin-Resource-Policy").unwrap(),
            "cross-origin"
        );
        assert!(headers.get("Cache-Control").is_none());
        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    }
}
