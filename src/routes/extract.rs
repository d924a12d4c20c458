// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request extractors that reject with the JSON error envelope.

use crate::error::AppError;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that has passed its `validator` rules.
///
/// Malformed JSON and failed validation both answer 400 with the usual
/// `{status: "fail", message}` body instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use axum::{routing::post, Router};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Body1 {
        #[validate(length(min = 3))]
        name: String,
    }

    async fn handler(ValidJson(body): ValidJson<Body1>) -> impl IntoResponse {
        body.name
    }

    async fn send(json: &str) -> StatusCode {
        Router::new()
            .route("/", post(handler))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        assert_eq!(send(r#"{"name":"Ada"}"#).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_and_malformed_are_bad_request() {
        assert_eq!(send(r#"{"name":"A"}"#).await, StatusCode::BAD_REQUEST);
        assert_eq!(send(r#"{"name":"#).await, StatusCode::BAD_REQUEST);
        assert_eq!(send(r#"{}"#).await, StatusCode::BAD_REQUEST);
    }
}
