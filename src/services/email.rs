// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Outbound account email.
//!
//! Messages are POSTed as JSON to `EMAIL_WEBHOOK_URL` when configured and
//! logged otherwise. Delivery failures are logged, never surfaced to the
//! client, so a flaky mail relay cannot block registration.

use crate::config::Config;
use crate::error::AppError;
use serde::Serialize;

/// One outbound message.
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Sends account emails through the configured webhook.
#[derive(Clone)]
pub struct EmailService {
    http: reqwest::Client,
    webhook_url: Option<String>,
    frontend_url: String,
}

impl EmailService {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url: config.email_webhook_url.clone(),
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Link the frontend uses to confirm an email address.
    pub fn verification_link(&self, token: &str) -> String {
        format!(
            "{}/verify-email/{}",
            self.frontend_url,
            urlencoding::encode(token)
        )
    }

    /// Link the frontend uses to pick a new password.
    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.frontend_url,
            urlencoding::encode(token)
        )
    }

    pub async fn send_verification(&self, to: &str, first_name: &str, token: &str) {
        let message = EmailMessage {
            to: to.to_string(),
            subject: "Verify your Athlete Hub account".to_string(),
            body: format!(
                "Hi {},\n\nConfirm your email address by opening:\n{}\n\nThe link expires in 24 hours.",
                first_name,
                self.verification_link(token)
            ),
        };
        self.deliver(message).await;
    }

    pub async fn send_password_reset(&self, to: &str, first_name: &str, token: &str) {
        let message = EmailMessage {
            to: to.to_string(),
            subject: "Reset your Athlete Hub password".to_string(),
            body: format!(
                "Hi {},\n\nReset your password by opening:\n{}\n\nThe link expires in 1 hour. \
                 If you did not ask for this, ignore this email.",
                first_name,
                self.reset_link(token)
            ),
        };
        self.deliver(message).await;
    }

    async fn deliver(&self, message: EmailMessage) {
        let Some(url) = &self.webhook_url else {
            tracing::info!(
                to = %message.to,
                subject = %message.subject,
                body = %message.body,
                "Email webhook not configured, logging message"
            );
            return;
        };

        if let Err(e) = self.post(url, &message).await {
            tracing::error!(error = %e, to = %message.to, "Email delivery failed");
        } else {
            tracing::debug!(to = %message.to, subject = %message.subject, "Email handed to webhook");
        }
    }

    async fn post(&self, url: &str, message: &EmailMessage) -> Result<(), AppError> {
        let response = self
            .http
            .post(url)
            .json(message)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Email webhook request failed: {}", e)))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Internal(anyhow::anyhow!(
            "Email webhook returned HTTP {}: {}",
            status,
            body
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_are_encoded_and_rooted_at_frontend() {
        let config = Config {
            frontend_url: "https://hub.example.com/".to_string(),
            ..Config::test_default()
        };
        let email = EmailService::new(&config);

        assert_eq!(
            email.verification_link("a b"),
            "https://hub.example.com/verify-email/a%20b"
        );
        assert_eq!(
            email.reset_link("tok-_1"),
            "https://hub.example.com/reset-password?token=tok-_1"
        );
    }

    #[tokio::test]
    async fn test_send_without_webhook_does_not_fail() {
        let email = EmailService::new(&Config::test_default());
        email
            .send_verification("a@example.com", "Ada", "token")
            .await;
    }
}
