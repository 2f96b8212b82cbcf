//! Client for the endpoints that do not take a bearer token:
//! login, registration, and the password reset flow.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{CredentialStore, LogoutHook};
use crate::config::Config;
use crate::models::{Registration, User};

use super::client::{build_http_client, join_url, parse_body};
use super::{ApiClient, ApiError};

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Client for unauthenticated endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(config.api_base_url.clone(), config.request_timeout())
    }

    /// Create the authenticated gateway, sharing this client's connection pool
    pub fn gateway(&self, storage: Arc<dyn CredentialStore>, on_unauthorized: LogoutHook) -> ApiClient {
        ApiClient::with_client(self.client.clone(), self.base_url.clone(), storage, on_unauthorized)
    }

    /// POST a JSON body; non-success responses become `Authentication` errors
    async fn post<B: Serialize>(&self, path: &str, body: &B, fallback: &str) -> Result<String, ApiError> {
        let url = join_url(&self.base_url, path);
        debug!(url = %url, "Sending public request");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(url = %url, status = status.as_u16(), "Public request rejected");
            return Err(ApiError::authentication(status, &text, fallback));
        }
        Ok(response.text().await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = join_url(&self.base_url, "/users/login");
        let text = self
            .post("/users/login", &LoginRequest { email, password }, "Login failed")
            .await?;
        parse_body(&text, &url)
    }

    /// Register a new account. Returns the created user when the backend echoes one.
    pub async fn register(&self, registration: &Registration) -> Result<Option<User>, ApiError> {
        let url = join_url(&self.base_url, "/users/register");
        let text = self
            .post("/users/register", registration, "Registration failed")
            .await?;
        let value: serde_json::Value = parse_body(&text, &url)?;
        Ok(User::from_response(value))
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String, ApiError> {
        let text = self
            .post(
                "/users/forgot-password",
                &serde_json::json!({ "email": email }),
                "Failed to send reset link.",
            )
            .await?;
        Ok(Self::message_or(&text, "Reset link sent to your email."))
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<String, ApiError> {
        let text = self
            .post(
                &format!("/users/reset-password/{}", token),
                &serde_json::json!({ "password": password }),
                "Failed to reset password.",
            )
            .await?;
        Ok(Self::message_or(&text, "Password reset successfully. You may now log in."))
    }

    fn message_or(text: &str, default: &str) -> String {
        serde_json::from_str::<MessageBody>(text)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_or() {
        assert_eq!(AuthClient::message_or(r#"{"message":"Check your inbox"}"#, "d"), "Check your inbox");
        assert_eq!(AuthClient::message_or(r#"{"ok":true}"#, "d"), "d");
        assert_eq!(AuthClient::message_or("plain text", "d"), "d");
    }
}
