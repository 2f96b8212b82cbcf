//! Authenticated request gateway.
//!
//! Every bearer-authenticated call to the backend goes through `ApiClient`.
//! It reads the token from persisted storage, attaches it, and turns a 401
//! into a forced logout through the injected hook.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::session::persisted_token;
use crate::auth::{CredentialStore, LogoutHook};

use super::ApiError;

/// Build the shared HTTP client. No timeout unless one is configured.
pub(crate) fn build_http_client(timeout: Option<Duration>) -> Result<Client, ApiError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Parse a success body. An empty body reads as JSON `null`.
pub(crate) fn parse_body<T: DeserializeOwned>(text: &str, url: &str) -> Result<T, ApiError> {
    let body = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(body)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", url, e)))
}

pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    /// Content type (with boundary) is left to the transport
    Multipart(Form),
}

impl RequestBody {
    fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }
}

pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Add a caller header. `Authorization` is always overwritten by the gateway.
    pub fn header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Gateway for bearer-authenticated backend calls.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    storage: Arc<dyn CredentialStore>,
    on_unauthorized: LogoutHook,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
        storage: Arc<dyn CredentialStore>,
        on_unauthorized: LogoutHook,
    ) -> Result<Self, ApiError> {
        Ok(Self::with_client(build_http_client(timeout)?, base_url, storage, on_unauthorized))
    }

    /// Create a gateway on an existing client, sharing its connection pool
    pub(crate) fn with_client(
        client: Client,
        base_url: impl Into<String>,
        storage: Arc<dyn CredentialStore>,
        on_unauthorized: LogoutHook,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            storage,
            on_unauthorized,
        }
    }

    /// Token from persisted storage, not from any in-memory session
    fn stored_token(&self) -> Result<String, ApiError> {
        let raw = self.storage.load()?.ok_or(ApiError::NoSession)?;
        persisted_token(&raw)?.ok_or(ApiError::NoSession)
    }

    fn build_headers(mut headers: HeaderMap, token: &str, multipart: bool) -> Result<HeaderMap, ApiError> {
        if multipart {
            headers.remove(header::CONTENT_TYPE);
        } else {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::Decode("token is not a valid header value".to_string()))?;
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Issue an authenticated request to `<base_url><path>`.
    ///
    /// Fails with `NoSession` before any network I/O when no token is
    /// persisted. A 401 fires the logout hook once and fails with
    /// `Unauthorized`. The success body is returned as parsed, unvalidated.
    pub async fn request<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T, ApiError> {
        let token = self.stored_token()?;
        let url = join_url(&self.base_url, path);

        let RequestOptions { method, headers, body } = options;
        let headers = Self::build_headers(headers, &token, body.is_multipart())?;

        debug!(method = %method, url = %url, "Sending request");
        let request = self.client.request(method, &url).headers(headers);
        let request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %url, "Request unauthorized");
            (self.on_unauthorized)();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(url = %url, status = status.as_u16(), "Request failed");
            return Err(ApiError::from_status(status, &body));
        }

        let text = response.text().await?;
        parse_body(&text, &url)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(path, RequestOptions::new(Method::GET)).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.request(path, RequestOptions::new(Method::POST).json(body)?).await
    }

    pub async fn put_json<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.request(path, RequestOptions::new(Method::PUT).json(body)?).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        self.request(path, RequestOptions::new(Method::POST).multipart(form)).await
    }

    pub async fn put_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        self.request(path, RequestOptions::new(Method::PUT).multipart(form)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(path, RequestOptions::new(Method::DELETE)).await
    }
}
