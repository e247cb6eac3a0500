use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("failed to decode response body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Error envelope the backend wraps rejections in. Only the message is
/// interesting on this side of the wire.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

/// Typed client for the service-shop backend.
///
/// Every request carries the stored bearer token, a generated
/// `x-request-id` for log correlation, and the configured timeout. Any
/// response status other than exactly `200 OK` is a failure, even when
/// the body would parse.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token
                .strip_prefix("Bearer ")
                .unwrap_or(token)
                .to_string(),
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http_get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.get(self.url(path))
    }

    pub(crate) fn http_patch<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> reqwest::RequestBuilder {
        self.http.patch(self.url(path)).json(body)
    }

    /// Attach auth and correlation headers, send, and enforce the
    /// exact-200 success rule.
    pub(crate) async fn send(
        &self,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, path, "issuing backend request");

        let response = request
            .bearer_auth(&self.token)
            .header("x-request-id", request_id.to_string())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let error = Self::status_error(response).await;
            tracing::warn!(%request_id, path, %status, "backend rejected request");
            return Err(error);
        }
        Ok(response)
    }

    /// Recover the backend's human-readable message from a non-200
    /// body when it carries the standard error envelope; fall back to
    /// the status line otherwise.
    async fn status_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let message = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) if !envelope.message.is_empty() => envelope.message,
            _ => status
                .canonical_reason()
                .unwrap_or("request rejected")
                .to_string(),
        };
        ApiError::Status { status, message }
    }
}
