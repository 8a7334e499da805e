//! HTTP client for the Tableside platform's auth endpoints.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{LoginRequest, ProfileUpdate, RegisterRequest, Token, User};

use super::{ApiError, AuthApi};

/// Default HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API client for the Tableside backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against the given base URL.
    /// The timeout applies per request; there is no internal retry.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        let mut base_url = base_url.to_string();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/auth{}", self.base_url, path)
    }

    /// Map a reqwest-level failure into the normalized taxonomy: no reply
    /// at all is `Unreachable`, anything failing before or after the wire
    /// is `MalformedResponse`.
    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_connect() || err.is_timeout() {
            ApiError::unreachable(&self.base_url)
        } else {
            ApiError::MalformedResponse(err.to_string())
        }
    }

    /// Check if a response is successful, classifying the body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_response(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::MalformedResponse(format!("unexpected response shape: {}", e)))
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn register(&self, input: &RegisterRequest) -> Result<User, ApiError> {
        let url = self.endpoint("/register");
        debug!(url = %url, "sending registration request");

        let response = self
            .client
            .post(&url)
            .json(input)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response).await
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<Token, ApiError> {
        let url = self.endpoint("/login/json");
        debug!(url = %url, "sending login request");

        let response = self
            .client
            .post(&url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response).await
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let url = self.endpoint("/me");
        debug!(url = %url, "fetching current user");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response).await
    }

    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<User, ApiError> {
        let url = self.endpoint("/me");
        debug!(url = %url, "sending profile update");

        let response = self
            .client
            .put(&url)
            .bearer_auth(token)
            .json(update)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_building() {
        let client = ApiClient::new("http://localhost:8000", Duration::from_secs(30)).unwrap();
        assert_eq!(
            client.endpoint("/login/json"),
            "http://localhost:8000/api/auth/login/json"
        );
        assert_eq!(client.endpoint("/me"), "http://localhost:8000/api/auth/me");
    }

    #[test]
    fn test_trailing_slashes_stripped_from_base_url() {
        let client = ApiClient::new("http://localhost:8000//", Duration::from_secs(30)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
