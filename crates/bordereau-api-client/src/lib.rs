//! Shared HTTP client for the bordereau back-office API.
//!
//! Provides a minimal client with configurable auth (Bearer token or X-API-Key),
//! generic JSON/multipart helpers, and the scan domain methods in [`api`].
//! Every error is reported as a [`ScanError`]; non-success responses carry the
//! message extracted from the server's payload.

pub mod api;

use bordereau_core::{ClientConfig, ScanError, ScanResult};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use bordereau_core::models::MutationResponse;

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

/// HTTP client for the back-office API with configurable auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, auth: Auth) -> ScanResult<Self> {
        Self::with_timeout(base_url, auth, Duration::from_secs(60))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        auth: Auth,
        timeout: Duration,
    ) -> ScanResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScanError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Create a client from configuration. A bearer token wins over an API key.
    pub fn from_config(config: &ClientConfig) -> ScanResult<Self> {
        let auth = match (&config.api_token, &config.api_key) {
            (Some(token), _) => Auth::Bearer(token.clone()),
            (None, Some(key)) => Auth::XApiKey(key.clone()),
            (None, None) => {
                return Err(ScanError::Config(
                    "Missing credentials. Set BORDEREAU_API_TOKEN or BORDEREAU_API_KEY".to_string(),
                ))
            }
        };
        Self::with_timeout(config.api_url.clone(), auth, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.build_url(path);
        tracing::debug!(method = %method, url = %url, "Sending API request");
        self.apply_auth(self.client.request(method, &url))
    }

    /// Send and check the status. Non-success responses become [`ScanError::Api`].
    async fn send(&self, request: RequestBuilder) -> ScanResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ScanError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!(status = status.as_u16(), body = %error_text, "API request failed");
            return Err(ScanError::from_status(status.as_u16(), error_text));
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ScanResult<T> {
        let text = response
            .text()
            .await
            .map_err(|e| ScanError::Transport(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| ScanError::Decode(e.to_string()))
    }

    /// Decode an acknowledgement. An empty body counts as success.
    async fn decode_ack(response: Response) -> ScanResult<MutationResponse> {
        let text = response
            .text()
            .await
            .map_err(|e| ScanError::Transport(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(MutationResponse {
                success: true,
                message: None,
            });
        }
        serde_json::from_str(&text).map_err(|e| ScanError::Decode(e.to_string()))
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ScanResult<T> {
        let mut request = self.request(Method::GET, path);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    /// POST without a body and deserialize response.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ScanResult<T> {
        let response = self.send(self.request(Method::POST, path)).await?;
        Self::decode(response).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> ScanResult<T> {
        let request = self.request(Method::POST, path).multipart(form);
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    /// POST multipart form expecting an acknowledgement.
    pub async fn post_multipart_ack(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> ScanResult<MutationResponse> {
        let request = self.request(Method::POST, path).multipart(form);
        let response = self.send(request).await?;
        Self::decode_ack(response).await
    }

    /// Send a bodiless or JSON request expecting an acknowledgement.
    pub async fn send_ack<B: serde::Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ScanResult<MutationResponse> {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.send(request).await?;
        Self::decode_ack(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:5000/api/", Auth::XApiKey("k".into())).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(
            client.build_url("/scan/manual/queue"),
            "http://localhost:5000/api/scan/manual/queue"
        );
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = ClientConfig::default();
        let err = ApiClient::from_config(&config).unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));

        let config = ClientConfig {
            api_key: Some("key".to_string()),
            ..ClientConfig::default()
        };
        let client = ApiClient::from_config(&config).unwrap();
        assert!(matches!(client.auth, Auth::XApiKey(_)));
    }
}
