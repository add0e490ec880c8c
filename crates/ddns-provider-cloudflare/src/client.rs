// # Cloudflare Transport Adapter
//
// Every request carries `Authorization: Bearer <token>` and
// `Content-Type: application/json`, and is bounded by a fixed 30 second
// deadline. Response bodies are decoded into [`ApiEnvelope`] whatever the
// HTTP status; interpreting `success` is left to the caller.
//
// Network failures, timeouts and bodies that are not the expected JSON all
// surface as `Error::Transport`.

use std::time::Duration;

use ddns_core::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::ApiEnvelope;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Per-request deadline (not configurable)
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin JSON client for the Cloudflare API v4
pub(crate) struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    /// ⚠️ NEVER log this value
    api_token: String,
}

impl ApiClient {
    pub(crate) fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/{path}?{query}`
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiEnvelope<T>> {
        let request = self.request(Method::GET, path).query(query);
        self.execute(Method::GET, path, request).await
    }

    /// Send a JSON body (`POST` / `PUT`)
    pub(crate) async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<ApiEnvelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method.clone(), path).json(body);
        self.execute(method, path, request).await
    }

    /// `DELETE {base}/{path}`
    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiEnvelope<T>> {
        let request = self.request(Method::DELETE, path);
        self.execute(Method::DELETE, path, request).await
    }

    /// Bearer-authenticated JSON request
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.http
            .request(method, url)
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<ApiEnvelope<T>> {
        tracing::debug!("{} {}", method, path);

        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("{} {} failed: {}", method, path, e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                Error::transport(format!("{} {}: failed to read body: {}", method, path, e))
            })?;

        serde_json::from_slice(&body).map_err(|e| {
            Error::transport(format!(
                "{} {}: malformed response (HTTP {}): {}",
                method, path, status, e
            ))
        })
    }
}
