//! HTTP transport for the PMO REST API
//!
//! One attempt per call, no retries. Non-2xx answers become
//! [`ApiError::RequestFailed`] carrying the status and the raw body text;
//! 204 answers (and empty bodies) come back as `None` without JSON parsing.

use super::error::ApiError;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Default backend address for local development
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Per-call options for [`ApiClient::request`]
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Attach a JSON body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach an explicit header (an explicit `Content-Type` wins over the JSON default)
    pub fn with_header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// Thin reqwest wrapper bound to a base URL.
///
/// Cheap to clone (the reqwest client is reference counted).
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` with the transport's default timeout
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client for `base_url` reusing a preconfigured reqwest client
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a request and return the parsed JSON body (`None` for 204).
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<Value>, ApiError> {
        self.request_as(path, options).await
    }

    /// Issue a request and decode the JSON body into `T` (`None` for 204).
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, ApiError> {
        let url = self.url(path);
        let RequestOptions {
            method,
            body,
            mut headers,
        } = options;

        let mut builder = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            let bytes = serde_json::to_vec(&body).map_err(|source| ApiError::Encode {
                path: path.to_string(),
                source,
            })?;
            builder = builder.body(bytes);
        }
        builder = builder.headers(headers);

        debug!(method = %method, url = %url, "Sending API request");

        let response = builder.send().await.map_err(|source| ApiError::Network {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                "API request failed"
            );
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Network { url, source })?;
        if bytes.is_empty() {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ApiError::Decode {
                path: path.to_string(),
                source,
            })
    }

    /// Request that must answer with an entity
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request_as(path, options)
            .await?
            .ok_or_else(|| ApiError::EmptyBody {
                path: path.to_string(),
            })
    }

    /// Request whose body (if any) is discarded
    pub(crate) async fn execute(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<(), ApiError> {
        self.request_as::<Value>(path, options).await.map(|_| ())
    }
}
