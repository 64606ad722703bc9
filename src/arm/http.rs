//! HTTP utilities for ARM REST API calls

use crate::error::ApiError;
use anyhow::{Context, Result};
use axum::body::Bytes;
use reqwest::header::{HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, IntoUrl, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Upstream response relayed back to the caller unchanged
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Shared HTTP client for management API calls
///
/// Cheap to clone; every clone reuses the same connection pool.
#[derive(Clone)]
pub struct ArmHttpClient {
    client: Client,
}

impl ArmHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    fn prepare(
        &self,
        method: Method,
        url: impl IntoUrl,
        token: Option<&str>,
        user_agent: &str,
    ) -> RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if !user_agent.is_empty() {
            request = request.header(USER_AGENT, user_agent);
        }
        request
    }

    /// GET `url` and decode the JSON body into `T`
    ///
    /// Any non-success status is an error carrying that status.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: Option<&str>,
        user_agent: &str,
    ) -> Result<T, ApiError> {
        tracing::debug!("GET {}", url);

        let response = self
            .prepare(Method::GET, url, token, user_agent)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::Upstream { status });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Send a request and hand back whatever the endpoint answered
    pub async fn send(
        &self,
        method: Method,
        url: reqwest::Url,
        token: Option<&str>,
        user_agent: &str,
        json_body: Option<Vec<u8>>,
    ) -> Result<UpstreamResponse, ApiError> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.prepare(method, url, token, user_agent);
        if let Some(body) = json_body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await?;

        if !status.is_success() {
            tracing::warn!(
                "Forwarded request answered {} - {}",
                status,
                sanitize_for_log(&String::from_utf8_lossy(&body))
            );
        }

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
