//! ARM Client
//!
//! Per-request client combining the shared HTTP client with the inbound
//! caller's token, the management base address for the inbound host, and the
//! inbound host as user agent.

use super::auth::{inbound_host, inbound_token};
use super::endpoint::EndpointResolver;
use super::http::{ArmHttpClient, UpstreamResponse};
use crate::error::ApiError;
use axum::http::HeaderMap;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;

/// Upper bound on pages followed for a single listing
pub const MAX_PAGES: usize = 1000;

/// One page of an ARM list response
#[derive(Debug, Deserialize)]
pub struct ArmPage<T> {
    pub value: Vec<T>,
    #[serde(rename = "nextLink", default)]
    pub next_link: Option<String>,
}

#[derive(Clone)]
pub struct ArmClient {
    http: ArmHttpClient,
    base_url: String,
    token: Option<String>,
    user_agent: String,
}

impl ArmClient {
    pub fn new(
        http: ArmHttpClient,
        base_url: impl Into<String>,
        token: Option<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token,
            user_agent: user_agent.into(),
        }
    }

    /// Build the client for an inbound request from its headers
    pub fn from_inbound(
        http: &ArmHttpClient,
        endpoints: &EndpointResolver,
        headers: &HeaderMap,
    ) -> Self {
        let host = inbound_host(headers);
        Self::new(
            http.clone(),
            endpoints.resolve(&host),
            inbound_token(headers),
            host,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Make a GET request and decode the JSON answer
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        self.http
            .get_json(url, self.token.as_deref(), &self.user_agent)
            .await
    }

    /// Fetch every page of an ARM list, following `nextLink`.
    ///
    /// Stops at an empty link, at any link already fetched, or after
    /// [`MAX_PAGES`] pages.
    pub async fn get_all_pages<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, ApiError> {
        let mut all_items = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(url.to_string());

        while let Some(current) = next.take() {
            if visited.len() >= MAX_PAGES {
                tracing::warn!("Stopping pagination after {} pages at {}", MAX_PAGES, current);
                break;
            }

            let page: ArmPage<T> = self.get_json(&current).await?;
            all_items.extend(page.value);
            visited.insert(current);

            next = page
                .next_link
                .filter(|link| !link.is_empty() && !visited.contains(link));
        }

        Ok(all_items)
    }

    /// Send a request and return the upstream answer whatever its status
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        json_body: Option<Vec<u8>>,
    ) -> Result<UpstreamResponse, ApiError> {
        self.http
            .send(method, url, self.token.as_deref(), &self.user_agent, json_body)
            .await
    }

    /// Absolute URLs are used as-is; anything else is resolved against the
    /// base address
    pub fn resolve_url(&self, url: &str) -> Result<Url, ApiError> {
        match Url::parse(url) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = Url::parse(&format!("{}/", self.base_url)).map_err(|e| {
                    ApiError::InvalidRequest(format!("bad base address {}: {}", self.base_url, e))
                })?;
                base.join(url.trim_start_matches('/'))
                    .map_err(|e| ApiError::InvalidRequest(format!("bad url {}: {}", url, e)))
            }
            Err(e) => Err(ApiError::InvalidRequest(format!("bad url {}: {}", url, e))),
        }
    }
}

// =========================================================================
// Management API URL helpers
// =========================================================================

/// List every resource in a subscription
pub fn resources_url(endpoint: &str, subscription_id: &str, api_version: &str) -> String {
    format!(
        "{}/subscriptions/{}/resources?api-version={}",
        endpoint,
        urlencoding::encode(subscription_id),
        api_version
    )
}

/// List the operations a resource provider exposes
pub fn provider_operations_url(endpoint: &str, namespace: &str, api_version: &str) -> String {
    format!(
        "{}/providers/{}/operations?api-version={}",
        endpoint,
        urlencoding::encode(namespace),
        api_version
    )
}
