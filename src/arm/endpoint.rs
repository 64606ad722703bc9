//! Management endpoint resolution
//!
//! Maps the host a request arrived on to the management endpoint it should be
//! forwarded to.

use crate::config::{EndpointRule, ProxySettings};
use std::sync::OnceLock;

#[derive(Debug)]
pub struct EndpointResolver {
    endpoint_override: Option<String>,
    rules: Vec<EndpointRule>,
    default_endpoint: String,
    /// First resolution, kept for the life of the process
    cached: OnceLock<String>,
}

impl EndpointResolver {
    pub fn new(
        endpoint_override: Option<String>,
        rules: Vec<EndpointRule>,
        default_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_override,
            rules,
            default_endpoint: default_endpoint.into(),
            cached: OnceLock::new(),
        }
    }

    pub fn from_settings(settings: &ProxySettings) -> Self {
        Self::new(
            settings.endpoint_override.clone(),
            settings.endpoint_rules.clone(),
            settings.default_endpoint.clone(),
        )
    }

    /// Resolve the endpoint for `host`. Pure: same host, same answer.
    ///
    /// An override wins over everything; otherwise the first rule whose suffix
    /// matches the host (case-insensitively) is used, then the default.
    pub fn resolve(&self, host: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_override {
            return normalize(endpoint);
        }

        let host = host.to_ascii_lowercase();
        self.rules
            .iter()
            .find(|rule| host.ends_with(&rule.host_suffix.to_ascii_lowercase()))
            .map(|rule| normalize(&rule.endpoint))
            .unwrap_or_else(|| normalize(&self.default_endpoint))
    }

    /// Endpoint computed from the first host seen by this process.
    ///
    /// Later calls return the memoized value whatever host they pass.
    pub fn cached(&self, host: &str) -> &str {
        self.cached.get_or_init(|| {
            let endpoint = self.resolve(host);
            tracing::info!("Management endpoint resolved to {} (host: {})", endpoint, host);
            endpoint
        })
    }
}

fn normalize(endpoint: &str) -> String {
    endpoint.trim_end_matches('/').to_string()
}
