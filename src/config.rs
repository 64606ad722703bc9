//! Configuration Management
//!
//! Optional JSON configuration for armx. Command-line flags override anything
//! set here; anything unset falls back to the built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_RESOURCES_API_VERSION: &str = "2021-04-01";
pub const DEFAULT_SPECLESS_API_VERSION: &str = "2021-04-01";
pub const DEFAULT_SPECLESS_PROVIDERS: &[&str] = &["Microsoft.Resources"];

/// Maps an inbound host suffix to a management endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRule {
    pub host_suffix: String,
    pub endpoint: String,
}

impl EndpointRule {
    pub fn new(host_suffix: &str, endpoint: &str) -> Self {
        Self {
            host_suffix: host_suffix.to_string(),
            endpoint: endpoint.to_string(),
        }
    }
}

/// Built-in host rules for the sovereign clouds
pub fn default_endpoint_rules() -> Vec<EndpointRule> {
    vec![
        EndpointRule::new(".azure.cn", "https://management.chinacloudapi.cn"),
        EndpointRule::new(".azure.us", "https://management.usgovcloudapi.net"),
        EndpointRule::new(".azure.de", "https://management.microsoftazure.de"),
    ]
}

/// File configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Port to listen on
    #[serde(default)]
    pub port: Option<u16>,
    /// Address to bind
    #[serde(default)]
    pub bind: Option<String>,
    /// Management endpoint used for every host, bypassing the rules
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Host suffix rules, checked in order
    #[serde(default)]
    pub endpoint_rules: Option<Vec<EndpointRule>>,
    /// Fallback when no rule matches
    #[serde(default)]
    pub default_endpoint: Option<String>,
    /// api-version used when listing a subscription's resources
    #[serde(default)]
    pub resources_api_version: Option<String>,
    /// Provider namespaces whose operations are fetched live
    #[serde(default)]
    pub specless_providers: Option<Vec<String>>,
    /// api-version used for the live operation catalogs
    #[serde(default)]
    pub specless_api_version: Option<String>,
}

impl Config {
    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("armx").join("config.json"))
    }

    /// Load configuration from the default path, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }

    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn effective_bind(&self) -> String {
        self.bind.clone().unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    pub fn effective_endpoint_rules(&self) -> Vec<EndpointRule> {
        self.endpoint_rules
            .clone()
            .unwrap_or_else(default_endpoint_rules)
    }

    pub fn effective_default_endpoint(&self) -> String {
        self.default_endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn effective_resources_api_version(&self) -> String {
        self.resources_api_version
            .clone()
            .unwrap_or_else(|| DEFAULT_RESOURCES_API_VERSION.to_string())
    }

    pub fn effective_specless_providers(&self) -> Vec<String> {
        self.specless_providers.clone().unwrap_or_else(|| {
            DEFAULT_SPECLESS_PROVIDERS
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    pub fn effective_specless_api_version(&self) -> String {
        self.specless_api_version
            .clone()
            .unwrap_or_else(|| DEFAULT_SPECLESS_API_VERSION.to_string())
    }
}

/// Settings the request handlers read, resolved from CLI, file and defaults
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub endpoint_override: Option<String>,
    pub endpoint_rules: Vec<EndpointRule>,
    pub default_endpoint: String,
    pub resources_api_version: String,
    pub specless_providers: Vec<String>,
    pub specless_api_version: String,
}

impl ProxySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint_override: config.endpoint.clone(),
            endpoint_rules: config.effective_endpoint_rules(),
            default_endpoint: config.effective_default_endpoint(),
            resources_api_version: config.effective_resources_api_version(),
            specless_providers: config.effective_specless_providers(),
            specless_api_version: config.effective_specless_api_version(),
        }
    }

    /// Send every request to `endpoint` regardless of the inbound host
    pub fn with_endpoint_override(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint_override = Some(endpoint.into());
        self
    }

    pub fn with_specless_providers(mut self, providers: Vec<String>) -> Self {
        self.specless_providers = providers;
        self
    }
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.effective_port(), DEFAULT_PORT);
        assert_eq!(cfg.effective_bind(), DEFAULT_BIND);
        assert_eq!(cfg.effective_default_endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(cfg.effective_specless_providers(), vec!["Microsoft.Resources"]);
        assert_eq!(cfg.effective_endpoint_rules().len(), 3);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let cfg: Config = serde_json::from_str(
            r#"{"port": 9090, "specless_providers": ["Microsoft.Insights"]}"#,
        )
        .unwrap();
        assert_eq!(cfg.effective_port(), 9090);
        assert_eq!(cfg.effective_specless_providers(), vec!["Microsoft.Insights"]);
        assert_eq!(
            cfg.effective_resources_api_version(),
            DEFAULT_RESOURCES_API_VERSION
        );
    }

    #[test]
    fn empty_rule_list_disables_builtin_rules() {
        let cfg: Config = serde_json::from_str(r#"{"endpoint_rules": []}"#).unwrap();
        assert!(cfg.effective_endpoint_rules().is_empty());
    }

    #[test]
    fn load_from_missing_file_is_an_error() {
        let err = Config::load_from(Path::new("/nonexistent/armx/config.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn settings_override() {
        let settings = ProxySettings::default().with_endpoint_override("http://127.0.0.1:9999");
        assert_eq!(
            settings.endpoint_override.as_deref(),
            Some("http://127.0.0.1:9999")
        );
    }
}
