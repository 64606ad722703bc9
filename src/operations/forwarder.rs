//! Request Forwarder
//!
//! Relays a caller-described request to the management endpoint and hands
//! the answer back untouched.

use crate::arm::client::ArmClient;
use crate::arm::http::UpstreamResponse;
use crate::error::ApiError;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const API_VERSION_MARKER: &str = "?api-version=";

/// Request to forward
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OperationInfo {
    pub http_method: String,
    pub url: String,
    pub api_version: String,
    /// `null` and absent both mean "no body"
    #[serde(default)]
    pub request_body: Option<Value>,
}

/// Append `?api-version=` unless the url already contains that exact text.
///
/// This is a substring check, not query parsing: a url that already has a
/// query gets a second `?` appended.
pub fn with_api_version(url: &str, api_version: &str) -> String {
    if url.contains(API_VERSION_MARKER) {
        url.to_string()
    } else {
        format!("{}{}{}", url, API_VERSION_MARKER, api_version)
    }
}

/// Body bytes to send, if any
pub fn encode_body(body: Option<&Value>) -> Result<Option<Vec<u8>>, ApiError> {
    body.map(serde_json::to_vec).transpose().map_err(ApiError::from)
}

/// Forward `info` and return the upstream status and body
pub async fn forward(client: &ArmClient, info: &OperationInfo) -> Result<UpstreamResponse, ApiError> {
    let method = Method::from_bytes(info.http_method.trim().as_bytes())
        .map_err(|_| ApiError::InvalidRequest(format!("unknown HTTP method {:?}", info.http_method)))?;

    let url = client.resolve_url(&with_api_version(&info.url, &info.api_version))?;
    let body = encode_body(info.request_body.as_ref())?;

    tracing::info!(
        method = %method,
        url = %url,
        has_body = body.is_some(),
        "Forwarding request"
    );

    client.send(method, url, body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn appends_when_absent() {
        assert_eq!(
            with_api_version("https://x/y", "2020-01-01"),
            "https://x/y?api-version=2020-01-01"
        );
    }

    #[test]
    fn appends_after_existing_query() {
        assert_eq!(
            with_api_version("https://x/y?foo=bar", "2020-01-01"),
            "https://x/y?foo=bar?api-version=2020-01-01"
        );
    }

    #[test]
    fn keeps_existing_api_version() {
        assert_eq!(
            with_api_version("https://x/y?api-version=2019-01-01", "2020-01-01"),
            "https://x/y?api-version=2019-01-01"
        );
    }

    #[test]
    fn api_version_after_ampersand_is_not_recognized() {
        assert_eq!(
            with_api_version("https://x/y?foo=bar&api-version=2019-01-01", "2020-01-01"),
            "https://x/y?foo=bar&api-version=2019-01-01?api-version=2020-01-01"
        );
    }

    #[test]
    fn operation_info_uses_pascal_case() {
        let info: OperationInfo = serde_json::from_value(json!({
            "HttpMethod": "PUT",
            "Url": "/subscriptions/s",
            "ApiVersion": "2021-04-01",
            "RequestBody": {"location": "westus"}
        }))
        .unwrap();
        assert_eq!(info.http_method, "PUT");
        assert_eq!(info.request_body, Some(json!({"location": "westus"})));
    }

    #[test]
    fn null_and_missing_body_are_none() {
        let with_null: OperationInfo = serde_json::from_value(json!({
            "HttpMethod": "GET", "Url": "/x", "ApiVersion": "1", "RequestBody": null
        }))
        .unwrap();
        let missing: OperationInfo = serde_json::from_value(json!({
            "HttpMethod": "GET", "Url": "/x", "ApiVersion": "1"
        }))
        .unwrap();
        assert!(with_null.request_body.is_none());
        assert!(missing.request_body.is_none());
    }

    #[test]
    fn body_encodes_as_json_text() {
        let body = json!({"name": "ü", "n": 1});
        let bytes = encode_body(Some(&body)).unwrap().unwrap();
        assert_eq!(bytes, body.to_string().into_bytes());
        assert!(encode_body(None).unwrap().is_none());
    }
}
