//! Inbound authentication
//!
//! Callers authenticate by sending their ARM access token in the
//! `X-MS-OAUTH-TOKEN` header. The proxy never mints tokens; it only relays the
//! caller's token to the management endpoint.

use crate::error::ApiError;
use axum::extract::Request;
use axum::http::uri::Authority;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

/// Header carrying the caller's access token (`X-MS-OAUTH-TOKEN`)
pub const AUTH_TOKEN_HEADER: &str = "x-ms-oauth-token";

/// Token from the inbound request (first value if the header repeats)
pub fn inbound_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(AUTH_TOKEN_HEADER)
        .iter()
        .next()
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Host the inbound request was addressed to, without the port
pub fn inbound_host(headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Authority>().ok())
        .map(|authority| authority.host().to_string())
        .unwrap_or_default()
}

/// Reject requests that carry no token before any handler runs
pub async fn require_token(req: Request, next: Next) -> Result<Response, ApiError> {
    match inbound_token(req.headers()) {
        Some(token) if !token.trim().is_empty() => Ok(next.run(req).await),
        _ => Err(ApiError::Unauthorized(AUTH_TOKEN_HEADER)),
    }
}
