//! Axum HTTP server.
//!
//! Routes the three operations behind the token gate and keeps the state
//! every request shares: one HTTP client, the endpoint resolver and the
//! resolved settings.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::arm::auth::{inbound_host, require_token};
use crate::arm::client::ArmClient;
use crate::arm::endpoint::EndpointResolver;
use crate::arm::http::ArmHttpClient;
use crate::config::ProxySettings;

pub mod handlers;

/// Response header carrying the wall-clock time spent on a listing
pub const ELAPSED_HEADER: &str = "X-Ms-Elapsed";

#[derive(Clone)]
pub struct AppState {
    pub http: ArmHttpClient,
    pub endpoints: Arc<EndpointResolver>,
    pub settings: Arc<ProxySettings>,
}

impl AppState {
    pub fn new(settings: ProxySettings) -> anyhow::Result<Self> {
        Ok(Self {
            http: ArmHttpClient::new()?,
            endpoints: Arc::new(EndpointResolver::from_settings(&settings)),
            settings: Arc::new(settings),
        })
    }

    /// Client carrying the inbound caller's token and host
    pub fn client_for(&self, headers: &HeaderMap) -> ArmClient {
        ArmClient::from_inbound(&self.http, &self.endpoints, headers)
    }

    /// Process-wide management endpoint, fixed by the first request
    pub fn endpoint_for(&self, headers: &HeaderMap) -> &str {
        self.endpoints.cached(&inbound_host(headers))
    }
}

/// Build the axum router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/operations", get(handlers::list_operations))
        .route("/api/operations/providers", get(handlers::get_providers))
        .route("/api/operations/invoke", post(handlers::invoke))
        .route_layer(middleware::from_fn(require_token));

    Router::new()
        .route("/healthz", get(handlers::health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
