use std::time::Instant;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Deserializer};
use serde_json::json;
use uuid::Uuid;

use super::{AppState, ELAPSED_HEADER};
use crate::error::ApiError;
use crate::operations::{forwarder, indexer, lister, OperationInfo};

#[derive(Debug, Deserialize)]
pub struct OperationsQuery {
    #[serde(default, deserialize_with = "bool_ignore_case")]
    pub hidden: bool,
}

/// `true`/`false` in any letter case; an empty value is `false`
fn bool_ignore_case<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else {
        Err(serde::de::Error::invalid_value(
            serde::de::Unexpected::Str(raw),
            &"true or false",
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct ProvidersQuery {
    #[serde(rename = "subscriptionId")]
    pub subscription_id: String,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

/// `GET /api/operations?hidden=`
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn list_operations(
    State(state): State<AppState>,
    Query(query): Query<OperationsQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let watch = Instant::now();

    let client = state.client_for(&headers);
    let endpoint = state.endpoint_for(&headers);
    let operations = lister::list_operations(&client, endpoint, &state.settings, query.hidden).await?;

    let elapsed = watch.elapsed().as_millis();
    tracing::debug!(
        "Listed {} operations (hidden: {}) in {}ms",
        operations.len(),
        query.hidden,
        elapsed
    );

    Ok(([(ELAPSED_HEADER, format!("{}ms", elapsed))], Json(operations)))
}

/// `GET /api/operations/providers?subscriptionId=`
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn get_providers(
    State(state): State<AppState>,
    Query(query): Query<ProvidersQuery>,
    headers: HeaderMap,
) -> Result<Json<indexer::ProviderIndex>, ApiError> {
    let client = state.client_for(&headers);
    let endpoint = state.endpoint_for(&headers);

    let index = indexer::fetch_provider_index(
        &client,
        endpoint,
        &query.subscription_id,
        &state.settings.resources_api_version,
    )
    .await?;

    Ok(Json(index))
}

/// `POST /api/operations/invoke`
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn invoke(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(info): Json<OperationInfo>,
) -> Result<Response, ApiError> {
    let client = state.client_for(&headers);
    let upstream = forwarder::forward(&client, &info).await?;

    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    if let Some(content_type) = upstream.content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }

    Ok(response)
}
