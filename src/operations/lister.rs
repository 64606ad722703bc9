//! Operation Lister
//!
//! Unions the bundled category catalogs with the operations the management
//! endpoint reports live for "specless" providers.

use super::catalog::{Category, OperationSource};
use crate::arm::client::{provider_operations_url, ArmClient};
use crate::config::ProxySettings;
use crate::error::ApiError;
use futures::future::try_join_all;
use serde_json::Value;
use std::collections::HashSet;

/// Set-union of `batches`, keeping the first occurrence of each descriptor in
/// iteration order. Equality is that of `serde_json::Value`.
pub fn union_operations<I>(batches: I) -> Vec<Value>
where
    I: IntoIterator<Item = Vec<Value>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for batch in batches {
        for op in batch {
            if seen.insert(canonical_key(&op)) {
                merged.push(op);
            }
        }
    }

    merged
}

/// Text that is equal for two values exactly when the values are equal:
/// object keys in sorted order whatever the map type, and `-0.0` written as
/// `0.0`
fn canonical_key(value: &Value) -> String {
    let mut key = String::new();
    write_canonical(value, &mut key);
    key
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Number(n) if n.is_f64() && n.as_f64() == Some(0.0) => out.push_str("0.0"),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(k.clone()).to_string());
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Local catalogs, one batch per source
pub fn local_operations(sources: &[&dyn OperationSource], hidden: bool) -> Vec<Vec<Value>> {
    sources
        .iter()
        .map(|source| {
            let ops = source.list_operations(hidden);
            tracing::debug!("{} catalog: {} operations", source.name(), ops.len());
            ops
        })
        .collect()
}

/// Operations reported by the management endpoint for each provider namespace,
/// concatenated in namespace order
pub async fn fetch_specless_operations(
    client: &ArmClient,
    endpoint: &str,
    providers: &[String],
    api_version: &str,
) -> Result<Vec<Value>, ApiError> {
    let fetches = providers.iter().map(|namespace| {
        let url = provider_operations_url(endpoint, namespace, api_version);
        async move { client.get_all_pages::<Value>(&url).await }
    });

    let pages = try_join_all(fetches).await?;
    Ok(pages.into_iter().flatten().collect())
}

/// Every operation available to the caller: webSites, network, compute and
/// storage catalogs, then the specless ones
pub async fn list_operations(
    client: &ArmClient,
    endpoint: &str,
    settings: &ProxySettings,
    hidden: bool,
) -> Result<Vec<Value>, ApiError> {
    let categories = Category::ALL;
    let sources: Vec<&dyn OperationSource> = categories
        .iter()
        .map(|c| c as &dyn OperationSource)
        .collect();
    let mut batches = local_operations(&sources, hidden);

    let specless = fetch_specless_operations(
        client,
        endpoint,
        &settings.specless_providers,
        &settings.specless_api_version,
    )
    .await?;
    tracing::debug!("specless catalog: {} operations", specless.len());
    batches.push(specless);

    Ok(union_operations(batches))
}
