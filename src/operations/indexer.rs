//! Provider/Resource-Group Indexer
//!
//! Groups a subscription's resources by resource group, then provider, then
//! collection (resource type segment).

use crate::arm::client::{resources_url, ArmClient};
use crate::error::ApiError;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Resource group → provider → collections, all upper-cased
pub type ProviderIndex = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// One entry of the resource listing; only the id is needed
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceEntry {
    pub id: String,
}

static RESOURCE_ID_PATTERN: OnceLock<Regex> = OnceLock::new();

fn resource_id_pattern() -> &'static Regex {
    RESOURCE_ID_PATTERN.get_or_init(|| {
        Regex::new(r"/subscriptions/.*?/resourceGroups/(.*?)/providers/(.*?)/(.*?)/")
            .unwrap_or_else(|e| panic!("Invalid resource id pattern: {}", e))
    })
}

/// Extract (resource group, provider, collection) from a resource id,
/// upper-cased. `None` when the id does not have all three segments.
pub fn parse_resource_id(id: &str) -> Option<(String, String, String)> {
    let caps = resource_id_pattern().captures(id)?;
    Some((
        upper_per_char(&caps[1]),
        upper_per_char(&caps[2]),
        upper_per_char(&caps[3]),
    ))
}

/// Upper-case one character at a time. Characters whose upper case is more
/// than one character (`ß`) are kept as they are.
fn upper_per_char(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(single), None) => single,
                _ => c,
            }
        })
        .collect()
}

/// Build the index from resource ids. Ids that don't parse are skipped.
pub fn index_resources<'a, I>(ids: I) -> ProviderIndex
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index = ProviderIndex::new();

    for id in ids {
        let Some((resource_group, provider, collection)) = parse_resource_id(id) else {
            continue;
        };

        index
            .entry(resource_group)
            .or_default()
            .entry(provider)
            .or_default()
            .insert(collection);
    }

    index
}

/// Fetch every resource in `subscription_id` and index it
pub async fn fetch_provider_index(
    client: &ArmClient,
    endpoint: &str,
    subscription_id: &str,
    api_version: &str,
) -> Result<ProviderIndex, ApiError> {
    let url = resources_url(endpoint, subscription_id, api_version);
    let resources: Vec<ResourceEntry> = client.get_all_pages(&url).await?;

    tracing::debug!(
        "Indexing {} resources for subscription {}",
        resources.len(),
        subscription_id
    );

    Ok(index_resources(resources.iter().map(|r| r.id.as_str())))
}
