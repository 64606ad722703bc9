//! Operation Catalogs - Load bundled operation descriptors from JSON
//!
//! Each resource-provider category ships its operation catalog as a JSON file
//! compiled into the binary. Descriptors are opaque; the only field the
//! catalog reads is the optional `hidden` marker, which is stripped before a
//! descriptor is served.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded catalog files (compiled into the binary)
const CATALOG_FILES: &[&str] = &[
    include_str!("../catalogs/websites.json"),
    include_str!("../catalogs/network.json"),
    include_str!("../catalogs/compute.json"),
    include_str!("../catalogs/storage.json"),
];

/// Anything that can list operation descriptors
pub trait OperationSource: Send + Sync {
    fn name(&self) -> &str;

    /// Descriptors in catalog order. `hidden` also includes entries that are
    /// normally not surfaced.
    fn list_operations(&self, hidden: bool) -> Vec<Value>;
}

/// Resource-provider categories with a bundled catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    WebSites,
    Network,
    Compute,
    Storage,
}

impl Category {
    /// Categories in union order
    pub const ALL: [Category; 4] = [
        Category::WebSites,
        Category::Network,
        Category::Compute,
        Category::Storage,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::WebSites => "webSites",
            Self::Network => "network",
            Self::Compute => "compute",
            Self::Storage => "storage",
        }
    }
}

impl OperationSource for Category {
    fn name(&self) -> &str {
        self.key()
    }

    fn list_operations(&self, hidden: bool) -> Vec<Value> {
        get_catalog(self.key())
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| hidden || !entry.hidden)
                    .map(|entry| Value::Object(entry.descriptor.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One catalog entry
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub hidden: bool,
    /// Everything except `hidden`, served as-is
    #[serde(flatten)]
    pub descriptor: Map<String, Value>,
}

/// Root structure of catalogs/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    pub category: String,
    #[serde(default)]
    pub operations: Vec<CatalogEntry>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<HashMap<String, Vec<CatalogEntry>>> = OnceLock::new();

/// Get the catalog registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static HashMap<String, Vec<CatalogEntry>> {
    REGISTRY.get_or_init(|| {
        let mut registry: HashMap<String, Vec<CatalogEntry>> = HashMap::new();

        for content in CATALOG_FILES {
            let file: CatalogFile = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded catalog JSON: {}", e));
            registry
                .entry(file.category)
                .or_default()
                .extend(file.operations);
        }

        registry
    })
}

/// Get a category's catalog entries by key
pub fn get_catalog(key: &str) -> Option<&'static Vec<CatalogEntry>> {
    get_registry().get(key)
}
