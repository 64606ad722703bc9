//! The three request operations
//!
//! # Architecture
//!
//! - [`catalog`] - Bundled per-category operation catalogs
//! - [`lister`] - Union of the bundled and live operation catalogs
//! - [`indexer`] - Resource group / provider / collection index of a subscription
//! - [`forwarder`] - Relays an arbitrary request to the management endpoint

pub mod catalog;
pub mod forwarder;
pub mod indexer;
pub mod lister;

pub use catalog::{Category, OperationSource};
pub use forwarder::{forward, with_api_version, OperationInfo};
pub use indexer::{fetch_provider_index, index_resources, parse_resource_id, ProviderIndex};
pub use lister::{list_operations, union_operations};
