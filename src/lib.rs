//! Aggregation proxy for the Azure Resource Manager API.
//!
//! Exposes three endpoints on behalf of a caller holding an ARM access token:
//! a merged operation catalog, a resource-group/provider index of a
//! subscription, and a raw request forwarder.

pub mod arm;
pub mod config;
pub mod error;
pub mod operations;
pub mod server;

/// Version injected at compile time via ARMX_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("ARMX_VERSION") {
    Some(v) => v,
    None => "dev",
};
