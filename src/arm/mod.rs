//! Azure Resource Manager interaction module
//!
//! Everything needed to talk to the management endpoint on behalf of an
//! inbound caller: reading the caller's token, resolving which endpoint the
//! inbound host maps to, and the HTTP client that carries both.
//!
//! # Module Structure
//!
//! - [`auth`] - Inbound token and host extraction, plus the token gate
//! - [`endpoint`] - Host to management endpoint resolution (memoized)
//! - [`client`] - Per-request client carrying token, base address and user agent
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use crate::arm::client::{resources_url, ArmClient};
//!
//! async fn example(client: &ArmClient) -> Result<(), crate::error::ApiError> {
//!     let url = resources_url("https://management.azure.com", "sub-id", "2021-04-01");
//!     let page: serde_json::Value = client.get_json(&url).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod endpoint;
pub mod http;
