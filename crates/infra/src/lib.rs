//! # proxyplane Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The HTTP transport (basic auth plus identity-aware proxy bearer)
//! - The typed Resource API client, implementing `InstanceApi`
//! - Identity-token providers
//! - Configuration loading and tracing bootstrap
//!
//! ## Architecture
//! - Implements traits defined in `proxyplane-core`
//! - Contains all "impure" code (network, environment, files)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{
    resolve_bearer, ApiClient, ApiClientBuilder, IdentityToken, IdentityTokenProvider,
    MetadataServerProvider,
};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_tracing, log_api_call};
