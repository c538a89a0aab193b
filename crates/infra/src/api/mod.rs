//! Resource API for the instance management backend
//!
//! # Architecture
//!
//! - [`HttpClient`](crate::http::HttpClient) does transport only; this module
//!   owns the JSON contracts and the endpoint paths
//! - One awaited request per operation, no retries
//! - Proxy bearer resolved at construction, refreshable on demand
//! - Every call emits an `api_call_success` / `api_call_failure` event

pub mod auth;
pub mod client;
mod instances;
mod users;

pub use auth::{
    resolve_bearer, IdentityToken, IdentityTokenProvider, MetadataServerProvider,
    METADATA_HOST_ENV,
};
pub use client::{ApiClient, ApiClientBuilder};
