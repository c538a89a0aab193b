//! # proxyplane Domain
//!
//! Domain types and wire contracts for the proxy management backend.
//!
//! This crate contains:
//! - Instance, query rule, endpoint and user records
//! - Request/response payloads for the REST API
//! - Client configuration
//! - The error type and `Result` alias
//!
//! ## Architecture
//! - No dependencies on other proxyplane crates
//! - No I/O

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
