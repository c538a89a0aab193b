//! # proxyplane Core
//!
//! Reconciliation logic - no HTTP, no configuration loading.
//!
//! This crate contains:
//! - The `InstanceApi` port (implemented in `proxyplane-infra`)
//! - Desired-state types and the persisted resource identity
//! - Field-level diffing and query-rule merge policy
//! - The `Reconciler` service
//!
//! ## Architecture Principles
//! - Only depends on `proxyplane-domain`
//! - All backend access via traits
//! - Pure, testable business logic

pub mod instance;

// Re-export specific items to avoid ambiguity
pub use instance::{
    InstanceApi, InstanceDiff, InstanceSpec, QueryRuleDiff, QueryRulePolicy, ReconcileAction,
    ReconcileOutcome, Reconciler, ResourceState, UpdateReport,
};
