//! Instance reconciliation: desired state, change detection and the service
//! that applies changes through the [`InstanceApi`] port

pub mod diff;
pub mod ports;
pub mod reconciler;
pub mod spec;

pub use diff::{resolve_rule_ids, rules_for_patch, InstanceDiff, QueryRuleDiff, QueryRulePolicy};
pub use ports::InstanceApi;
pub use reconciler::{ReconcileAction, ReconcileOutcome, Reconciler, UpdateReport};
pub use spec::{InstanceSpec, ResourceState};
