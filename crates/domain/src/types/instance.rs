//! Instance records as stored by the backend
//!
//! An instance is one logical routing unit: a master, an ordered list of read
//! replicas, the query rules that steer traffic between them, and the
//! host-group metadata the proxy fleet uses for scaling.

use serde::{Deserialize, Serialize};

/// A database endpoint (master or read replica).
///
/// Replicas have no identity of their own; the owning instance's list is
/// always replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Endpoint {
    pub name: String,
    pub ip_address: String,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, ip_address: impl Into<String>) -> Self {
        Self { name: name.into(), ip_address: ip_address.into() }
    }
}

/// A ProxySQL query routing rule.
///
/// `rule_id` is assigned by the backend and is the rule's identity; two rules
/// with the same id are the same rule even if their bodies differ. Flags are
/// integers with ProxySQL semantics (non-zero means enabled).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QueryRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<i64>,
    pub username: String,
    pub active: i32,
    pub match_digest: String,
    #[serde(default)]
    pub destination_hostgroup: i32,
    pub apply: i32,
    #[serde(default)]
    pub comment: String,
}

/// Scaling metadata for the proxy instance group serving this instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InstanceGroupMetadata {
    pub instance_group: String,
    pub max_instances: i64,
}

impl InstanceGroupMetadata {
    pub fn new(instance_group: impl Into<String>, max_instances: i64) -> Self {
        Self { instance_group: instance_group.into(), max_instances }
    }
}

/// The canonical backend record for one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Instance {
    pub instance_name: String,
    pub username: String,
    pub password: String,
    pub master_instance: Endpoint,
    #[serde(default)]
    pub read_replicas: Vec<Endpoint>,
    #[serde(default)]
    pub query_rules: Vec<QueryRule>,
    #[serde(default)]
    pub read_hostgroup: i32,
    #[serde(default)]
    pub write_hostgroup: i32,
    #[serde(default)]
    pub use_ssl: i32,
    #[serde(default)]
    pub instance_group_metadata: InstanceGroupMetadata,
}

impl QueryRule {
    /// True when every field except `rule_id` matches.
    pub fn same_body(&self, other: &QueryRule) -> bool {
        self.username == other.username
            && self.active == other.active
            && self.match_digest == other.match_digest
            && self.destination_hostgroup == other.destination_hostgroup
            && self.apply == other.apply
            && self.comment == other.comment
    }
}

impl Instance {
    /// Find a rule by its backend id.
    pub fn rule(&self, rule_id: i64) -> Option<&QueryRule> {
        self.query_rules.iter().find(|rule| rule.rule_id == Some(rule_id))
    }
}
