//! Desired-state description of one instance and the identity persisted
//! between reconciliation passes

use proxyplane_domain::{
    AddInstanceRequest, Endpoint, Instance, InstanceGroupMetadata, QueryRule, RequestAction,
};

use super::diff::resolve_rule_ids;

/// What the caller wants an instance to look like.
///
/// Field validation (types, required values) is the caller's job; the
/// reconciler trusts what it is handed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstanceSpec {
    pub instance_name: String,
    pub username: String,
    pub password: String,
    pub master_instance: Endpoint,
    pub read_replicas: Vec<Endpoint>,
    pub query_rules: Vec<QueryRule>,
    pub enable_ssl: i32,
    pub max_instances: i64,
    /// Defaults to the instance name
    pub instance_group: Option<String>,
    pub key_data: Option<String>,
    pub cert_data: Option<String>,
    pub ca_data: Option<String>,
}

impl InstanceSpec {
    /// Instance-group metadata as sent to the backend.
    pub fn metadata(&self) -> InstanceGroupMetadata {
        InstanceGroupMetadata {
            instance_group: self
                .instance_group
                .clone()
                .unwrap_or_else(|| self.instance_name.clone()),
            max_instances: self.max_instances,
        }
    }

    /// Full creation payload.
    pub fn to_add_request(&self) -> AddInstanceRequest {
        AddInstanceRequest {
            action: RequestAction::Add,
            instance_name: self.instance_name.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            master_instance: self.master_instance.clone(),
            read_replicas: self.read_replicas.clone(),
            query_rules: self.query_rules.clone(),
            instance_group_metadata: self.metadata(),
            enable_ssl: self.enable_ssl,
            key_data: self.key_data.clone(),
            cert_data: self.cert_data.clone(),
            ca_data: self.ca_data.clone(),
        }
    }

    /// This spec with the ids the backend assigned to new rules, taken from a
    /// read-back by matching rule bodies.
    pub fn with_assigned_rule_ids(&self, observed: &Instance) -> Self {
        Self {
            query_rules: resolve_rule_ids(&observed.query_rules, &self.query_rules),
            ..self.clone()
        }
    }

    /// Rebuild a spec from a backend read-back.
    ///
    /// TLS material is write-only and never comes back, so those fields are
    /// `None`.
    pub fn from_observed(instance: &Instance) -> Self {
        let group = &instance.instance_group_metadata.instance_group;
        Self {
            instance_name: instance.instance_name.clone(),
            username: instance.username.clone(),
            password: instance.password.clone(),
            master_instance: instance.master_instance.clone(),
            read_replicas: instance.read_replicas.clone(),
            query_rules: instance.query_rules.clone(),
            enable_ssl: instance.use_ssl,
            max_instances: instance.instance_group_metadata.max_instances,
            instance_group: (!group.is_empty()).then(|| group.clone()),
            key_data: None,
            cert_data: None,
            ca_data: None,
        }
    }
}

/// Identity and last-known state of one managed instance.
///
/// The external caller persists this between passes; `id` is `None` until the
/// instance has been created and again after it has been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceState {
    pub id: Option<String>,
    /// Configuration applied by the last successful pass
    pub applied: Option<InstanceSpec>,
    /// Backend record from the last read-back
    pub observed: Option<Instance>,
}

impl ResourceState {
    /// State for an instance that already exists but was never applied by us.
    pub fn imported(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), applied: None, observed: None }
    }

    pub fn exists(&self) -> bool {
        self.id.is_some()
    }
}
