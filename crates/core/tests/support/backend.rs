//! In-memory `InstanceApi` that records every call.
//!
//! Each test builds its own store; nothing is shared between tests.

use std::sync::Mutex;

use async_trait::async_trait;
use proxyplane_core::InstanceApi;
use proxyplane_domain::{
    AddInstanceRequest, AddInstanceResponse, Instance, ModifyInstanceRequest, ProxyPlaneError,
    QueryRule, RemoveInstanceRequest, Result as DomainResult,
};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Get(String),
    Add(AddInstanceRequest),
    Remove(RemoveInstanceRequest),
    Modify(ModifyInstanceRequest),
    ModifyRule(QueryRule),
}

/// Backend double applying the same contract as the real service:
/// replicas replaced wholesale, rule removals applied before additions, and
/// the next free id assigned to rules that arrive without one.
#[derive(Default)]
pub struct RecordingApi {
    instances: Mutex<Vec<Instance>>,
    calls: Mutex<Vec<Call>>,
    fail_modify: Mutex<Option<ProxyPlaneError>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing instance.
    pub fn with_instance(self, instance: Instance) -> Self {
        self.instances.lock().unwrap().push(instance);
        self
    }

    /// Make the next `modify_instance` call fail with `error`.
    pub fn fail_next_modify(&self, error: ProxyPlaneError) {
        *self.fail_modify.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that would change backend state.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Call::List | Call::Get(_)))
            .collect()
    }

    pub fn stored(&self, name: &str) -> Option<Instance> {
        self.instances.lock().unwrap().iter().find(|i| i.instance_name == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.instances.lock().unwrap().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn not_found(name: &str) -> ProxyPlaneError {
        ProxyPlaneError::Status { status: 404, body: format!("instance {name} not found") }
    }
}

#[async_trait]
impl InstanceApi for RecordingApi {
    async fn list_instances(&self) -> DomainResult<Vec<Instance>> {
        self.record(Call::List);
        Ok(self.instances.lock().unwrap().clone())
    }

    async fn get_instance(&self, instance_name: &str) -> DomainResult<Instance> {
        self.record(Call::Get(instance_name.to_string()));
        self.stored(instance_name).ok_or_else(|| Self::not_found(instance_name))
    }

    async fn add_instance(&self, request: &AddInstanceRequest) -> DomainResult<AddInstanceResponse> {
        self.record(Call::Add(request.clone()));
        let instance = Instance {
            instance_name: request.instance_name.clone(),
            username: request.username.clone(),
            password: request.password.clone(),
            master_instance: request.master_instance.clone(),
            read_replicas: request.read_replicas.clone(),
            query_rules: request.query_rules.iter().cloned().fold(Vec::new(), assign_rule),
            read_hostgroup: 10,
            write_hostgroup: 5,
            use_ssl: request.enable_ssl,
            instance_group_metadata: request.instance_group_metadata.clone(),
        };
        self.instances.lock().unwrap().push(instance);
        Ok(AddInstanceResponse {
            action: "add".into(),
            instance_name: request.instance_name.clone(),
            username: request.username.clone(),
            ..Default::default()
        })
    }

    async fn remove_instance(&self, request: &RemoveInstanceRequest) -> DomainResult<()> {
        self.record(Call::Remove(request.clone()));
        let mut instances = self.instances.lock().unwrap();
        let before = instances.len();
        instances.retain(|i| i.instance_name != request.instance_name);
        if instances.len() == before {
            return Err(Self::not_found(&request.instance_name));
        }
        Ok(())
    }

    async fn modify_instance(&self, request: &ModifyInstanceRequest) -> DomainResult<()> {
        self.record(Call::Modify(request.clone()));
        if let Some(error) = self.fail_modify.lock().unwrap().take() {
            return Err(error);
        }
        let mut instances = self.instances.lock().unwrap();
        let instance = instances
            .iter_mut()
            .find(|i| i.instance_name == request.instance_name)
            .ok_or_else(|| Self::not_found(&request.instance_name))?;

        if let Some(username) = &request.new_username {
            instance.username = username.clone();
        }
        if let Some(password) = &request.new_password {
            instance.password = password.clone();
        }
        if let Some(replicas) = &request.read_replicas {
            instance.read_replicas = replicas.clone();
        }
        if let Some(ids) = &request.remove_query_rules {
            instance.query_rules.retain(|rule| !rule.rule_id.is_some_and(|id| ids.contains(&id)));
        }
        if let Some(rules) = &request.add_query_rules {
            let existing = std::mem::take(&mut instance.query_rules);
            instance.query_rules = rules.iter().cloned().fold(existing, assign_rule);
        }
        if let Some(metadata) = &request.instance_group_metadata {
            instance.instance_group_metadata = metadata.clone();
        }
        Ok(())
    }

    async fn modify_query_rule_by_id(&self, rule: &QueryRule) -> DomainResult<()> {
        self.record(Call::ModifyRule(rule.clone()));
        let rule_id = rule.rule_id.ok_or_else(|| {
            ProxyPlaneError::InvalidInput("query rule has no rule_id".into())
        })?;
        let mut instances = self.instances.lock().unwrap();
        let existing = instances
            .iter_mut()
            .flat_map(|i| i.query_rules.iter_mut())
            .find(|r| r.rule_id == Some(rule_id))
            .ok_or(ProxyPlaneError::Status { status: 404, body: "rule not found".into() })?;
        *existing = rule.clone();
        Ok(())
    }
}

fn assign_rule(mut rules: Vec<QueryRule>, mut rule: QueryRule) -> Vec<QueryRule> {
    if rule.rule_id.is_none() {
        rule.rule_id = Some(rules.iter().filter_map(|r| r.rule_id).max().unwrap_or(0) + 1);
    }
    rules.push(rule);
    rules
}
