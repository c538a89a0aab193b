//! Instance reconciliation - converges backend state to a declared configuration

use std::sync::Arc;

use proxyplane_domain::{
    Instance, ModifyInstanceRequest, ProxyPlaneError, RemoveInstanceRequest, Result,
};
use tracing::{debug, info, instrument, warn};

use super::diff::{
    resolve_rule_ids, rules_for_patch, InstanceDiff, QueryRuleDiff, QueryRulePolicy,
};
use super::ports::InstanceApi;
use super::spec::{InstanceSpec, ResourceState};

/// Backend calls issued by one update pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateReport {
    /// Number of rule-scoped PATCH calls sent
    pub rules_patched: usize,
    /// The batched modify request, if one was sent
    pub modify: Option<ModifyInstanceRequest>,
}

impl UpdateReport {
    /// True when the pass made no mutating call.
    pub fn is_noop(&self) -> bool {
        self.rules_patched == 0 && self.modify.is_none()
    }
}

/// What a reconciliation pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    Created,
    Updated(UpdateReport),
    Deleted,
}

/// Result of one pass: the action and the fresh read-back (none after delete)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub action: ReconcileAction,
    pub observed: Option<Instance>,
}

/// Reconciliation service for one backend.
///
/// Passes are sequential; the caller drives one instance at a time and owns
/// persistence of [`ResourceState`] between passes.
pub struct Reconciler {
    api: Arc<dyn InstanceApi>,
    rule_policy: QueryRulePolicy,
}

impl Reconciler {
    /// Create a new reconciler using the per-rule PATCH path for query rules
    pub fn new(api: Arc<dyn InstanceApi>) -> Self {
        Self { api, rule_policy: QueryRulePolicy::default() }
    }

    /// Choose how query-rule changes are sent
    pub fn with_rule_policy(mut self, policy: QueryRulePolicy) -> Self {
        self.rule_policy = policy;
        self
    }

    pub fn rule_policy(&self) -> QueryRulePolicy {
        self.rule_policy
    }

    /// Run one pass of the state machine.
    ///
    /// - no recorded id: create from `desired`
    /// - recorded id and `Some(desired)`: update against the last applied
    ///   configuration (or a fresh read-back when nothing was applied yet)
    /// - recorded id and `None`: delete
    ///
    /// `state` is updated in place as each step succeeds, so after an error it
    /// still reflects what the backend has accepted so far.
    ///
    /// # Errors
    /// Returns the first error from the backend; nothing is rolled back.
    #[instrument(skip_all, fields(id = ?state.id))]
    pub async fn reconcile(
        &self,
        state: &mut ResourceState,
        desired: Option<&InstanceSpec>,
    ) -> Result<ReconcileOutcome> {
        match (state.id.clone(), desired) {
            (None, Some(desired)) => {
                state.id = Some(self.add(desired).await?);
                state.applied = Some(desired.clone());
                let observed = self.read(&desired.instance_name).await?;
                state.applied = Some(desired.with_assigned_rule_ids(&observed));
                state.observed = Some(observed.clone());
                Ok(ReconcileOutcome { action: ReconcileAction::Created, observed: Some(observed) })
            }
            (Some(id), Some(desired)) => {
                if id != desired.instance_name {
                    return Err(ProxyPlaneError::InvalidInput(format!(
                        "instance_name cannot change from '{}' to '{}'; recreate the instance",
                        id, desired.instance_name
                    )));
                }
                let previous = match state.applied.clone() {
                    Some(previous) => previous,
                    None => InstanceSpec::from_observed(&self.read(&id).await?),
                };
                let (report, observed) = self.update(&previous, desired).await?;
                state.applied = Some(desired.with_assigned_rule_ids(&observed));
                state.observed = Some(observed.clone());
                Ok(ReconcileOutcome {
                    action: ReconcileAction::Updated(report),
                    observed: Some(observed),
                })
            }
            (Some(id), None) => {
                let username = state
                    .applied
                    .as_ref()
                    .map(|spec| spec.username.clone())
                    .or_else(|| state.observed.as_ref().map(|obs| obs.username.clone()))
                    .unwrap_or_default();
                self.delete(&id, &username).await?;
                *state = ResourceState::default();
                Ok(ReconcileOutcome { action: ReconcileAction::Deleted, observed: None })
            }
            (None, None) => Err(ProxyPlaneError::InvalidInput(
                "nothing to reconcile: no recorded instance and no desired configuration".into(),
            )),
        }
    }

    /// Create an instance and read it back.
    ///
    /// # Errors
    /// Returns the add error, or the read-back error if the add succeeded.
    #[instrument(skip_all, fields(instance = %desired.instance_name))]
    pub async fn create(&self, desired: &InstanceSpec) -> Result<Instance> {
        let id = self.add(desired).await?;
        self.read(&id).await
    }

    /// Fetch the current backend record.
    pub async fn read(&self, id: &str) -> Result<Instance> {
        self.api.get_instance(id).await.inspect_err(|err| {
            warn!(instance = %id, error = %err, not_found = err.is_not_found(), "read-back failed");
        })
    }

    /// Converge an existing instance from `previous` to `desired`, then read
    /// it back.
    ///
    /// Query rules go first (per-rule path), then at most one batched modify
    /// request. The read-back happens even when nothing changed.
    ///
    /// # Errors
    /// Returns the first failing call; later calls are not attempted. On the
    /// per-rule path a new rule without an id is `InvalidInput` before any
    /// call is made.
    #[instrument(skip_all, fields(instance = %desired.instance_name, policy = ?self.rule_policy))]
    pub async fn update(
        &self,
        previous: &InstanceSpec,
        desired: &InstanceSpec,
    ) -> Result<(UpdateReport, Instance)> {
        if previous.instance_name != desired.instance_name {
            return Err(ProxyPlaneError::InvalidInput(format!(
                "cannot update '{}' from the configuration of '{}'",
                desired.instance_name, previous.instance_name
            )));
        }

        let diff = InstanceDiff::between(previous, desired);
        let mut report = UpdateReport::default();
        let mut request = diff.to_modify_request(&desired.instance_name);

        if diff.query_rules_changed {
            match self.rule_policy {
                QueryRulePolicy::PerRule => {
                    let rules = rules_for_patch(
                        &resolve_rule_ids(&previous.query_rules, &desired.query_rules),
                        diff.username.as_deref(),
                    );
                    if let Some(pending) = rules.iter().find(|rule| rule.rule_id.is_none()) {
                        return Err(ProxyPlaneError::InvalidInput(format!(
                            "query rule '{}' has no rule_id to patch; new rules need the \
                             authoritative rule policy",
                            pending.match_digest
                        )));
                    }
                    for rule in &rules {
                        self.api.modify_query_rule_by_id(rule).await?;
                        report.rules_patched += 1;
                    }
                }
                QueryRulePolicy::Authoritative => {
                    QueryRuleDiff::between(&previous.query_rules, &desired.query_rules)
                        .apply_to(&mut request);
                }
            }
        }

        if request.is_empty() {
            debug!(rules_patched = report.rules_patched, "no aggregated changes");
        } else {
            self.api.modify_instance(&request).await?;
            info!(rules_patched = report.rules_patched, "instance modified");
            report.modify = Some(request);
        }

        let observed = self.read(&desired.instance_name).await?;
        Ok((report, observed))
    }

    /// Remove an instance. No read-back.
    ///
    /// # Errors
    /// Returns the backend error; the instance may or may not still exist.
    #[instrument(skip(self, username))]
    pub async fn delete(&self, id: &str, username: &str) -> Result<()> {
        self.api.remove_instance(&RemoveInstanceRequest::new(id, username)).await?;
        info!("instance removed");
        Ok(())
    }

    async fn add(&self, desired: &InstanceSpec) -> Result<String> {
        let response = self.api.add_instance(&desired.to_add_request()).await?;
        debug!(echoed = %response.instance_name, "add acknowledged");
        info!(instance = %desired.instance_name, "instance created");
        Ok(desired.instance_name.clone())
    }
}
