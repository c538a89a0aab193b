//! Change detection between two declared configurations
//!
//! Produces the minimal sparse patch for one instance. Replicas are compared
//! as a whole list and replaced wholesale; query rules are compared by rule id.

use std::collections::{HashMap, HashSet};

use proxyplane_domain::{Endpoint, InstanceGroupMetadata, ModifyInstanceRequest, QueryRule};

use super::spec::InstanceSpec;

/// How query-rule changes reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryRulePolicy {
    /// Send every desired rule through the rule-scoped PATCH endpoint.
    #[default]
    PerRule,
    /// Carry a by-id add/remove diff inside the single modify request.
    Authoritative,
}

/// Field-level changes between a previous and a desired configuration.
///
/// Each `Some` holds the *new* value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstanceDiff {
    pub username: Option<String>,
    pub password: Option<String>,
    pub read_replicas: Option<Vec<Endpoint>>,
    pub metadata: Option<InstanceGroupMetadata>,
    pub query_rules_changed: bool,
}

impl InstanceDiff {
    pub fn between(previous: &InstanceSpec, desired: &InstanceSpec) -> Self {
        Self {
            username: (previous.username != desired.username).then(|| desired.username.clone()),
            password: (previous.password != desired.password).then(|| desired.password.clone()),
            read_replicas: (previous.read_replicas != desired.read_replicas)
                .then(|| desired.read_replicas.clone()),
            // Only the count is compared; a renamed group alone is not a change.
            metadata: (previous.max_instances != desired.max_instances)
                .then(|| desired.metadata()),
            query_rules_changed: !QueryRuleDiff::between(
                &previous.query_rules,
                &desired.query_rules,
            )
            .is_empty(),
        }
    }

    /// True when at least one field batched into the modify request changed.
    pub fn has_aggregated_changes(&self) -> bool {
        self.username.is_some()
            || self.password.is_some()
            || self.read_replicas.is_some()
            || self.metadata.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_aggregated_changes() && !self.query_rules_changed
    }

    /// Sparse patch carrying every aggregated change.
    pub fn to_modify_request(&self, instance_name: &str) -> ModifyInstanceRequest {
        let mut request = ModifyInstanceRequest::new(instance_name);
        request.new_username = self.username.clone();
        request.new_password = self.password.clone();
        request.read_replicas = self.read_replicas.clone();
        request.instance_group_metadata = self.metadata.clone();
        request
    }
}

/// Desired rules prepared for the rule-scoped PATCH path.
///
/// When the instance username changes in the same pass, every rule inherits
/// the new username.
pub fn rules_for_patch(desired: &[QueryRule], new_username: Option<&str>) -> Vec<QueryRule> {
    desired
        .iter()
        .cloned()
        .map(|mut rule| {
            if let Some(username) = new_username {
                rule.username = username.to_string();
            }
            rule
        })
        .collect()
}

/// Desired rules paired with the index of the previous rule each id-less
/// entry stands for.
///
/// An id-less desired rule matches the first unclaimed previous rule with the
/// same body whose id the desired list does not name explicitly, and takes
/// over that rule's id.
fn match_previous(
    previous: &[QueryRule],
    desired: &[QueryRule],
) -> Vec<(QueryRule, Option<usize>)> {
    let named: HashSet<i64> = desired.iter().filter_map(|rule| rule.rule_id).collect();
    let mut claimed = HashSet::new();
    let mut matched = Vec::with_capacity(desired.len());

    for rule in desired {
        if rule.rule_id.is_some() {
            matched.push((rule.clone(), None));
            continue;
        }
        let source = previous.iter().enumerate().find(|(index, had)| {
            !claimed.contains(index)
                && had.rule_id.map_or(true, |id| !named.contains(&id))
                && had.same_body(rule)
        });
        match source {
            Some((index, had)) => {
                claimed.insert(index);
                matched.push((QueryRule { rule_id: had.rule_id, ..rule.clone() }, Some(index)));
            }
            None => matched.push((rule.clone(), None)),
        }
    }
    matched
}

/// Desired rules with ids filled in from unchanged `previous` rules.
///
/// Rules that are genuinely new keep `rule_id: None`.
pub fn resolve_rule_ids(previous: &[QueryRule], desired: &[QueryRule]) -> Vec<QueryRule> {
    match_previous(previous, desired).into_iter().map(|(rule, _)| rule).collect()
}

/// Rule-level diff keyed by rule id.
///
/// A rule whose body changed under the same id shows up in both lists; the
/// backend applies removals before additions. An id-less desired rule whose
/// body matches a previous rule is that rule, not an addition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryRuleDiff {
    pub removed: Vec<i64>,
    pub added: Vec<QueryRule>,
}

impl QueryRuleDiff {
    pub fn between(previous: &[QueryRule], desired: &[QueryRule]) -> Self {
        let matched = match_previous(previous, desired);
        let previous_by_id: HashMap<i64, &QueryRule> =
            previous.iter().filter_map(|rule| rule.rule_id.map(|id| (id, rule))).collect();
        let desired_by_id: HashMap<i64, &QueryRule> = matched
            .iter()
            .filter_map(|(rule, _)| rule.rule_id.map(|id| (id, rule)))
            .collect();

        let mut seen = HashSet::new();
        let removed = previous
            .iter()
            .filter_map(|rule| rule.rule_id)
            .filter(|id| seen.insert(*id))
            .filter(|id| match desired_by_id.get(id) {
                None => true,
                Some(wanted) => previous_by_id.get(id).is_some_and(|had| had != wanted),
            })
            .collect();

        let added = matched
            .iter()
            .filter(|(rule, source)| {
                source.is_none()
                    && match rule.rule_id {
                        None => true,
                        Some(id) => previous_by_id.get(&id).map_or(true, |had| *had != rule),
                    }
            })
            .map(|(rule, _)| rule.clone())
            .collect();

        Self { removed, added }
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Copy the non-empty halves into `request`.
    pub fn apply_to(&self, request: &mut ModifyInstanceRequest) {
        if !self.removed.is_empty() {
            request.remove_query_rules = Some(self.removed.clone());
        }
        if !self.added.is_empty() {
            request.add_query_rules = Some(self.added.clone());
        }
    }
}
