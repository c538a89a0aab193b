//! Desired-state fixtures mirroring a typical two-replica instance.

use proxyplane_core::InstanceSpec;
use proxyplane_domain::{Endpoint, QueryRule};

pub fn rule(id: i64, username: &str, digest: &str, hostgroup: i32) -> QueryRule {
    QueryRule {
        rule_id: Some(id),
        username: username.to_string(),
        active: 1,
        match_digest: digest.to_string(),
        destination_hostgroup: hostgroup,
        apply: 1,
        comment: "bar".to_string(),
    }
}

/// A rule the backend has not assigned an id to yet.
pub fn pending_rule(username: &str, digest: &str, hostgroup: i32) -> QueryRule {
    QueryRule { rule_id: None, ..rule(0, username, digest, hostgroup) }
}

/// Instance `foo`: master 1.2.3.4, two replicas, two rules, max instances 2.
pub fn foo_spec() -> InstanceSpec {
    InstanceSpec {
        instance_name: "foo".into(),
        username: "foo".into(),
        password: "bar".into(),
        master_instance: Endpoint::new("foo", "1.2.3.4"),
        read_replicas: vec![
            Endpoint::new("foo-reader-one", "1.2.3.5"),
            Endpoint::new("foo-reader-two", "1.2.3.6"),
        ],
        query_rules: vec![rule(1, "foo", "foo", 5), rule(2, "foo", "foo", 10)],
        enable_ssl: 0,
        max_instances: 2,
        ..Default::default()
    }
}
