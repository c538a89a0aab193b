//! Shared helpers for `proxyplane-infra` integration tests.
//!
//! [`FakeBackend`] is an in-memory stand-in for the management service,
//! created per test and mounted on a wiremock server behind a basic-auth
//! matcher. Requests with the wrong credentials fall through to a 401.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use proxyplane_domain::{
    AddInstanceRequest, AddInstanceResponse, Endpoint, Instance, InstanceGroupMetadata,
    ModifyInstanceRequest, QueryRule, RemoveInstanceRequest, RequestAction,
};
use proxyplane_infra::ApiClient;
use serde::de::DeserializeOwned;
use wiremock::matchers::{any, basic_auth};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const USERNAME: &str = "foo";
pub const PASSWORD: &str = "bar";

const READ_HOSTGROUP: i32 = 10;
const WRITE_HOSTGROUP: i32 = 5;

/// In-memory backend store
#[derive(Clone, Default)]
pub struct FakeBackend {
    instances: Arc<Mutex<Vec<Instance>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a server with this backend mounted behind `foo` / `bar`.
    pub async fn start(&self) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(basic_auth(USERNAME, PASSWORD))
            .respond_with(self.clone())
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .with_priority(10)
            .mount(&server)
            .await;
        server
    }

    pub fn len(&self) -> usize {
        self.instances.lock().unwrap().len()
    }

    pub fn stored(&self, name: &str) -> Option<Instance> {
        self.instances.lock().unwrap().iter().find(|i| i.instance_name == name).cloned()
    }

    fn handle(&self, request: &Request) -> ResponseTemplate {
        let path = request.url.path().to_string();
        match (request.method.as_str(), path.as_str()) {
            ("GET", "/databases") => {
                ResponseTemplate::new(200).set_body_json(&*self.instances.lock().unwrap())
            }
            ("GET", p) if p.starts_with("/databases/") => {
                let name = decode_segment(&p["/databases/".len()..]);
                match self.stored(&name) {
                    Some(instance) => ResponseTemplate::new(200).set_body_json(instance),
                    None => not_found(&name),
                }
            }
            ("POST", "/") => match parse::<AddInstanceRequest>(request) {
                Ok(add) => self.add(add),
                Err(resp) => resp,
            },
            ("DELETE", "/") => match parse::<RemoveInstanceRequest>(request) {
                Ok(remove) => self.remove(&remove),
                Err(resp) => resp,
            },
            ("PATCH", "/") => match parse::<ModifyInstanceRequest>(request) {
                Ok(modify) => self.modify(&modify),
                Err(resp) => resp,
            },
            ("PATCH", p) if p.starts_with("/queryrules/") => {
                match (p["/queryrules/".len()..].parse::<i64>(), parse::<QueryRule>(request)) {
                    (Ok(id), Ok(rule)) => self.patch_rule(id, rule),
                    (Err(_), _) => ResponseTemplate::new(400).set_body_string("bad rule id"),
                    (_, Err(resp)) => resp,
                }
            }
            _ => ResponseTemplate::new(404).set_body_string("no such route"),
        }
    }

    fn add(&self, add: AddInstanceRequest) -> ResponseTemplate {
        if add.action != RequestAction::Add {
            return ResponseTemplate::new(400).set_body_string("action must be add");
        }
        let mut instances = self.instances.lock().unwrap();
        if instances.iter().any(|i| i.instance_name == add.instance_name) {
            return ResponseTemplate::new(409).set_body_string("instance already exists");
        }

        let mut query_rules = Vec::new();
        for rule in add.query_rules {
            assign_rule(&mut query_rules, rule);
        }
        let instance = Instance {
            instance_name: add.instance_name.clone(),
            username: add.username.clone(),
            password: add.password.clone(),
            master_instance: add.master_instance,
            read_replicas: add.read_replicas,
            query_rules: query_rules.clone(),
            read_hostgroup: READ_HOSTGROUP,
            write_hostgroup: WRITE_HOSTGROUP,
            use_ssl: add.enable_ssl,
            instance_group_metadata: add.instance_group_metadata.clone(),
        };
        instances.push(instance);

        ResponseTemplate::new(200).set_body_json(AddInstanceResponse {
            action: "add".into(),
            instance_name: add.instance_name,
            username: add.username,
            password: add.password,
            query_rules,
            read_hostgroup: READ_HOSTGROUP,
            write_hostgroup: WRITE_HOSTGROUP,
            ssl_enabled: add.enable_ssl,
            instance_group_metadata: add.instance_group_metadata,
        })
    }

    fn remove(&self, remove: &RemoveInstanceRequest) -> ResponseTemplate {
        let mut instances = self.instances.lock().unwrap();
        let before = instances.len();
        instances.retain(|i| i.instance_name != remove.instance_name);
        if instances.len() == before {
            return not_found(&remove.instance_name);
        }
        ResponseTemplate::new(200)
    }

    fn modify(&self, modify: &ModifyInstanceRequest) -> ResponseTemplate {
        let mut instances = self.instances.lock().unwrap();
        let Some(instance) = instances.iter_mut().find(|i| i.instance_name == modify.instance_name)
        else {
            return not_found(&modify.instance_name);
        };

        if let Some(username) = &modify.new_username {
            instance.username = username.clone();
        }
        if let Some(password) = &modify.new_password {
            instance.password = password.clone();
        }
        if let Some(replicas) = &modify.read_replicas {
            instance.read_replicas = replicas.clone();
        }
        // removals first, then additions
        if let Some(ids) = &modify.remove_query_rules {
            instance.query_rules.retain(|r| !r.rule_id.is_some_and(|id| ids.contains(&id)));
        }
        if let Some(rules) = &modify.add_query_rules {
            for rule in rules {
                assign_rule(&mut instance.query_rules, rule.clone());
            }
        }
        if let Some(metadata) = &modify.instance_group_metadata {
            instance.instance_group_metadata = metadata.clone();
        }
        ResponseTemplate::new(200)
    }

    fn patch_rule(&self, id: i64, rule: QueryRule) -> ResponseTemplate {
        let mut instances = self.instances.lock().unwrap();
        let existing = instances
            .iter_mut()
            .flat_map(|i| i.query_rules.iter_mut())
            .find(|r| r.rule_id == Some(id));
        match existing {
            Some(existing) => {
                *existing = QueryRule { rule_id: Some(id), ..rule };
                ResponseTemplate::new(200)
            }
            None => ResponseTemplate::new(404).set_body_string(format!("rule {id} not found")),
        }
    }
}

impl Respond for FakeBackend {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.handle(request)
    }
}

fn assign_rule(rules: &mut Vec<QueryRule>, mut rule: QueryRule) {
    if rule.rule_id.is_none() {
        let next = rules.iter().filter_map(|r| r.rule_id).max().unwrap_or(0) + 1;
        rule.rule_id = Some(next);
    }
    rules.push(rule);
}

fn parse<T: DeserializeOwned>(request: &Request) -> Result<T, ResponseTemplate> {
    serde_json::from_slice(&request.body)
        .map_err(|e| ResponseTemplate::new(400).set_body_string(format!("bad request body: {e}")))
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment).map(|s| s.into_owned()).unwrap_or_else(|_| segment.to_string())
}

fn not_found(name: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_string(format!("instance {name} not found"))
}

/// Client against `server` with the given credentials and no bearer.
pub async fn client_for(server: &MockServer, username: &str, password: &str) -> ApiClient {
    ApiClient::builder()
        .host(server.uri())
        .username(username)
        .password(password)
        .build()
        .await
        .expect("api client should build")
}

pub fn rule(id: i64, digest: &str, hostgroup: i32) -> QueryRule {
    QueryRule {
        rule_id: Some(id),
        username: USERNAME.into(),
        active: 1,
        match_digest: digest.into(),
        destination_hostgroup: hostgroup,
        apply: 1,
        comment: "bar".into(),
    }
}

/// Instance `foo`: master 1.2.3.4, two replicas, two rules, max instances 2.
pub fn foo_add_request() -> AddInstanceRequest {
    AddInstanceRequest {
        action: RequestAction::Add,
        instance_name: "foo".into(),
        username: USERNAME.into(),
        password: PASSWORD.into(),
        master_instance: Endpoint::new("foo", "1.2.3.4"),
        read_replicas: vec![
            Endpoint::new("foo-reader-one", "1.2.3.5"),
            Endpoint::new("foo-reader-two", "1.2.3.6"),
        ],
        query_rules: vec![rule(1, "foo", 5), rule(2, "foo", 10)],
        instance_group_metadata: InstanceGroupMetadata::new("foo", 2),
        enable_ssl: 0,
        key_data: None,
        cert_data: None,
        ca_data: None,
    }
}
