//! Request and response payloads for instance mutations

use serde::{Deserialize, Serialize};

use super::instance::{Endpoint, InstanceGroupMetadata, QueryRule};

/// Verb carried in every mutation body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Add,
    Remove,
    Modify,
}

/// Full creation payload for `POST /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddInstanceRequest {
    pub action: RequestAction,
    pub instance_name: String,
    pub username: String,
    pub password: String,
    pub master_instance: Endpoint,
    #[serde(default)]
    pub read_replicas: Vec<Endpoint>,
    #[serde(default)]
    pub query_rules: Vec<QueryRule>,
    pub instance_group_metadata: InstanceGroupMetadata,
    #[serde(default)]
    pub enable_ssl: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_data: Option<String>,
}

/// Backend confirmation of a successful add
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AddInstanceResponse {
    pub action: String,
    pub instance_name: String,
    pub username: String,
    pub password: String,
    pub query_rules: Vec<QueryRule>,
    pub read_hostgroup: i32,
    pub write_hostgroup: i32,
    pub ssl_enabled: i32,
    pub instance_group_metadata: InstanceGroupMetadata,
}

/// Body of `DELETE /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveInstanceRequest {
    pub action: RequestAction,
    pub instance_name: String,
    /// Not read by the backend today; sent so the contract can grow into it.
    pub username: String,
}

impl RemoveInstanceRequest {
    pub fn new(instance_name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            action: RequestAction::Remove,
            instance_name: instance_name.into(),
            username: username.into(),
        }
    }
}

/// Sparse patch for `PATCH /`.
///
/// Every `None` field is left out of the JSON body entirely and the backend
/// leaves that part of the record untouched. `Some(vec![])` is a real value:
/// an empty replacement list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyInstanceRequest {
    pub action: RequestAction,
    pub instance_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
    /// Complete replacement list, never appended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_replicas: Option<Vec<Endpoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_query_rules: Option<Vec<QueryRule>>,
    /// Rule ids to delete; the backend applies these before `add_query_rules`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_query_rules: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_group_metadata: Option<InstanceGroupMetadata>,
}

impl ModifyInstanceRequest {
    /// An empty patch for `instance_name`.
    pub fn new(instance_name: impl Into<String>) -> Self {
        Self {
            action: RequestAction::Modify,
            instance_name: instance_name.into(),
            new_username: None,
            new_password: None,
            read_replicas: None,
            add_query_rules: None,
            remove_query_rules: None,
            instance_group_metadata: None,
        }
    }

    /// True when no field would change backend state.
    pub fn is_empty(&self) -> bool {
        self.new_username.is_none()
            && self.new_password.is_none()
            && self.read_replicas.is_none()
            && self.add_query_rules.is_none()
            && self.remove_query_rules.is_none()
            && self.instance_group_metadata.is_none()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_modify_only_names_target() {
        let request = ModifyInstanceRequest::new("foo");
        assert!(request.is_empty());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"action": "modify", "instance_name": "foo"})
        );
    }

    #[test]
    fn test_zero_metadata_is_distinct_from_absent() {
        let mut request = ModifyInstanceRequest::new("foo");
        request.instance_group_metadata = Some(InstanceGroupMetadata::new("foo", 0));
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["instance_group_metadata"]["max_instances"], json!(0));
        assert!(!request.is_empty());
    }

    #[test]
    fn test_empty_replica_list_is_sent() {
        let mut request = ModifyInstanceRequest::new("foo");
        request.read_replicas = Some(Vec::new());
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["read_replicas"], json!([]));
    }

    #[test]
    fn test_add_response_defaults_missing_fields() {
        let response: AddInstanceResponse =
            serde_json::from_str(r#"{"action": "add", "instance_name": "foo"}"#).unwrap();
        assert_eq!(response.instance_name, "foo");
        assert!(response.query_rules.is_empty());
    }

    #[test]
    fn test_remove_request_shape() {
        let body = serde_json::to_value(RemoveInstanceRequest::new("foo", "bar")).unwrap();
        assert_eq!(body, json!({"action": "remove", "instance_name": "foo", "username": "bar"}));
    }
}
