//! Proxy user types
//!
//! Users are managed implicitly through instances; these payloads back the
//! secondary `/users` endpoints.

use serde::{Deserialize, Serialize};

/// A ProxySQL frontend/backend user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProxyUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub active: i32,
    #[serde(default)]
    pub use_ssl: i32,
    #[serde(default)]
    pub default_hostgroup: i32,
    #[serde(default)]
    pub max_connections: i64,
}

/// Sparse patch for `PATCH /users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyUserRequest {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_hostgroup: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<i64>,
}

impl ModifyUserRequest {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
            active: None,
            default_hostgroup: None,
            max_connections: None,
        }
    }
}
