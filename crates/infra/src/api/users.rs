//! User and TLS-material endpoints
//!
//! Secondary affordances: users and certificates follow the instance
//! lifecycle on the backend, so nothing in the reconciler calls these.

use std::collections::HashMap;

use proxyplane_domain::{ModifyUserRequest, ProxyUser, Result};
use reqwest::Method;
use tracing::instrument;

use super::client::{timed, ApiClient};

impl ApiClient {
    /// `POST /users`
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn create_user(&self, user: &ProxyUser) -> Result<()> {
        timed("create_user", self.send_json(Method::POST, "/users", user)).await?;
        Ok(())
    }

    /// `GET /users/{name}`
    #[instrument(skip(self))]
    pub async fn get_user(&self, username: &str) -> Result<ProxyUser> {
        let path = format!("/users/{}", urlencoding::encode(username));
        timed("get_user", self.get_json(&path)).await
    }

    /// `PATCH /users`
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn modify_user(&self, request: &ModifyUserRequest) -> Result<()> {
        timed("modify_user", self.send_json(Method::PATCH, "/users", request)).await?;
        Ok(())
    }

    /// `DELETE /users/{name}`
    #[instrument(skip(self))]
    pub async fn delete_user(&self, username: &str) -> Result<()> {
        let path = format!("/users/{}", urlencoding::encode(username));
        timed("delete_user", self.send_empty(Method::DELETE, &path)).await?;
        Ok(())
    }

    /// `PATCH /key/{group}` with body `{"key": ...}`
    #[instrument(skip(self, key_data))]
    pub async fn update_key(&self, key_data: &str, instance_group: &str) -> Result<()> {
        let path = format!("/key/{}", urlencoding::encode(instance_group));
        let body = HashMap::from([("key", key_data)]);
        timed("update_key", self.send_json(Method::PATCH, &path, &body)).await?;
        Ok(())
    }

    /// `PATCH /cert/{group}` with body `{"cert": ...}`
    #[instrument(skip(self, cert_data))]
    pub async fn update_cert(&self, cert_data: &str, instance_group: &str) -> Result<()> {
        let path = format!("/cert/{}", urlencoding::encode(instance_group));
        let body = HashMap::from([("cert", cert_data)]);
        timed("update_cert", self.send_json(Method::PATCH, &path, &body)).await?;
        Ok(())
    }
}
