//! Instance endpoints

use async_trait::async_trait;
use proxyplane_core::InstanceApi;
use proxyplane_domain::{
    AddInstanceRequest, AddInstanceResponse, Instance, ModifyInstanceRequest, ProxyPlaneError,
    QueryRule, RemoveInstanceRequest, Result,
};
use reqwest::Method;
use tracing::{debug, info, instrument};

use super::client::{timed, ApiClient};

impl ApiClient {
    /// `GET /databases?filter=true`
    ///
    /// An empty backend yields an empty vector, including when the body is
    /// JSON `null`.
    #[instrument(skip(self))]
    pub async fn list_instances(&self) -> Result<Vec<Instance>> {
        let instances: Option<Vec<Instance>> =
            timed("list_instances", self.get_json("/databases?filter=true")).await?;
        let instances = instances.unwrap_or_default();
        debug!(count = instances.len(), "instances listed");
        Ok(instances)
    }

    /// `GET /databases/{name}?filter=true`
    ///
    /// # Errors
    /// A missing instance is a `Status` error (404 from the backend), never
    /// an empty record.
    #[instrument(skip(self))]
    pub async fn get_instance(&self, instance_name: &str) -> Result<Instance> {
        let path = format!("/databases/{}?filter=true", urlencoding::encode(instance_name));
        timed("get_instance", self.get_json(&path)).await
    }

    /// `POST /` with the full creation payload
    #[instrument(skip(self, request), fields(instance = %request.instance_name))]
    pub async fn add_instance(&self, request: &AddInstanceRequest) -> Result<AddInstanceResponse> {
        let response: AddInstanceResponse =
            timed("add_instance", self.exchange_json(Method::POST, "/", request)).await?;
        info!(read_hostgroup = response.read_hostgroup, "instance added");
        Ok(response)
    }

    /// `DELETE /` with the target in the body
    #[instrument(skip(self, request), fields(instance = %request.instance_name))]
    pub async fn remove_instance(&self, request: &RemoveInstanceRequest) -> Result<()> {
        timed("remove_instance", self.send_json(Method::DELETE, "/", request)).await?;
        info!("instance removed");
        Ok(())
    }

    /// `PATCH /` with a sparse patch
    #[instrument(skip(self, request), fields(instance = %request.instance_name))]
    pub async fn modify_instance(&self, request: &ModifyInstanceRequest) -> Result<()> {
        timed("modify_instance", self.send_json(Method::PATCH, "/", request)).await?;
        info!(
            username = request.new_username.is_some(),
            password = request.new_password.is_some(),
            replicas = request.read_replicas.as_ref().map(Vec::len),
            rules_added = request.add_query_rules.as_ref().map(Vec::len),
            rules_removed = request.remove_query_rules.as_ref().map(Vec::len),
            metadata = request.instance_group_metadata.is_some(),
            "instance modified"
        );
        Ok(())
    }

    /// `PATCH /queryrules/{rule_id}`
    ///
    /// Rule state should be owned by the backend; prefer carrying rule
    /// changes in [`modify_instance`](Self::modify_instance).
    ///
    /// # Errors
    /// Returns `InvalidInput` without a network call when the rule has no id.
    #[instrument(skip(self, rule), fields(rule_id = ?rule.rule_id))]
    pub async fn modify_query_rule_by_id(&self, rule: &QueryRule) -> Result<()> {
        let rule_id = rule.rule_id.ok_or_else(|| {
            ProxyPlaneError::InvalidInput("query rule has no rule_id to address".into())
        })?;
        let path = format!("/queryrules/{rule_id}");
        timed("modify_query_rule_by_id", self.send_json(Method::PATCH, &path, rule)).await?;
        Ok(())
    }
}

#[async_trait]
impl InstanceApi for ApiClient {
    async fn list_instances(&self) -> Result<Vec<Instance>> {
        ApiClient::list_instances(self).await
    }

    async fn get_instance(&self, instance_name: &str) -> Result<Instance> {
        ApiClient::get_instance(self, instance_name).await
    }

    async fn add_instance(&self, request: &AddInstanceRequest) -> Result<AddInstanceResponse> {
        ApiClient::add_instance(self, request).await
    }

    async fn remove_instance(&self, request: &RemoveInstanceRequest) -> Result<()> {
        ApiClient::remove_instance(self, request).await
    }

    async fn modify_instance(&self, request: &ModifyInstanceRequest) -> Result<()> {
        ApiClient::modify_instance(self, request).await
    }

    async fn modify_query_rule_by_id(&self, rule: &QueryRule) -> Result<()> {
        ApiClient::modify_query_rule_by_id(self, rule).await
    }
}
