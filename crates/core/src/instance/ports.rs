//! Port interface for the instance management backend
//!
//! The reconciler only ever talks to the backend through this trait; the
//! HTTP implementation lives in `proxyplane-infra`.

use async_trait::async_trait;
use proxyplane_domain::{
    AddInstanceRequest, AddInstanceResponse, Instance, ModifyInstanceRequest, QueryRule,
    RemoveInstanceRequest, Result,
};

/// Typed operations against the backend, one round trip each
#[async_trait]
pub trait InstanceApi: Send + Sync {
    /// List all instances. An empty backend yields an empty vector.
    async fn list_instances(&self) -> Result<Vec<Instance>>;

    /// Fetch one instance by name. A missing instance is an error.
    async fn get_instance(&self, instance_name: &str) -> Result<Instance>;

    /// Create an instance from a full payload
    async fn add_instance(&self, request: &AddInstanceRequest) -> Result<AddInstanceResponse>;

    /// Delete an instance
    async fn remove_instance(&self, request: &RemoveInstanceRequest) -> Result<()>;

    /// Apply a sparse patch; `None` fields are left untouched
    async fn modify_instance(&self, request: &ModifyInstanceRequest) -> Result<()>;

    /// Patch a single rule in place.
    ///
    /// Rule state should be owned by the backend; prefer carrying rule
    /// changes in [`InstanceApi::modify_instance`].
    async fn modify_query_rule_by_id(&self, rule: &QueryRule) -> Result<()>;
}
