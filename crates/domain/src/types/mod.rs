//! Domain types and wire payloads

pub mod instance;
pub mod requests;
pub mod user;

pub use instance::{Endpoint, Instance, InstanceGroupMetadata, QueryRule};
pub use requests::{
    AddInstanceRequest, AddInstanceResponse, ModifyInstanceRequest, RemoveInstanceRequest,
    RequestAction,
};
pub use user::{ModifyUserRequest, ProxyUser};
