//! Client configuration

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ProxyPlaneError, Result};

/// Where the proxy-authorization bearer comes from.
///
/// The backend sits behind an identity-aware proxy. Either the caller already
/// holds a minted token, or one is derived from an audience through the
/// platform identity mechanism. Exactly one of the two can be configured.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BearerSource {
    /// Pre-minted token, sent as-is
    Explicit { token: String },
    /// Token derived from the audience (OAuth client id of the proxy)
    Derived { audience: String },
}

impl fmt::Debug for BearerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit { .. } => f.debug_struct("Explicit").field("token", &"<redacted>").finish(),
            Self::Derived { audience } => {
                f.debug_struct("Derived").field("audience", audience).finish()
            }
        }
    }
}

/// Connection settings for the management backend
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL, e.g. `https://proxysql-admin.internal`
    pub host: String,
    /// HTTP basic-auth user
    pub username: String,
    /// HTTP basic-auth password
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub bearer: Option<BearerSource>,
    /// Request timeout; `None` leaves the HTTP stack default in place
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ClientConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            bearer: None,
            timeout_secs: None,
            user_agent: None,
        }
    }

    pub fn with_bearer(mut self, bearer: BearerSource) -> Self {
        self.bearer = Some(bearer);
        self
    }

    /// Reject incomplete settings before anything touches the network.
    ///
    /// # Errors
    /// Returns `ProxyPlaneError::Config` naming the first missing value.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ProxyPlaneError::Config("no host found".into()));
        }
        if self.username.is_empty() {
            return Err(ProxyPlaneError::Config("no user found".into()));
        }
        if self.password.is_empty() {
            return Err(ProxyPlaneError::Config("no pass found".into()));
        }
        match &self.bearer {
            Some(BearerSource::Derived { audience }) if audience.is_empty() => {
                Err(ProxyPlaneError::Config("no audience found".into()))
            }
            Some(BearerSource::Explicit { token }) if token.is_empty() => {
                Err(ProxyPlaneError::Config("no token found".into()))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("bearer", &self.bearer)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
