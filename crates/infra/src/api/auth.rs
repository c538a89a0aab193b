//! Identity tokens for the identity-aware proxy
//!
//! The backend sits behind a proxy that wants an OIDC identity token in
//! `Proxy-Authorization`. A token is either handed in by the caller or minted
//! for an audience (the proxy's OAuth client id) by the platform metadata
//! server.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use proxyplane_domain::{BearerSource, ProxyPlaneError, Result};
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Environment variable overriding the metadata server host
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";

const DEFAULT_METADATA_URL: &str = "http://metadata.google.internal";
const IDENTITY_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/identity";

/// A bearer identity token.
///
/// The raw value never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl IdentityToken {
    /// Wrap a raw token, reading the expiry from the `exp` claim when the
    /// token is a JWT.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let expires_at = jwt_expiry(&value);
        Self { value, expires_at }
    }

    pub fn secret(&self) -> &str {
        &self.value
    }

    /// `None` when the token is opaque.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Opaque tokens never report expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

/// Trait for minting identity tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait IdentityTokenProvider: Send + Sync {
    /// Mint a token for `audience`. One attempt, no retry.
    async fn identity_token(&self, audience: &str) -> Result<IdentityToken>;
}

/// Identity tokens from the compute metadata server.
pub struct MetadataServerProvider {
    client: ReqwestClient,
    base_url: String,
}

impl MetadataServerProvider {
    /// Provider for the metadata server of the current machine.
    ///
    /// Honours `GCE_METADATA_HOST` (a bare host, optionally with port).
    ///
    /// # Errors
    /// Returns `Config` if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let base_url = match std::env::var(METADATA_HOST_ENV) {
            Ok(host) if !host.trim().is_empty() => format!("http://{}", host.trim()),
            _ => DEFAULT_METADATA_URL.to_string(),
        };
        Self::with_base_url(base_url)
    }

    /// Provider pointed at an explicit metadata server root.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = ReqwestClient::builder()
            .no_proxy()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ProxyPlaneError::Config(format!("Failed to build metadata client: {e}")))?;

        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl IdentityTokenProvider for MetadataServerProvider {
    #[instrument(skip(self))]
    async fn identity_token(&self, audience: &str) -> Result<IdentityToken> {
        let url = format!("{}{}", self.base_url, IDENTITY_PATH);
        debug!(url = %url, "requesting identity token");

        let auth_error = |detail: String| {
            warn!(error = %detail, "identity token request failed");
            ProxyPlaneError::Auth(format!(
                "failed to create token from audience {audience}, error: {detail}"
            ))
        };

        let response = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .query(&[("audience", audience), ("format", "full")])
            .send()
            .await
            .map_err(|e| auth_error(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| auth_error(e.to_string()))?;
        if status != StatusCode::OK {
            return Err(auth_error(format!("metadata server returned {status}: {body}")));
        }

        let token = body.trim();
        if token.is_empty() {
            return Err(auth_error("metadata server returned an empty token".into()));
        }

        info!("identity token obtained");
        Ok(IdentityToken::new(token))
    }
}

/// Turn a configured bearer source into a token.
///
/// Explicit tokens are used as-is; derived ones go through `provider`.
///
/// # Errors
/// Returns `Config` for an empty token or audience, and the provider's
/// `Auth` error when minting fails.
pub async fn resolve_bearer(
    source: &BearerSource,
    provider: &dyn IdentityTokenProvider,
) -> Result<IdentityToken> {
    match source {
        BearerSource::Explicit { token } => {
            if token.trim().is_empty() {
                return Err(ProxyPlaneError::Config("no token found".into()));
            }
            Ok(IdentityToken::new(token.clone()))
        }
        BearerSource::Derived { audience } => {
            if audience.trim().is_empty() {
                return Err(ProxyPlaneError::Config("no audience found".into()));
            }
            provider.identity_token(audience).await
        }
    }
}
