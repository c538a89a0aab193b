//! Typed client for the instance management backend
//!
//! Wraps [`HttpClient`] with JSON encoding, per-call logging and the
//! credential setup done at construction time.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use proxyplane_domain::{BearerSource, ClientConfig, ProxyPlaneError, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::auth::{resolve_bearer, IdentityToken, IdentityTokenProvider, MetadataServerProvider};
use crate::errors::{decode_error, encode_error};
use crate::http::HttpClient;
use crate::observability::log_api_call;

/// API client for one backend
pub struct ApiClient {
    http: HttpClient,
    bearer: Option<BearerSource>,
    identity: Option<Arc<dyn IdentityTokenProvider>>,
}

impl ApiClient {
    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Build a client from loaded configuration.
    ///
    /// A derived bearer is minted through the metadata server before this
    /// returns.
    ///
    /// # Errors
    /// Returns `Config` for incomplete settings and `Auth` when the identity
    /// token cannot be obtained.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        ApiClientBuilder::from_config(config).build().await
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Re-mint the proxy bearer for a derived source.
    ///
    /// No-op for explicit tokens and clients without a bearer.
    ///
    /// # Errors
    /// Returns the provider's error; the previous token stays in place.
    #[instrument(skip(self))]
    pub async fn refresh_credentials(&self) -> Result<()> {
        let (Some(source @ BearerSource::Derived { .. }), Some(identity)) =
            (&self.bearer, &self.identity)
        else {
            debug!("no derived bearer configured, nothing to refresh");
            return Ok(());
        };

        let token = resolve_bearer(source, identity.as_ref()).await?;
        self.http.set_bearer(Some(token.secret().to_string()));
        info!(expires_at = ?token.expires_at(), "proxy bearer refreshed");
        Ok(())
    }

    /// GET `path` and decode the body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let bytes = self.http.send(None, path, Method::GET).await?;
        decode(&bytes)
    }

    /// Send `body` as JSON, returning the raw response.
    pub(crate) async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>> {
        let payload = serde_json::to_vec(body).map_err(encode_error)?;
        self.http.send(Some(payload), path, method).await
    }

    /// Send `body` as JSON and decode the response.
    pub(crate) async fn exchange_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let bytes = self.send_json(method, path, body).await?;
        decode(&bytes)
    }

    pub(crate) async fn send_empty(&self, method: Method, path: &str) -> Result<Vec<u8>> {
        self.http.send(None, path, method).await
    }
}

/// Run one backend call, logging its outcome and duration.
pub(crate) async fn timed<T, F>(operation: &'static str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let started = Instant::now();
    let result = call.await;
    log_api_call(operation, started.elapsed(), &result);
    result
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(decode_error)
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    host: String,
    username: String,
    password: String,
    token: Option<String>,
    audience: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    identity: Option<Arc<dyn IdentityTokenProvider>>,
}

impl ApiClientBuilder {
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::default()
            .host(&config.host)
            .username(&config.username)
            .password(&config.password);

        match &config.bearer {
            Some(BearerSource::Explicit { token }) => builder = builder.token(token),
            Some(BearerSource::Derived { audience }) => builder = builder.audience(audience),
            None => {}
        }
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent);
        }
        builder
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Use an already-minted proxy bearer. Cannot be combined with
    /// [`audience`](Self::audience).
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Mint the proxy bearer for this audience. Cannot be combined with
    /// [`token`](Self::token).
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Override the metadata-server provider used for derived tokens.
    pub fn identity_provider(mut self, provider: Arc<dyn IdentityTokenProvider>) -> Self {
        self.identity = Some(provider);
        self
    }

    /// Validate settings, obtain the bearer and build the client.
    ///
    /// # Errors
    /// - `Config` for a missing host, user, password, audience or token, or
    ///   when both a token and an audience were given
    /// - `Auth` when a derived token cannot be minted
    pub async fn build(self) -> Result<ApiClient> {
        let bearer = match (self.token, self.audience) {
            (Some(_), Some(_)) => {
                return Err(ProxyPlaneError::Config(
                    "token and audience are mutually exclusive".into(),
                ))
            }
            (Some(token), None) => Some(BearerSource::Explicit { token }),
            (None, Some(audience)) => Some(BearerSource::Derived { audience }),
            (None, None) => None,
        };

        let mut config = ClientConfig::new(self.host, self.username, self.password);
        config.bearer = bearer.clone();
        config.validate()?;

        let mut identity = self.identity;
        let token = match &bearer {
            None => None,
            Some(BearerSource::Explicit { token }) => Some(IdentityToken::new(token.clone())),
            Some(source @ BearerSource::Derived { .. }) => {
                let provider: Arc<dyn IdentityTokenProvider> = match identity.take() {
                    Some(provider) => provider,
                    None => Arc::new(MetadataServerProvider::new()?),
                };
                let token = resolve_bearer(source, provider.as_ref()).await?;
                identity = Some(provider);
                Some(token)
            }
        };

        let mut http = HttpClient::builder()
            .base_url(config.host)
            .basic_auth(config.username, config.password);
        if let Some(token) = &token {
            http = http.bearer(token.secret());
        }
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        if let Some(agent) = self.user_agent {
            http = http.user_agent(agent);
        }
        let http = http.build()?;

        info!(
            base_url = %http.base_url(),
            bearer = bearer.as_ref().map(bearer_mode).unwrap_or("none"),
            "api client ready"
        );

        Ok(ApiClient { http, bearer, identity })
    }
}

fn bearer_mode(source: &BearerSource) -> &'static str {
    match source {
        BearerSource::Explicit { .. } => "explicit",
        BearerSource::Derived { .. } => "derived",
    }
}
