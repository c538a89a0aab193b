use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use proxyplane_domain::{ProxyPlaneError, Result};
use reqwest::header::{CONTENT_TYPE, PROXY_AUTHORIZATION};
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// Single-attempt HTTP client bound to one backend.
///
/// Every request carries HTTP basic credentials. When a bearer token is set
/// it is sent as `Proxy-Authorization: Bearer <token>` for the
/// identity-aware proxy in front of the backend. Only status 200 counts as
/// success.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    base_url: String,
    username: String,
    password: String,
    bearer: Arc<RwLock<Option<String>>>,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the proxy bearer used by subsequent requests.
    pub fn set_bearer(&self, token: Option<String>) {
        let mut guard = match self.bearer.write() {
            Ok(guard) => guard,
            Err(poison_err) => {
                warn!("bearer lock poisoned, recovering");
                poison_err.into_inner()
            }
        };
        *guard = token;
    }

    pub fn has_bearer(&self) -> bool {
        self.bearer().is_some()
    }

    fn bearer(&self) -> Option<String> {
        match self.bearer.read() {
            Ok(guard) => guard.clone(),
            Err(poison_err) => {
                warn!("bearer lock poisoned, recovering");
                poison_err.into_inner().clone()
            }
        }
    }

    /// Send one request and return the raw response body.
    ///
    /// `path` is appended to the base URL as-is, so it carries its own
    /// leading `/` and any query string. `None` sends no body.
    ///
    /// # Errors
    /// - `Network` for connect, DNS and timeout failures
    /// - `Status` for any status other than 200, carrying the response text
    pub async fn send(&self, body: Option<Vec<u8>>, path: &str, method: Method) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .basic_auth(&self.username, Some(&self.password));

        if let Some(token) = self.bearer() {
            request = request.header(PROXY_AUTHORIZATION, format!("Bearer {token}"));
        }

        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        debug!(%method, %url, "sending HTTP request");

        let response = request.send().await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            ProxyPlaneError::from(InfraError::from(err))
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| ProxyPlaneError::from(InfraError::from(err)))?;
        debug!(%method, %url, %status, len = bytes.len(), "received HTTP response");

        if status != StatusCode::OK {
            return Err(ProxyPlaneError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(bytes.to_vec())
    }
}

/// Builder for [`HttpClient`].
#[derive(Default)]
pub struct HttpClientBuilder {
    base_url: String,
    username: String,
    password: String,
    bearer: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl fmt::Debug for HttpClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientBuilder")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl HttpClientBuilder {
    /// Backend root; a trailing `/` is dropped.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Whole-request timeout. Without one the reqwest default applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            ProxyPlaneError::from(infra)
        })?;

        Ok(HttpClient {
            client,
            base_url: self.base_url,
            username: self.username,
            password: self.password,
            bearer: Arc::new(RwLock::new(self.bearer)),
        })
    }
}
