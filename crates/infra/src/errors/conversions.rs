//! Conversions from external infrastructure errors into domain errors.

use proxyplane_domain::ProxyPlaneError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ProxyPlaneError);

impl From<InfraError> for ProxyPlaneError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ProxyPlaneError> for InfraError {
    fn from(value: ProxyPlaneError) -> Self {
        InfraError(value)
    }
}

trait IntoProxyPlaneError {
    fn into_proxyplane(self) -> ProxyPlaneError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ProxyPlaneError */
/* -------------------------------------------------------------------------- */

impl IntoProxyPlaneError for HttpError {
    fn into_proxyplane(self) -> ProxyPlaneError {
        if self.is_builder() {
            return ProxyPlaneError::Config(format!("invalid request: {self}"));
        }

        if self.is_timeout() {
            return ProxyPlaneError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return ProxyPlaneError::Network(format!("HTTP connection failure: {self}"));
        }

        if let Some(status) = self.status() {
            return ProxyPlaneError::Status {
                status: status.as_u16(),
                body: status.canonical_reason().unwrap_or("unknown status").to_string(),
            };
        }

        if self.is_decode() {
            return ProxyPlaneError::Deserialization(self.to_string());
        }

        ProxyPlaneError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_proxyplane())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → ProxyPlaneError */
/* -------------------------------------------------------------------------- */

// Outbound encodes go through `encode_error` instead.
impl IntoProxyPlaneError for JsonError {
    fn into_proxyplane(self) -> ProxyPlaneError {
        ProxyPlaneError::Deserialization(format!(
            "{} at line {} column {}",
            self,
            self.line(),
            self.column()
        ))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_proxyplane())
    }
}

/// Map a failed outbound encode.
pub fn encode_error(err: JsonError) -> ProxyPlaneError {
    ProxyPlaneError::Serialization(err.to_string())
}

/// Map a failed inbound decode.
pub fn decode_error(err: JsonError) -> ProxyPlaneError {
    InfraError::from(err).into()
}

/* -------------------------------------------------------------------------- */
/* toml::de::Error → ProxyPlaneError */
/* -------------------------------------------------------------------------- */

impl IntoProxyPlaneError for TomlError {
    fn into_proxyplane(self) -> ProxyPlaneError {
        ProxyPlaneError::Config(format!("Invalid TOML format: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_proxyplane())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
