//! Configuration loader
//!
//! Loads [`ClientConfig`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PROXYPLANE_HOST`: Backend base URL
//! - `PROXYPLANE_USERNAME`: Basic-auth user
//! - `PROXYPLANE_PASSWORD`: Basic-auth password
//! - `PROXYPLANE_CLIENT_ID`: Audience for a derived proxy token (optional)
//! - `PROXYPLANE_TOKEN`: Pre-minted proxy token (optional, excludes
//!   `PROXYPLANE_CLIENT_ID`)
//! - `PROXYPLANE_TIMEOUT_SECS`: Request timeout in seconds (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./proxyplane.json` or `./proxyplane.toml` (current working directory)
//! 2. `../proxyplane.json` or `../proxyplane.toml` (parent directory)
//! 3. Relative to executable location

use std::path::{Path, PathBuf};

use proxyplane_domain::{BearerSource, ClientConfig, ProxyPlaneError, Result};

use crate::errors::InfraError;

pub const HOST_ENV: &str = "PROXYPLANE_HOST";
pub const USERNAME_ENV: &str = "PROXYPLANE_USERNAME";
pub const PASSWORD_ENV: &str = "PROXYPLANE_PASSWORD";
pub const CLIENT_ID_ENV: &str = "PROXYPLANE_CLIENT_ID";
pub const TOKEN_ENV: &str = "PROXYPLANE_TOKEN";
pub const TIMEOUT_ENV: &str = "PROXYPLANE_TIMEOUT_SECS";

const FILE_STEMS: [&str; 2] = ["proxyplane.json", "proxyplane.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ProxyPlaneError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `ProxyPlaneError::Config` if a required variable is missing, the
/// timeout is not a number, or both a token and a client id are set.
pub fn load_from_env() -> Result<ClientConfig> {
    let host = env_var(HOST_ENV)?;
    let username = env_var(USERNAME_ENV)?;
    let password = env_var(PASSWORD_ENV)?;

    let bearer = match (optional_env(TOKEN_ENV), optional_env(CLIENT_ID_ENV)) {
        (Some(_), Some(_)) => {
            return Err(ProxyPlaneError::Config(format!(
                "{TOKEN_ENV} and {CLIENT_ID_ENV} are mutually exclusive"
            )))
        }
        (Some(token), None) => Some(BearerSource::Explicit { token }),
        (None, Some(audience)) => Some(BearerSource::Derived { audience }),
        (None, None) => None,
    };

    let timeout_secs = optional_env(TIMEOUT_ENV)
        .map(|s| {
            s.parse::<u64>()
                .map_err(|e| ProxyPlaneError::Config(format!("Invalid timeout: {}", e)))
        })
        .transpose()?;

    let config = ClientConfig {
        bearer,
        timeout_secs,
        ..ClientConfig::new(host, username, password)
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ProxyPlaneError::Config` if the file is missing, unreadable,
/// malformed, or describes an incomplete configuration.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ProxyPlaneError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ProxyPlaneError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ProxyPlaneError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ProxyPlaneError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ProxyPlaneError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
        candidates.extend(candidates_in(&cwd.join("..")));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    FILE_STEMS.iter().map(move |name| dir.join(name))
}

/// Get required environment variable
///
/// # Errors
/// Returns `ProxyPlaneError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        ProxyPlaneError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Optional variable; empty counts as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
