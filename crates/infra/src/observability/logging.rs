use std::time::Duration;

use proxyplane_domain::{ProxyPlaneError, Result};
use tracing::{info, warn};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;

/// Filter used when `RUST_LOG` is unset or unparsable
pub const DEFAULT_FILTER: &str = "info";

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`.
///
/// Safe to call more than once; only the first call installs anything.
///
/// # Errors
/// Returns `Config` when `default_filter` itself is not a valid directive.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::try_new(directive.trim())
            .or_else(|_| EnvFilter::try_new(default_filter)),
        _ => EnvFilter::try_new(default_filter),
    }
    .map_err(|e| ProxyPlaneError::Config(format!("Invalid log filter '{default_filter}': {e}")))?;

    // An already-installed global subscriber is not an error.
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
    Ok(())
}

/// Log the outcome of one backend call with structured fields.
///
/// `operation` must be a stable identifier (e.g. `"get_instance"`) and never
/// carry instance data or credentials.
#[inline]
pub fn log_api_call<T>(operation: &'static str, elapsed: Duration, result: &Result<T>) {
    let duration_ms = elapsed.as_millis() as u64;

    match result {
        Ok(_) => info!(operation, duration_ms, "api_call_success"),
        Err(err) => warn!(
            operation,
            duration_ms,
            error_type = err.label(),
            status = status_code(err),
            "api_call_failure"
        ),
    }
}

fn status_code(err: &ProxyPlaneError) -> u16 {
    match err {
        ProxyPlaneError::Status { status, .. } => *status,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        assert!(init_tracing(DEFAULT_FILTER).is_ok());
        assert!(init_tracing("proxyplane_infra=debug").is_ok());
    }

    #[test]
    fn test_status_code_only_for_status_errors() {
        assert_eq!(status_code(&ProxyPlaneError::Status { status: 404, body: String::new() }), 404);
        assert_eq!(status_code(&ProxyPlaneError::Network("down".into())), 0);
    }

    #[test]
    fn test_log_api_call_accepts_both_outcomes() {
        let ok: Result<()> = Ok(());
        let err: Result<()> = Err(ProxyPlaneError::Auth("expired".into()));
        log_api_call("list_instances", Duration::from_millis(3), &ok);
        log_api_call("list_instances", Duration::from_millis(3), &err);
    }
}
