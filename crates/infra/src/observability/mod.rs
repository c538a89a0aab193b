//! Tracing bootstrap and structured API-call events

pub mod logging;

pub use logging::{init_tracing, log_api_call};
