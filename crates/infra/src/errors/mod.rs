//! Conversions from third-party errors into `ProxyPlaneError`

mod conversions;

pub use conversions::{decode_error, encode_error, InfraError};
