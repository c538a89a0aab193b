//! HTTP transport for the management backend

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
