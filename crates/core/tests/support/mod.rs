//! Shared test helpers for `proxyplane-core` integration tests.
//!
//! These helpers provide an in-memory backend and fixtures so the
//! reconciliation tests can focus on which calls were issued.

#![allow(dead_code)]

pub mod backend;
pub mod fixtures;
