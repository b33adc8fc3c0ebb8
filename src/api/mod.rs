//! Usage: Multi-service API client layer (per-service OAuth, bearer transport, registry).

pub mod client;
pub mod client_config;
pub mod oauth;
pub mod registry;
