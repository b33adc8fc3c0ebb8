//! Usage: OAuth2 helpers for service clients (grant selection, token exchange, token cache).

pub mod grant;
pub(crate) mod token_exchange;
pub mod token_store;
