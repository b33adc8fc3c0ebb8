//! Usage: ClientRegistry - named service clients, built and probed once at startup.
//!
//! The registry is an ordinary value owned by the caller and passed by reference; lookups
//! never re-probe or re-authenticate since all auth state lives inside each `ApiClient`.

use super::client::ApiClient;
use super::client_config::ClientConfig;
use crate::shared::error::{AppError, AppResult, ErrorCode};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ClientRegistry {
    by_name: HashMap<String, ApiClient>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs the client, probes it, and only then makes it available under `name`.
    pub async fn register(&mut self, name: &str, mut config: ClientConfig) -> AppResult<&ApiClient> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::with_code(
                ErrorCode::Config,
                "client registration requires a non-empty name",
            ));
        }
        if self.by_name.contains_key(name) {
            return Err(AppError::with_code(
                ErrorCode::Config,
                format!("service={name} is already registered"),
            ));
        }

        config.name = name.to_string();
        let client = ApiClient::new(config)?;
        client.test_connection().await?;
        tracing::info!(service = name, "client registered");

        Ok(self.by_name.entry(name.to_string()).or_insert(client))
    }

    /// Looks up a registered client. A miss means startup skipped a registration.
    pub fn get(&self, name: &str) -> AppResult<&ApiClient> {
        self.by_name.get(name).ok_or_else(|| {
            AppError::with_code(
                ErrorCode::Lookup,
                format!("service={name} was never registered"),
            )
        })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
