//! Usage: TOML settings file (schema + read helpers) for both services and the collector.

use crate::api::client_config::ClientConfig;
use crate::domain::collector::CollectorSettings;
use crate::shared::error::{AppError, AppResult, ErrorCode};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "./config.toml";
/// Registry name of the listing (campus API) client.
pub const LISTING_SERVICE: &str = "42-v2";
/// Registry name of the freeze service client.
pub const FREEZE_SERVICE: &str = "42-freeze";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceSettings {
    pub listing: ClientConfig,
    pub freeze: ClientConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub services: ServiceSettings,
    #[serde(default)]
    pub collector: CollectorSettings,
}

impl Settings {
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_code(
                ErrorCode::Config,
                format!("failed to read settings {}: {e}", path.display()),
            )
        })?;
        let settings = Self::parse(&raw).map_err(|err| {
            AppError::with_code(
                ErrorCode::Config,
                format!("{}: {}", path.display(), err.message()),
            )
        })?;
        tracing::info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    pub fn parse(raw: &str) -> AppResult<Self> {
        let mut settings: Settings = toml::from_str(raw).map_err(|e| {
            AppError::with_code(ErrorCode::Config, format!("invalid settings toml: {e}"))
        })?;
        settings.services.listing.name = LISTING_SERVICE.to_string();
        settings.services.freeze.name = FREEZE_SERVICE.to_string();
        settings.collector.validate()?;
        Ok(settings)
    }

    /// Client configs in registration order.
    pub fn clients(&self) -> [&ClientConfig; 2] {
        [&self.services.listing, &self.services.freeze]
    }
}
