//! Usage: Per-service client configuration (schema + grant-specific validation).

use super::oauth::grant::GrantStrategy;
use crate::shared::error::{AppError, AppResult, ErrorCode};
use crate::shared::security::{mask_optional, mask_token};
use reqwest::Url;
use serde::Deserialize;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 10 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    Password,
    ClientCredentials,
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Registry key; filled from the settings section rather than the file body.
    #[serde(skip)]
    pub name: String,
    pub auth_type: AuthType,
    pub token_url: String,
    pub endpoint: String,
    pub test_path: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn config_error(service: &str, detail: impl std::fmt::Display) -> AppError {
    AppError::with_code(ErrorCode::Config, format!("service={service} {detail}"))
}

fn required<'a>(service: &str, field: &str, value: &'a str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(config_error(service, format!("missing {field}")));
    }
    Ok(trimmed)
}

fn required_opt<'a>(service: &str, field: &str, value: Option<&'a str>) -> AppResult<&'a str> {
    required(service, field, value.unwrap_or_default())
}

fn http_url(service: &str, field: &str, value: &str) -> AppResult<Url> {
    let raw = required(service, field, value)?;
    let url = Url::parse(raw).map_err(|e| config_error(service, format!("invalid {field}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(config_error(
            service,
            format!("{field} must use http or https (got {})", url.scheme()),
        ));
    }
    Ok(url)
}

impl ClientConfig {
    /// Shared service fields; pick the grant with `password_grant` or `client_credentials_grant`.
    pub fn new(
        name: impl Into<String>,
        token_url: impl Into<String>,
        endpoint: impl Into<String>,
        test_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            auth_type: AuthType::ClientCredentials,
            token_url: token_url.into(),
            endpoint: endpoint.into(),
            test_path: test_path.into(),
            client_id: String::new(),
            client_secret: String::new(),
            scope: None,
            username: None,
            password: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = client_id.into();
        self.client_secret = client_secret.into();
        self
    }

    pub fn password_grant(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth_type = AuthType::Password;
        self.scope = None;
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn client_credentials_grant(mut self, scope: impl Into<String>) -> Self {
        self.auth_type = AuthType::ClientCredentials;
        self.scope = Some(scope.into());
        self.username = None;
        self.password = None;
        self
    }

    /// Checks every field the selected grant needs and builds that grant.
    pub fn grant_strategy(&self) -> AppResult<GrantStrategy> {
        let service = required("<unnamed>", "name", &self.name)?;
        let token_url = http_url(service, "token_url", &self.token_url)?;
        http_url(service, "endpoint", &self.endpoint)?;
        required(service, "test_path", &self.test_path)?;
        let client_id = required(service, "client_id", &self.client_id)?;
        let client_secret = required(service, "client_secret", &self.client_secret)?;

        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(config_error(
                service,
                format!(
                    "request_timeout_secs must be within 1..={MAX_REQUEST_TIMEOUT_SECS} (got {})",
                    self.request_timeout_secs
                ),
            ));
        }

        Ok(match self.auth_type {
            AuthType::Password => GrantStrategy::password(
                token_url.as_str(),
                client_id,
                client_secret,
                required_opt(service, "username", self.username.as_deref())?,
                required_opt(service, "password", self.password.as_deref())?,
            ),
            AuthType::ClientCredentials => GrantStrategy::client_credentials(
                token_url.as_str(),
                client_id,
                client_secret,
                required_opt(service, "scope", self.scope.as_deref())?,
            ),
        })
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("name", &self.name)
            .field("auth_type", &self.auth_type)
            .field("token_url", &self.token_url)
            .field("endpoint", &self.endpoint)
            .field("test_path", &self.test_path)
            .field("client_id", &self.client_id)
            .field("client_secret", &mask_token(&self.client_secret))
            .field("scope", &self.scope)
            .field("username", &self.username)
            .field("password", &mask_optional(self.password.as_deref()))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
