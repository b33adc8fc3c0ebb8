//! Usage: Authenticated HTTP client for one named service (bearer auth, 401 retry, probe).

use super::client_config::ClientConfig;
use super::oauth::token_store::{Token, TokenStore};
use crate::shared::error::{AppError, AppResult, ErrorCode};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::time::Duration;

pub struct ApiClient {
    config: ClientConfig,
    http: reqwest::Client,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> AppResult<Self> {
        let grant = config.grant_strategy()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("mister-freeze/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::with_code(
                    ErrorCode::Config,
                    format!("service={} http client init failed: {e}", config.name),
                )
            })?;
        let tokens = TokenStore::new(config.name.clone(), grant, http.clone());

        Ok(Self {
            config,
            http,
            tokens,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn url_for(&self, path: &str) -> String {
        let base = self.config.endpoint.trim().trim_end_matches('/');
        let path = path.trim();
        if path.is_empty() {
            return base.to_string();
        }
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Authenticated GET of `test_path`; any failure is reported as a connection error.
    pub async fn test_connection(&self) -> AppResult<()> {
        let path = self.config.test_path.clone();
        let response = self.get(&path).await.map_err(|err| {
            AppError::with_code(
                ErrorCode::Connection,
                format!("service={} probe of {path} failed: {err}", self.name()),
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::with_code(
                ErrorCode::Connection,
                format!(
                    "service={} probe of {path} returned status={}",
                    self.name(),
                    status.as_u16()
                ),
            ));
        }

        tracing::info!(service = %self.name(), status = status.as_u16(), "connection probe succeeded");
        Ok(())
    }

    pub async fn get(&self, path: &str) -> AppResult<reqwest::Response> {
        self.send_authorized(Method::GET, path, None::<&()>).await
    }

    pub async fn post<B>(&self, path: &str, body: &B) -> AppResult<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        self.send_authorized(Method::POST, path, Some(body)).await
    }

    /// Sends with the cached token; on 401 forces one refresh and retries exactly once.
    async fn send_authorized<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> AppResult<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url_for(path);
        let token = self.tokens.get_valid().await?;
        let response = self.send_once(&method, &url, body, &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::info!(
            service = %self.name(),
            method = %method,
            path,
            "request unauthorized; refreshing token and retrying once"
        );
        drop(response);

        let refreshed = self.tokens.force_refresh(token.value()).await?;
        let retried = self.send_once(&method, &url, body, &refreshed).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::with_code(
                ErrorCode::Transport,
                format!(
                    "service={} {method} {path} still unauthorized after token refresh",
                    self.name()
                ),
            ));
        }
        Ok(retried)
    }

    async fn send_once<B>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&B>,
        token: &Token,
    ) -> AppResult<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(token.value());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let detail = if e.is_timeout() {
                format!("timed out after {}s", self.config.request_timeout_secs)
            } else {
                e.to_string()
            };
            AppError::with_code(
                ErrorCode::Transport,
                format!("service={} {method} {url} failed: {detail}", self.name()),
            )
            .with_source(e)
        })?;

        tracing::debug!(
            service = %self.name(),
            method = %method,
            url,
            status = response.status().as_u16(),
            "request completed"
        );
        Ok(response)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
