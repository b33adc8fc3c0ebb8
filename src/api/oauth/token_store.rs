//! Usage: Per-client bearer token cache with single-flight refresh.
//!
//! The cached slot sits behind an async mutex that is held across the grant exchange, so
//! concurrent callers that find the token stale queue up behind the one refresh in flight.
//! Each caller notes the refresh generation before queueing; when the generation moved while
//! it waited, it takes that refresh's outcome (token or error) instead of exchanging again.

use super::grant::GrantStrategy;
use crate::shared::error::AppResult;
use crate::shared::security::mask_token;
use crate::shared::time::now_unix_seconds;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Lifetime assumed when the token endpoint does not report `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 300;
/// Subtracted from reported lifetimes so a token is renewed before the server rejects it.
/// Capped at half the lifetime, so a fresh token always stays usable for a while.
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 30;

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    expires_at: i64,
}

impl Token {
    pub fn new(value: impl Into<String>, expires_at: i64) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Builds a token from a reported lifetime, applying the default and the safety margin.
    pub fn from_lifetime(value: impl Into<String>, expires_in: Option<i64>, now_unix: i64) -> Self {
        let lifetime = expires_in
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let margin = EXPIRY_SAFETY_MARGIN_SECS.min(lifetime / 2);
        Self::new(value, now_unix.saturating_add(lifetime - margin))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn is_usable(&self, now_unix: i64) -> bool {
        !self.value.trim().is_empty() && !should_refresh_now(self.expires_at, now_unix)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &mask_token(&self.value))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

pub(crate) fn should_refresh_now(expires_at: i64, now_unix: i64) -> bool {
    expires_at <= now_unix
}

#[derive(Default)]
struct Slot {
    token: Option<Token>,
    /// Outcome of the most recent exchange, handed to callers that queued behind it.
    last: Option<AppResult<Token>>,
}

pub struct TokenStore {
    service: String,
    grant: GrantStrategy,
    http: reqwest::Client,
    slot: Mutex<Slot>,
    /// Bumped under the slot lock once per finished exchange.
    generation: AtomicU64,
}

impl TokenStore {
    pub fn new(service: impl Into<String>, grant: GrantStrategy, http: reqwest::Client) -> Self {
        Self {
            service: service.into(),
            grant,
            http,
            slot: Mutex::new(Slot::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn grant(&self) -> &GrantStrategy {
        &self.grant
    }

    /// Returns the cached token, refreshing it first when absent or expired.
    pub async fn get_valid(&self) -> AppResult<Token> {
        let seen = self.generation.load(Ordering::Acquire);
        let mut slot = self.slot.lock().await;
        if let Some(shared) = self.shared_outcome(&slot, seen) {
            return shared;
        }
        let now = now_unix_seconds();
        if let Some(token) = slot.token.as_ref().filter(|t| t.is_usable(now)) {
            return Ok(token.clone());
        }
        self.refresh_locked(&mut slot).await
    }

    /// Refreshes after the server rejected `stale`.
    ///
    /// When another caller already replaced `stale` with a usable token, that token is
    /// returned and no exchange happens.
    pub async fn force_refresh(&self, stale: &str) -> AppResult<Token> {
        let seen = self.generation.load(Ordering::Acquire);
        let mut slot = self.slot.lock().await;
        if let Some(shared) = self.shared_outcome(&slot, seen) {
            return shared;
        }
        let now = now_unix_seconds();
        if let Some(token) = slot
            .token
            .as_ref()
            .filter(|t| t.value() != stale && t.is_usable(now))
        {
            tracing::debug!(service = %self.service, "token already rotated by a concurrent caller");
            return Ok(token.clone());
        }
        self.refresh_locked(&mut slot).await
    }

    /// Current cached token without any refresh, usable or not.
    pub async fn peek(&self) -> Option<Token> {
        self.slot.lock().await.token.clone()
    }

    /// Outcome of an exchange that finished while the caller was queued for the lock.
    fn shared_outcome(&self, slot: &Slot, seen: u64) -> Option<AppResult<Token>> {
        if self.generation.load(Ordering::Acquire) == seen {
            return None;
        }
        let shared = slot.last.clone()?;
        tracing::debug!(service = %self.service, ok = shared.is_ok(), "sharing concurrent refresh outcome");
        Some(shared)
    }

    async fn refresh_locked(&self, slot: &mut Slot) -> AppResult<Token> {
        let outcome = self.grant.acquire(&self.service, &self.http).await;
        match &outcome {
            Ok(token) => {
                tracing::info!(
                    service = %self.service,
                    grant_type = self.grant.grant_type(),
                    token = %mask_token(token.value()),
                    expires_at = token.expires_at(),
                    "oauth token refreshed"
                );
                slot.token = Some(token.clone());
            }
            Err(err) => {
                // The previous token stays cached; only callers arriving later try again.
                tracing::warn!(service = %self.service, "oauth token refresh failed: {}", err);
            }
        }
        slot.last = Some(outcome.clone());
        self.generation.fetch_add(1, Ordering::Release);
        outcome
    }

    #[cfg(test)]
    async fn seed(&self, token: Token) {
        self.slot.lock().await.token = Some(token);
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("service", &self.service)
            .field("grant", &self.grant)
            .finish_non_exhaustive()
    }
}
