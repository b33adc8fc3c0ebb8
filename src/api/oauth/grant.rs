//! Usage: OAuth2 grant selection (password / client_credentials) behind one `acquire` call.

use super::token_exchange::request_token;
use super::token_store::Token;
use crate::shared::error::AppResult;
use crate::shared::security::mask_token;
use crate::shared::time::now_unix_seconds;

/// How a client obtains its bearer token. Each variant carries exactly the fields its grant needs.
#[derive(Clone, PartialEq, Eq)]
pub enum GrantStrategy {
    /// Resource-owner password grant, for services acting as a fixed account.
    Password {
        token_url: String,
        client_id: String,
        client_secret: String,
        username: String,
        password: String,
    },
    /// Machine-to-machine grant.
    ClientCredentials {
        token_url: String,
        client_id: String,
        client_secret: String,
        scope: String,
    },
}

impl GrantStrategy {
    pub fn password(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::Password {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn client_credentials(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self::ClientCredentials {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: scope.into(),
        }
    }

    pub fn grant_type(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::ClientCredentials { .. } => "client_credentials",
        }
    }

    pub fn token_url(&self) -> &str {
        match self {
            Self::Password { token_url, .. } | Self::ClientCredentials { token_url, .. } => {
                token_url
            }
        }
    }

    fn form(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Password {
                client_id,
                client_secret,
                username,
                password,
                ..
            } => vec![
                ("grant_type", self.grant_type()),
                ("username", username.as_str()),
                ("password", password.as_str()),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ],
            Self::ClientCredentials {
                client_id,
                client_secret,
                scope,
                ..
            } => vec![
                ("grant_type", self.grant_type()),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("scope", scope.as_str()),
            ],
        }
    }

    /// Exchanges the configured credentials for a fresh token.
    pub async fn acquire(&self, service: &str, http: &reqwest::Client) -> AppResult<Token> {
        let form = self.form();
        let granted = request_token(http, service, self.token_url(), &form).await?;
        Ok(Token::from_lifetime(
            granted.access_token,
            granted.expires_in,
            now_unix_seconds(),
        ))
    }
}

impl std::fmt::Debug for GrantStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password {
                token_url,
                client_id,
                client_secret,
                username,
                ..
            } => f
                .debug_struct("Password")
                .field("token_url", token_url)
                .field("client_id", client_id)
                .field("client_secret", &mask_token(client_secret))
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::ClientCredentials {
                token_url,
                client_id,
                client_secret,
                scope,
            } => f
                .debug_struct("ClientCredentials")
                .field("token_url", token_url)
                .field("client_id", client_id)
                .field("client_secret", &mask_token(client_secret))
                .field("scope", scope)
                .finish(),
        }
    }
}
