//! Usage: OAuth token endpoint helpers (form POST + response parsing/redaction).

use crate::shared::error::{AppError, AppResult, ErrorCode};
use crate::shared::security::{is_sensitive_key, mask_token};
use serde_json::Value;

const ERROR_BODY_SNIPPET_CHARS: usize = 500;
const ERROR_DETAIL_CHARS: usize = 240;

/// Raw outcome of a successful token endpoint call, before expiry bookkeeping.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct TokenGrantResponse {
    pub(crate) access_token: String,
    pub(crate) expires_in: Option<i64>,
}

impl std::fmt::Debug for TokenGrantResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrantResponse")
            .field("access_token", &mask_token(&self.access_token))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

pub(crate) async fn request_token(
    client: &reqwest::Client,
    service: &str,
    token_url: &str,
    form: &[(&str, &str)],
) -> AppResult<TokenGrantResponse> {
    let grant_type = form
        .iter()
        .find(|(key, _)| *key == "grant_type")
        .map(|(_, value)| *value)
        .unwrap_or("unknown");
    tracing::debug!(service, grant_type, "requesting oauth token");

    let response = client
        .post(token_url.trim())
        .form(form)
        .send()
        .await
        .map_err(|e| {
            AppError::with_code(
                ErrorCode::Auth,
                format!("service={service} oauth token request failed: {e}"),
            )
            .with_source(e)
        })?;

    parse_token_response(service, response).await
}

async fn parse_token_response(
    service: &str,
    response: reqwest::Response,
) -> AppResult<TokenGrantResponse> {
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        AppError::with_code(
            ErrorCode::Auth,
            format!("service={service} oauth token response read failed: {e}"),
        )
    })?;

    if !status.is_success() {
        let (error_code, error_message) = parse_oauth_error_details(&body);
        let snippet = sanitize_oauth_error_body_snippet(&body);
        let mut msg = format!(
            "service={service} oauth token endpoint returned status={}",
            status.as_u16()
        );
        if let Some(code) = error_code {
            msg.push_str(" code=");
            msg.push_str(code.as_str());
        }
        if let Some(detail) = error_message {
            msg.push_str(" message=");
            msg.push_str(
                detail
                    .chars()
                    .take(ERROR_DETAIL_CHARS)
                    .collect::<String>()
                    .as_str(),
            );
        }
        msg.push_str(" body=");
        msg.push_str(snippet.as_str());
        return Err(AppError::with_code(ErrorCode::Auth, msg));
    }

    parse_token_body(service, &body)
}

fn parse_token_body(service: &str, body: &str) -> AppResult<TokenGrantResponse> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        AppError::with_code(
            ErrorCode::Auth,
            format!("service={service} oauth token response json invalid: {e}"),
        )
    })?;

    let access_token = value
        .get("access_token")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            AppError::with_code(
                ErrorCode::Auth,
                format!("service={service} oauth token response missing access_token"),
            )
        })?
        .to_string();

    let expires_in = value
        .get("expires_in")
        .and_then(parse_i64_lossy)
        .filter(|v| *v > 0);

    Ok(TokenGrantResponse {
        access_token,
        expires_in,
    })
}

fn parse_i64_lossy(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn redact_sensitive_json_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                if is_sensitive_key(key) {
                    if let Some(raw) = nested.as_str() {
                        *nested = Value::String(mask_token(raw));
                        continue;
                    }
                }
                redact_sensitive_json_fields(nested);
            }
        }
        Value::Array(items) => {
            for nested in items {
                redact_sensitive_json_fields(nested);
            }
        }
        _ => {}
    }
}

fn sanitize_oauth_error_body_snippet(body: &str) -> String {
    if let Ok(mut value) = serde_json::from_str::<Value>(body) {
        redact_sensitive_json_fields(&mut value);
        if let Ok(encoded) = serde_json::to_string(&value) {
            return encoded.chars().take(ERROR_BODY_SNIPPET_CHARS).collect();
        }
    }
    body.chars().take(ERROR_BODY_SNIPPET_CHARS).collect()
}

fn parse_oauth_error_details(body: &str) -> (Option<String>, Option<String>) {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return (None, None),
    };

    let non_empty = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let mut code = non_empty(value.get("code"));
    let mut message = non_empty(value.get("error_description"));

    if let Some(error_value) = value.get("error") {
        if let Some(err_str) = error_value.as_str() {
            if code.is_none() {
                code = Some(err_str.trim().to_string());
            }
        } else if let Some(err_obj) = error_value.as_object() {
            if code.is_none() {
                code = non_empty(err_obj.get("code")).or_else(|| non_empty(err_obj.get("type")));
            }
            if message.is_none() {
                message = non_empty(err_obj.get("message"));
            }
        }
    }

    (code, message)
}
