#![allow(dead_code)]

use mister_freeze_lib::ClientConfig;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/oauth/token";
pub const PROBE_PATH: &str = "/cursus";
pub const LISTING_PATH: &str = "/quests/37/quests_users";

pub fn listing_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(
        "42-v2",
        format!("{}{TOKEN_PATH}", server.uri()),
        format!("{}/v2", server.uri()),
        PROBE_PATH,
    )
    .credentials("listing-uid", "listing-secret")
    .client_credentials_grant("public")
}

pub fn freeze_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(
        "42-freeze",
        format!("{}{TOKEN_PATH}", server.uri()),
        format!("{}/api", server.uri()),
        "/freezes",
    )
    .credentials("freeze-uid", "freeze-secret")
    .password_grant("freeze-bot", "hunter2")
}

pub fn token_body(access_token: &str, expires_in: i64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": expires_in,
        "scope": "public",
    })
}

/// Token endpoint for `grant_type`, answering `access_token` exactly `times` times.
pub async fn mount_token(server: &MockServer, grant_type: &str, access_token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains(format!("grant_type={grant_type}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(access_token, 7200)))
        .up_to_n_times(times)
        .expect(times)
        .mount(server)
        .await;
}

pub fn quest_user(id: i64, login: &str, active: bool, staff: bool) -> Value {
    json!({
        "id": id * 10,
        "validated_at": null,
        "user": {
            "id": id,
            "login": login,
            "url": format!("https://api.intra.42.fr/v2/users/{login}"),
            "active?": active,
            "staff?": staff,
        }
    })
}

/// `count` active non-staff learners with logins unique to `page`.
pub fn page_of(page: u32, count: usize) -> Value {
    let users: Vec<Value> = (0..count)
        .map(|i| {
            let id = i64::from(page) * 1000 + i as i64 + 1;
            quest_user(id, &format!("p{page}u{i}"), true, false)
        })
        .collect();
    Value::Array(users)
}

/// Probe endpoint answering 200 under `prefix` (`/v2` or `/api`).
pub async fn mount_probe(server: &MockServer, prefix: &str, probe_path: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{prefix}{probe_path}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(server)
        .await;
}
