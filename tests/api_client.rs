mod support;

use mister_freeze_lib::{ApiClient, ErrorCode};
use serde_json::json;
use support::{listing_config, mount_probe, mount_token, PROBE_PATH};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn unauthorized_response_refreshes_token_and_retries_once() {
    let server = MockServer::start().await;
    mount_token(&server, "client_credentials", "token-a", 1).await;
    mount_token(&server, "client_credentials", "token-b", 1).await;

    Mock::given(method("GET"))
        .and(path("/v2/me"))
        .and(header("authorization", "Bearer token-a"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/me"))
        .and(header("authorization", "Bearer token-b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "freeze-bot"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(listing_config(&server)).expect("client");
    let response = client.get("/me").await.expect("retried request");
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        client.tokens().peek().await.expect("cached").value(),
        "token-b"
    );
}

#[tokio::test]
async fn second_unauthorized_is_transport_error() {
    let server = MockServer::start().await;
    mount_token(&server, "client_credentials", "token-a", 1).await;
    mount_token(&server, "client_credentials", "token-b", 1).await;
    Mock::given(method("GET"))
        .and(path("/v2/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let client = ApiClient::new(listing_config(&server)).expect("client");
    let err = client.get("/me").await.unwrap_err();
    assert!(err.is(ErrorCode::Transport), "{err}");
    assert!(err.message().contains("still unauthorized"));
}

#[tokio::test]
async fn other_error_statuses_are_returned_to_caller() {
    let server = MockServer::start().await;
    mount_token(&server, "client_credentials", "token-a", 1).await;
    Mock::given(method("GET"))
        .and(path("/v2/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(listing_config(&server)).expect("client");
    let response = client.get("missing").await.expect("response");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn post_sends_json_body_with_bearer_token() {
    let server = MockServer::start().await;
    mount_token(&server, "client_credentials", "token-a", 1).await;
    Mock::given(method("POST"))
        .and(path("/v2/echo"))
        .and(header("authorization", "Bearer token-a"))
        .and(body_json(json!({"hello": "world"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(listing_config(&server)).expect("client");
    let response = client
        .post("/echo", &json!({"hello": "world"}))
        .await
        .expect("post");
    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn probe_succeeds_on_2xx() {
    let server = MockServer::start().await;
    mount_token(&server, "client_credentials", "token-a", 1).await;
    mount_probe(&server, "/v2", PROBE_PATH).await;

    let client = ApiClient::new(listing_config(&server)).expect("client");
    client.test_connection().await.expect("probe");
}

#[tokio::test]
async fn probe_failure_is_connection_error() {
    let server = MockServer::start().await;
    mount_token(&server, "client_credentials", "token-a", 1).await;
    Mock::given(method("GET"))
        .and(path(format!("/v2{PROBE_PATH}")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ApiClient::new(listing_config(&server)).expect("client");
    let err = client.test_connection().await.unwrap_err();
    assert!(err.is(ErrorCode::Connection), "{err}");
}

#[tokio::test]
async fn probe_with_rejected_credentials_is_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(support::TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})))
        .mount(&server)
        .await;

    let client = ApiClient::new(listing_config(&server)).expect("client");
    let err = client.test_connection().await.unwrap_err();
    assert!(err.is(ErrorCode::Connection), "{err}");
    assert!(err.message().contains("invalid_client"));
}
