mod support;

use mister_freeze_lib::{
    ApiClient, Collector, CollectorSettings, ErrorCode, ExclusionList, SkipReason,
};
use serde_json::{json, Value};
use support::{listing_config, mount_token, page_of, quest_user, LISTING_PATH};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, page: u32, body: Value, expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/v2{LISTING_PATH}")))
        .and(query_param("filter[campus_id]", "41"))
        .and(query_param("filter[validated]", "false"))
        .and(query_param("page[size]", "100"))
        .and(query_param("page[number]", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn listing_client(server: &MockServer) -> ApiClient {
    mount_token(server, "client_credentials", "listing-token", 1).await;
    ApiClient::new(listing_config(server)).expect("client")
}

#[tokio::test]
async fn stops_after_first_short_page() {
    let server = MockServer::start().await;
    let client = listing_client(&server).await;
    mount_page(&server, 0, page_of(0, 100), 1).await;
    mount_page(&server, 1, page_of(1, 100), 1).await;
    mount_page(&server, 2, page_of(2, 37), 1).await;
    mount_page(&server, 3, page_of(3, 0), 0).await;

    let settings = CollectorSettings::default();
    let outcome = Collector::new(&client, &settings)
        .collect(&ExclusionList::default())
        .await
        .expect("collect");

    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(outcome.logins.len(), 237);
    assert_eq!(outcome.logins[0], "p0u0");
    assert_eq!(outcome.logins[236], "p2u36");
}

#[tokio::test]
async fn exact_multiple_of_page_size_costs_one_empty_page() {
    let server = MockServer::start().await;
    let client = listing_client(&server).await;
    mount_page(&server, 0, page_of(0, 100), 1).await;
    mount_page(&server, 1, json!([]), 1).await;
    mount_page(&server, 2, json!([]), 0).await;

    let settings = CollectorSettings::default();
    let outcome = Collector::new(&client, &settings)
        .collect(&ExclusionList::default())
        .await
        .expect("collect");

    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.logins.len(), 100);
}

#[tokio::test]
async fn empty_first_page_yields_no_users() {
    let server = MockServer::start().await;
    let client = listing_client(&server).await;
    mount_page(&server, 0, json!([]), 1).await;
    mount_page(&server, 1, json!([]), 0).await;

    let settings = CollectorSettings::default();
    let outcome = Collector::new(&client, &settings)
        .collect(&ExclusionList::default())
        .await
        .expect("collect");

    assert!(outcome.logins.is_empty());
    assert_eq!(outcome.pages_fetched, 1);
}

#[tokio::test]
async fn exclusions_staff_and_duplicates_are_filtered() {
    let server = MockServer::start().await;
    let client = listing_client(&server).await;
    mount_page(
        &server,
        0,
        json!([
            quest_user(42, "amiller", true, false),
            quest_user(7, "jdoe", true, false),
            quest_user(9, "bsmith", true, false),
            quest_user(11, "staffer", true, true),
            quest_user(12, "ghost", false, false),
            quest_user(9, "bsmith", true, false),
        ]),
        1,
    )
    .await;

    let settings = CollectorSettings::default();
    let outcome = Collector::new(&client, &settings)
        .collect(&ExclusionList::new(["42", "jdoe"]))
        .await
        .expect("collect");

    assert_eq!(outcome.logins, vec!["bsmith".to_string()]);
    let reasons: Vec<SkipReason> = outcome.skipped.iter().map(|s| s.reason).collect();
    assert_eq!(
        reasons,
        vec![
            SkipReason::ExcludedById,
            SkipReason::ExcludedByLogin,
            SkipReason::Staff,
            SkipReason::Inactive,
        ]
    );
}

#[tokio::test]
async fn custom_first_page_and_size_are_sent() {
    let server = MockServer::start().await;
    let client = listing_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/quests/99/quests_users"))
        .and(query_param("filter[campus_id]", "1"))
        .and(query_param("page[size]", "2"))
        .and(query_param("page[number]", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([quest_user(5, "solo", true, false)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let settings = CollectorSettings {
        listing_path: "/quests/99/quests_users".to_string(),
        campus_id: 1,
        page_size: 2,
        first_page: 1,
    };
    let outcome = Collector::new(&client, &settings)
        .collect(&ExclusionList::default())
        .await
        .expect("collect");
    assert_eq!(outcome.logins, vec!["solo".to_string()]);
}

#[tokio::test]
async fn malformed_page_is_fetch_error() {
    let server = MockServer::start().await;
    let client = listing_client(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/v2{LISTING_PATH}")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let settings = CollectorSettings::default();
    let err = Collector::new(&client, &settings)
        .collect(&ExclusionList::default())
        .await
        .unwrap_err();
    assert!(err.is(ErrorCode::Fetch), "{err}");
    assert!(err.message().contains("malformed"));
}

#[tokio::test]
async fn server_error_page_is_fetch_error() {
    let server = MockServer::start().await;
    let client = listing_client(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/v2{LISTING_PATH}")))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let settings = CollectorSettings::default();
    let err = Collector::new(&client, &settings)
        .collect(&ExclusionList::default())
        .await
        .unwrap_err();
    assert!(err.is(ErrorCode::Fetch), "{err}");
    assert!(err.message().contains("status=500"));
}
