//! Fetch-with-retry behavior against a mock registry.
//!
//! Timeouts retry up to the attempt ceiling; everything else fails open to an
//! empty snapshot immediately.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use orcid_sync::config::Config;
use orcid_sync::models::work::IdKind;
use orcid_sync::RegistryClient;

const ORCID: &str = "0000-0001-2345-6789";

fn temp_blacklist() -> PathBuf {
    std::env::temp_dir().join(format!("orcid-blacklist-{}.json", uuid::Uuid::new_v4()))
}

fn client_for(mock_server: &MockServer) -> RegistryClient {
    let config = Config::for_testing(&mock_server.uri(), temp_blacklist());
    RegistryClient::new(&config).unwrap()
}

fn works_body_with_doi(doi: &str) -> serde_json::Value {
    json!({
        "group": [{
            "external-ids": {"external-id": [
                {"external-id-type": "doi", "external-id-value": doi}
            ]}
        }]
    })
}

/// A delay comfortably past the test fetch timeout (500ms).
fn past_timeout() -> Duration {
    Duration::from_secs(2)
}

#[tokio::test]
async fn two_timeouts_then_success_returns_snapshot() {
    let mock_server = MockServer::start().await;

    // First two attempts hang past the client timeout.
    Mock::given(method("GET"))
        .and(path(format!("/pub/v2.1/{ORCID}/works")))
        .respond_with(ResponseTemplate::new(200).set_delay(past_timeout()))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/pub/v2.1/{ORCID}/works")))
        .respond_with(ResponseTemplate::new(200).set_body_json(works_body_with_doi("10.1/x")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let known = client.fetch_known_ids(ORCID).await;

    assert!(known.contains(IdKind::Doi, "10.1/x"));
}

#[tokio::test]
async fn timeout_exhaustion_fails_open_after_three_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/pub/v2.1/{ORCID}/works")))
        .respond_with(ResponseTemplate::new(200).set_delay(past_timeout()))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let known = client.fetch_known_ids(ORCID).await;

    assert!(known.is_empty());
}

#[tokio::test]
async fn server_error_fails_open_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/pub/v2.1/{ORCID}/works")))
        .respond_with(ResponseTemplate::new(500).set_body_string("registry down"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let known = client.fetch_known_ids(ORCID).await;

    assert!(known.is_empty());
}

#[tokio::test]
async fn malformed_body_fails_open_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/pub/v2.1/{ORCID}/works")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<works>not json</works>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let known = client.fetch_known_ids(ORCID).await;

    assert!(known.is_empty());
}

#[tokio::test]
async fn profile_without_groups_is_a_valid_empty_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/pub/v2.1/{ORCID}/works")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let known = client.fetch_known_ids(ORCID).await;

    assert!(known.is_empty());
}
