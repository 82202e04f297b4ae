//! Integration tests for HttpFetcher using wiremock
//!
//! These tests validate the HTTP fetcher's behavior with mock servers.

use boardhound::crawler::{HttpFetcher, PageFetcher};
use boardhound::harvest::FailureKind;
use boardhound::utils::error::FetchError;
use std::time::Duration;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test successful fetch from mock server
#[tokio::test]
async fn test_fetch_success_sends_browser_headers() {
    let mock_server = MockServer::start().await;
    let html = r#"<html><body><div class="postings-group"></div></body></html>"#;

    Mock::given(method("GET"))
        .and(path("/acme"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(100).unwrap();
    let page = fetcher
        .get(&format!("{}/acme", mock_server.uri()))
        .await
        .unwrap();

    assert!(page.is_success());
    assert_eq!(page.body, html);
}

/// Error statuses come back as pages, not errors
#[tokio::test]
async fn test_not_found_is_a_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(100).unwrap();
    let page = fetcher
        .get(&format!("{}/gone", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(page.status, 404);
    assert_eq!(FailureKind::from_status(page.status), FailureKind::NotFound);
}

#[tokio::test]
async fn test_head_returns_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/acme"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(100).unwrap();
    let status = fetcher
        .head(&format!("{}/acme", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(status, 204);
}

/// Slow responses surface as transient timeouts
#[tokio::test]
async fn test_timeout_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::with_config(100, Duration::from_millis(200)).unwrap();
    let err = fetcher
        .get(&format!("{}/slow", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout), "unexpected error: {err:?}");
    assert_eq!(FailureKind::from_error(&err), FailureKind::Transient);
}

#[tokio::test]
async fn test_refused_connection_is_transient() {
    // Bind then release a port so nothing is listening on it
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let uri = format!("http://{addr}");

    let fetcher = HttpFetcher::with_config(100, Duration::from_secs(2)).unwrap();
    let err = fetcher.get(&format!("{uri}/acme")).await.unwrap_err();

    assert_eq!(FailureKind::from_error(&err), FailureKind::Transient);
}
