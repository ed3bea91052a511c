use std::time::Duration;

use feed_engine::{FailureKind, ReqwestTransport, Transport, TransportSettings};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credential() -> Vec<(String, String)> {
    vec![("x-api-key".to_string(), "secret".to_string())]
}

#[tokio::test]
async fn transport_sends_headers_and_returns_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photos"))
        .and(header("x-api-key", "secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("pagination-page", "2")
                .insert_header("pagination-count", "40")
                .set_body_raw("[]", "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings::default()).expect("client");
    let url = format!("{}/photos?page=2&limit=20", server.uri());

    let response = transport.get(&url, &credential()).await.expect("get ok");
    assert_eq!(response.status, 200);
    assert_eq!(response.header("Pagination-Page"), Some("2"));
    assert_eq!(response.header("PAGINATION-COUNT"), Some("40"));
    assert_eq!(response.body, b"[]");
}

#[tokio::test]
async fn transport_passes_error_status_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photos"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings::default()).expect("client");
    let url = format!("{}/photos", server.uri());

    let response = transport.get(&url, &credential()).await.expect("get ok");
    assert_eq!(response.status, 503);
    assert!(!response.is_success());
}

#[tokio::test]
async fn transport_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("[]"),
        )
        .mount(&server)
        .await;

    let settings = TransportSettings {
        request_timeout: Duration::from_millis(50),
        ..TransportSettings::default()
    };
    let transport = ReqwestTransport::new(settings).expect("client");
    let url = format!("{}/slow", server.uri());

    let err = transport.get(&url, &credential()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn transport_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/json")
                .insert_header("Content-Length", "11")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = TransportSettings {
        max_bytes: 10,
        ..TransportSettings::default()
    };
    let transport = ReqwestTransport::new(settings).expect("client");
    let url = format!("{}/large", server.uri());

    let err = transport.get(&url, &credential()).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn transport_rejects_invalid_url() {
    let transport = ReqwestTransport::new(TransportSettings::default()).expect("client");
    let err = transport.get("not a url", &credential()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
