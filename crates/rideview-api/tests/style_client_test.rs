#![allow(clippy::unwrap_used)]
// Integration tests for `StyleClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rideview_api::{Error, StyleClient};

async fn setup() -> (MockServer, StyleClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/", server.uri())).unwrap();
    let client = StyleClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

#[tokio::test]
async fn test_style_url_success() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/tileserver-url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "style": "https://tiles.example.org/styles/rtp/style.json"
        })))
        .mount(&server)
        .await;

    let url = client.style_url().await.unwrap();
    assert_eq!(
        url.as_str(),
        "https://tiles.example.org/styles/rtp/style.json"
    );
}

#[tokio::test]
async fn test_missing_style_field_is_fatal() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/tileserver-url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let result = client.style_url().await;
    assert!(matches!(result, Err(Error::MissingStyle)));
}

#[tokio::test]
async fn test_empty_style_field_is_fatal() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/tileserver-url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "style": "" })))
        .mount(&server)
        .await;

    let result = client.style_url().await;
    assert!(matches!(result, Err(Error::MissingStyle)));
}

#[tokio::test]
async fn test_style_http_failure() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/tileserver-url"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let result = client.style_url().await;
    assert!(matches!(result, Err(Error::Http { status: 502, .. })));
}

#[tokio::test]
async fn test_ping() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "msg": "pong" })))
        .mount(&server)
        .await;

    assert_eq!(client.ping().await.unwrap(), "pong");
}
