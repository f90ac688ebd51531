#![allow(clippy::unwrap_used, clippy::float_cmp)]
// Integration tests for `VehicleClient` using wiremock.

use serde_json::json;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rideview_api::{Error, FetchOutcome, Region, VehicleClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, VehicleClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/", server.uri())).unwrap();
    let client = VehicleClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn portland_region() -> Region {
    Region::new(-122.72, 45.512, -122.665, 45.528).unwrap()
}

// ── Success path ────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_vehicles_in_region() {
    let (server, client) = setup().await;

    let body = json!([{
        "latitude": 45.52,
        "longitude": -122.68,
        "routeNumber": 9,
        "signMessage": "To Downtown",
        "vehicleID": "1234",
        "bearing": 90
    }]);

    Mock::given(method("GET"))
        .and(path("/realtime-buses"))
        .and(query_param("bbox", "-122.72,45.512,-122.665,45.528"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let outcome = client
        .vehicles_in_region(&portland_region(), &cancel)
        .await
        .unwrap();

    let FetchOutcome::Fetched(batch) = outcome else {
        panic!("expected a fetched batch");
    };
    assert_eq!(batch.vehicles.len(), 1);
    assert_eq!(batch.dropped, 0);

    let v = &batch.vehicles[0];
    assert_eq!(v.latitude, 45.52);
    assert_eq!(v.longitude, -122.68);
    assert_eq!(v.route_number, Some(9));
    assert_eq!(v.sign_message.as_deref(), Some("To Downtown"));
    assert_eq!(v.vehicle_id.as_deref(), Some("1234"));
    assert_eq!(v.bearing, Some(90.0));
}

#[tokio::test]
async fn test_empty_array_is_an_empty_batch() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/realtime-buses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let outcome = client
        .vehicles_in_region(&portland_region(), &cancel)
        .await
        .unwrap();

    let FetchOutcome::Fetched(batch) = outcome else {
        panic!("expected a fetched batch");
    };
    assert!(batch.vehicles.is_empty());
}

#[tokio::test]
async fn test_malformed_elements_are_dropped_individually() {
    let (server, client) = setup().await;

    let body = json!([
        { "latitude": 45.52, "longitude": -122.68, "vehicleID": "1" },
        { "vehicleID": "no-position" },
        { "latitude": "north", "longitude": -122.68, "vehicleID": "3" }
    ]);

    Mock::given(method("GET"))
        .and(path("/realtime-buses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let outcome = client
        .vehicles_in_region(&portland_region(), &cancel)
        .await
        .unwrap();

    let FetchOutcome::Fetched(batch) = outcome else {
        panic!("expected a fetched batch");
    };
    assert_eq!(batch.vehicles.len(), 1);
    assert_eq!(batch.dropped, 2);
}

// ── Failure classification ──────────────────────────────────────────

#[tokio::test]
async fn test_server_error_maps_to_http_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/realtime-buses"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let result = client.vehicles_in_region(&portland_region(), &cancel).await;

    match result {
        Err(Error::Http { status: 500, .. }) => {}
        other => panic!("expected Http 500 error, got: {other:?}"),
    }
    assert!(result.unwrap_err().is_transient());
}

#[tokio::test]
async fn test_non_array_body_is_malformed() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/realtime-buses"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "resultSet": { "vehicle": [] } })),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let result = client.vehicles_in_region(&portland_region(), &cancel).await;

    assert!(
        matches!(result, Err(Error::MalformedResponse { .. })),
        "expected MalformedResponse, got: {result:?}"
    );
}

// ── Cancellation ────────────────────────────────────────────────────

#[tokio::test]
async fn test_pre_cancelled_token_resolves_cancelled() {
    let (server, client) = setup().await;

    // Mount a mock so an accidental request would still succeed;
    // the client must not even issue it.
    Mock::given(method("GET"))
        .and(path("/realtime-buses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = client
        .vehicles_in_region(&portland_region(), &cancel)
        .await
        .unwrap();

    assert!(matches!(outcome, FetchOutcome::Cancelled));
}

#[tokio::test]
async fn test_cancel_during_slow_response_resolves_cancelled() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/realtime-buses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        cancel_clone.cancel();
    });

    let outcome = client
        .vehicles_in_region(&portland_region(), &cancel)
        .await
        .unwrap();

    assert!(matches!(outcome, FetchOutcome::Cancelled));
}
