//! IP geolocation against a mock HTTP server.

use weatherly_core::{Coordinates, FetchError, IpGeolocator, PositionSource};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn geolocator_with(response: ResponseTemplate) -> (MockServer, IpGeolocator) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(response)
        .mount(&server)
        .await;

    let geolocator = IpGeolocator::new(format!("{}/json", server.uri()));
    (server, geolocator)
}

#[tokio::test]
async fn resolves_position_from_ip_lookup() {
    let (_server, geolocator) = geolocator_with(ResponseTemplate::new(200).set_body_json(
        serde_json::json!({
            "status": "success",
            "country": "Norway",
            "city": "Oslo",
            "lat": 59.9133,
            "lon": 10.7389,
            "query": "203.0.113.7"
        }),
    ))
    .await;

    let position = geolocator.current_position().await.expect("position");
    assert_eq!(position, Coordinates::new(59.9133, 10.7389).unwrap());
}

#[tokio::test]
async fn failed_ip_lookup_is_location_denied() {
    let (_server, geolocator) = geolocator_with(ResponseTemplate::new(200).set_body_json(
        serde_json::json!({ "status": "fail", "message": "private range", "query": "10.0.0.1" }),
    ))
    .await;

    let err = geolocator.current_position().await.unwrap_err();
    match err {
        FetchError::LocationDenied { reason } => assert_eq!(reason, "private range"),
        other => panic!("Expected LocationDenied, got: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_location_denied() {
    let (_server, geolocator) =
        geolocator_with(ResponseTemplate::new(503).set_body_string("busy")).await;

    let err = geolocator.current_position().await.unwrap_err();
    assert!(matches!(err, FetchError::LocationDenied { .. }), "got {err:?}");
    assert_eq!(err.to_string(), "Location access denied.");
}

#[tokio::test]
async fn garbage_body_is_location_denied() {
    let (_server, geolocator) =
        geolocator_with(ResponseTemplate::new(200).set_body_string("<html>")).await;

    let err = geolocator.current_position().await.unwrap_err();
    assert!(matches!(err, FetchError::LocationDenied { .. }), "got {err:?}");
}
