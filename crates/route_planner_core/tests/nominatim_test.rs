//! NominatimGeocoder against a mocked `/search` endpoint.
//!
//! Every service problem must come back as a `GeocodeOutcome::Failure`
//! with a readable reason, never as a panic or an error.

use route_planner_core::{GeocodeOutcome, Geocoder, PlannerOptions, geocode::NominatimGeocoder};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn geocoder_for(server_uri: &str) -> NominatimGeocoder {
    let options = PlannerOptions {
        geocoder_url: server_uri.to_string(),
        user_agent: "route-planner-tests/1.0".to_string(),
        request_timeout_secs: 5,
        ..PlannerOptions::default()
    };
    NominatimGeocoder::from_options(&options).unwrap()
}

#[tokio::test]
async fn best_match_is_returned_with_original_address() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Alexanderplatz 1, Berlin"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .and(header("user-agent", "route-planner-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "lat": "52.5219184",
                "lon": "13.4132147",
                "display_name": "Alexanderplatz, Mitte, Berlin, Deutschland"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = geocoder_for(&server.uri())
        .geocode_one("Alexanderplatz 1, Berlin")
        .await;

    let geocoded = outcome.success().expect("address should geocode");
    assert!((geocoded.lat - 52.5219184).abs() < 1e-9);
    assert!((geocoded.lon - 13.4132147).abs() < 1e-9);
    assert_eq!(
        geocoded.display_name,
        "Alexanderplatz, Mitte, Berlin, Deutschland"
    );
    assert_eq!(geocoded.original_address, "Alexanderplatz 1, Berlin");
}

#[tokio::test]
async fn empty_result_is_a_no_match_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let outcome = geocoder_for(&server.uri()).geocode_one("Nowhere 99").await;

    assert_eq!(
        outcome,
        GeocodeOutcome::failure("could not geocode: no match found")
    );
}

#[tokio::test]
async fn server_error_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let outcome = geocoder_for(&server.uri()).geocode_one("Main St").await;

    let reason = outcome.failure_reason().expect("503 must fail");
    assert!(reason.contains("503"), "reason was {reason}");
}

#[tokio::test]
async fn malformed_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let outcome = geocoder_for(&server.uri()).geocode_one("Main St").await;

    let reason = outcome.failure_reason().expect("html body must fail");
    assert!(reason.starts_with("could not geocode: invalid response"));
}

#[tokio::test]
async fn unreachable_service_is_a_failure() {
    let outcome = geocoder_for("http://127.0.0.1:1").geocode_one("Main St").await;

    assert!(!outcome.is_success());
    assert!(
        outcome
            .failure_reason()
            .unwrap()
            .starts_with("could not geocode: request failed")
    );
}
