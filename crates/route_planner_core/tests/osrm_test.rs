//! OsrmRouter against a mocked `/route/v1` endpoint.

use route_planner_core::{
    Error, GeoPoint, PlannerOptions, Router, TransportProfile, routing::OsrmRouter,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn router_for(server_uri: &str) -> OsrmRouter {
    let options = PlannerOptions {
        router_url: server_uri.to_string(),
        request_timeout_secs: 5,
        ..PlannerOptions::default()
    };
    OsrmRouter::from_options(&options).unwrap()
}

fn berlin_to_potsdam() -> [GeoPoint; 2] {
    [GeoPoint::new(52.52, 13.405), GeoPoint::new(52.39, 13.065)]
}

#[tokio::test]
async fn ok_response_becomes_route_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/route/v1/walking/13.405,52.52;13.065,52.39"))
        .and(query_param("overview", "full"))
        .and(query_param("steps", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "Ok",
            "routes": [{
                "distance": 34512.7,
                "duration": 25010.0,
                "geometry": "ofp_Ik_vpAilAyu@",
                "legs": [{
                    "distance": 34512.7,
                    "duration": 25010.0,
                    "summary": "Potsdamer Chaussee",
                    "steps": []
                }]
            }],
            "waypoints": [
                { "name": "Unter den Linden", "location": [13.405, 52.52], "distance": 1.5 },
                { "name": "Am Kanal", "location": [13.065, 52.39], "distance": 4.0 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let route = router_for(&server.uri())
        .route(&berlin_to_potsdam(), TransportProfile::Walking)
        .await
        .unwrap();

    assert!((route.distance_meters - 34512.7).abs() < 1e-9);
    assert!((route.duration_seconds - 25010.0).abs() < 1e-9);
    assert_eq!(route.encoded_path, "ofp_Ik_vpAilAyu@");
    assert_eq!(route.legs[0].summary, "Potsdamer Chaussee");
    assert_eq!(route.waypoints.len(), 2);
    assert_eq!(route.waypoints[0].location, GeoPoint::new(52.52, 13.405));
}

#[tokio::test]
async fn error_code_with_client_status_is_routing_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": "NoSegment",
            "message": "Could not find a matching segment for any coordinate."
        })))
        .mount(&server)
        .await;

    let err = router_for(&server.uri())
        .route(&berlin_to_potsdam(), TransportProfile::Driving)
        .await
        .unwrap_err();

    match err {
        Error::RoutingFailed { message } => assert_eq!(
            message,
            "NoSegment: Could not find a matching segment for any coordinate."
        ),
        other => panic!("expected RoutingFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_status_is_routing_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = router_for(&server.uri())
        .route(&berlin_to_potsdam(), TransportProfile::Driving)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RoutingFailed { ref message } if message.contains("502")));
}

#[tokio::test]
async fn unreachable_service_is_routing_failed() {
    let err = router_for("http://127.0.0.1:1")
        .route(&berlin_to_potsdam(), TransportProfile::Cycling)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RoutingFailed { .. }));
}

#[tokio::test]
async fn single_point_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = router_for(&server.uri())
        .route(&[GeoPoint::new(52.52, 13.405)], TransportProfile::Driving)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
}
