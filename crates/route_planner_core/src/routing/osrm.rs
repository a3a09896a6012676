use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{
    RouteLeg, RouteResult, RouteStep, RouteWaypoint, Router, TransportProfile,
    validate_route_points,
};
use crate::{Error, Result, options::PlannerOptions, point::GeoPoint};

const CODE_OK: &str = "Ok";
const ROUTE_QUERY: [(&str, &str); 2] = [("overview", "full"), ("steps", "true")];

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    #[serde(default)]
    geometry: String,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    distance: f64,
    duration: f64,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
struct OsrmStep {
    #[serde(default)]
    name: String,
    distance: f64,
    duration: f64,
    #[serde(default)]
    maneuver: Option<OsrmManeuver>,
}

#[derive(Debug, Deserialize)]
struct OsrmManeuver {
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    #[serde(default)]
    name: String,
    /// `[lon, lat]`
    location: [f64; 2],
    #[serde(default)]
    distance: f64,
}

/// Router backed by an OSRM `/route/v1` endpoint.
#[derive(Clone, Debug)]
pub struct OsrmRouter {
    client: Client,
    base_url: Url,
}

impl OsrmRouter {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn from_options(options: &PlannerOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .timeout(options.request_timeout())
            .build()
            .map_err(|e| Error::other(format!("failed to build router http client: {e}")))?;
        Ok(Self::new(client, options.router_base()?))
    }

    fn route_url(&self, points: &[GeoPoint], profile: TransportProfile) -> Result<Url> {
        let coords = points
            .iter()
            .map(|p| {
                let mut lon = ryu::Buffer::new();
                let mut lat = ryu::Buffer::new();
                format!("{},{}", lon.format(p.lon), lat.format(p.lat))
            })
            .collect::<Vec<_>>()
            .join(";");
        self.base_url
            .join(&format!("route/v1/{}/{coords}", profile.as_str()))
            .map_err(|e| Error::invalid_input(format!("invalid router url: {e}")))
    }
}

#[async_trait]
impl Router for OsrmRouter {
    async fn route(&self, points: &[GeoPoint], profile: TransportProfile) -> Result<RouteResult> {
        validate_route_points(points)?;
        let url = self.route_url(points, profile)?;
        log::debug!("route.osrm: request n={} profile={profile}", points.len());

        let response = self
            .client
            .get(url)
            .query(&ROUTE_QUERY)
            .send()
            .await
            .map_err(|e| Error::routing_failed(format!("routing service unreachable: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::routing_failed(format!("failed to read routing response: {e}")))?;

        // OSRM reports errors as JSON with a non-Ok code, often alongside a 4xx status.
        let parsed: OsrmResponse = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                Error::routing_failed(format!("invalid routing response: {e}"))
            } else {
                Error::routing_failed(format!("routing service returned {status}"))
            }
        })?;

        into_route_result(parsed)
    }
}

fn into_route_result(response: OsrmResponse) -> Result<RouteResult> {
    if response.code != CODE_OK {
        let message = response
            .message
            .map(|m| format!("{}: {m}", response.code))
            .unwrap_or(response.code);
        return Err(Error::routing_failed(message));
    }

    let Some(route) = response.routes.into_iter().next() else {
        return Err(Error::routing_failed("routing service returned no routes"));
    };

    Ok(RouteResult {
        distance_meters: route.distance,
        duration_seconds: route.duration,
        encoded_path: route.geometry,
        legs: route
            .legs
            .into_iter()
            .map(|leg| RouteLeg {
                distance_meters: leg.distance,
                duration_seconds: leg.duration,
                summary: leg.summary,
                steps: leg
                    .steps
                    .into_iter()
                    .map(|step| RouteStep {
                        name: step.name,
                        maneuver: step.maneuver.map(|m| m.kind).unwrap_or_default(),
                        distance_meters: step.distance,
                        duration_seconds: step.duration,
                    })
                    .collect(),
            })
            .collect(),
        waypoints: response
            .waypoints
            .into_iter()
            .map(|wp| RouteWaypoint {
                name: wp.name,
                location: GeoPoint::new(wp.location[1], wp.location[0]),
                snap_distance_meters: wp.distance,
            })
            .collect(),
    })
}
