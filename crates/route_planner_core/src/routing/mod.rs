//! Road routing through an ordered list of coordinates.

use async_trait::async_trait;
use serde::Serialize;

use crate::{Error, Result, point::GeoPoint};

mod osrm;
mod profile;

pub use osrm::OsrmRouter;
pub use profile::TransportProfile;

pub const MIN_ROUTE_POINTS: usize = 2;

/// One routed road trip. Rebuilt on every request, never merged.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteResult {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// Encoded polyline geometry, passed through undecoded to the renderer.
    pub encoded_path: String,
    pub legs: Vec<RouteLeg>,
    pub waypoints: Vec<RouteWaypoint>,
}

/// Stretch between two consecutive stops.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub summary: String,
    pub steps: Vec<RouteStep>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteStep {
    pub name: String,
    pub maneuver: String,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Input coordinate as snapped onto the road network.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteWaypoint {
    pub name: String,
    pub location: GeoPoint,
    /// Distance from the requested coordinate to the snapped one.
    pub snap_distance_meters: f64,
}

#[async_trait]
pub trait Router: Send + Sync {
    /// Routes through `points` in the given order. Needs at least two points.
    /// Service failures surface as [`Error::RoutingFailed`]; no retries.
    async fn route(&self, points: &[GeoPoint], profile: TransportProfile) -> Result<RouteResult>;
}

pub(crate) fn validate_route_points(points: &[GeoPoint]) -> Result<()> {
    if points.len() < MIN_ROUTE_POINTS {
        return Err(Error::invalid_input(format!(
            "routing needs at least {MIN_ROUTE_POINTS} points, got {}",
            points.len()
        )));
    }
    if let Some(bad) = points.iter().find(|p| !p.is_valid()) {
        return Err(Error::invalid_input(format!(
            "routing input contains invalid lat/lon {bad}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_route_points;
    use crate::point::GeoPoint;

    #[test]
    fn fewer_than_two_points_are_rejected() {
        assert!(validate_route_points(&[]).is_err());
        assert!(validate_route_points(&[GeoPoint::new(0.0, 0.0)]).is_err());
        assert!(validate_route_points(&[GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)]).is_ok());
    }

    #[test]
    fn invalid_points_are_rejected() {
        let points = [GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 200.0)];
        assert!(validate_route_points(&points).is_err());
    }
}
