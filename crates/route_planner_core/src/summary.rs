use std::fmt;

use crate::{
    point::path_length_km,
    routing::{RouteResult, TransportProfile},
    selection::GeocodedStop,
    session::StopOrdering,
};

const METERS_PER_KM: f64 = 1_000.0;
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Human-facing figures for a calculated route.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteSummary {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub stop_count: usize,
    /// Haversine length of the stop sequence, for comparison with the road distance.
    pub straight_line_km: f64,
    pub ordering: StopOrdering,
    pub profile: TransportProfile,
}

impl RouteSummary {
    pub fn new(
        result: &RouteResult,
        stops: &[GeocodedStop],
        ordering: StopOrdering,
        profile: TransportProfile,
    ) -> Self {
        Self {
            distance_meters: result.distance_meters,
            duration_seconds: result.duration_seconds,
            stop_count: stops.len(),
            straight_line_km: path_length_km(stops),
            ordering,
            profile,
        }
    }

    /// Road distance like `12.3 km`.
    pub fn distance_label(&self) -> String {
        format!("{:.1} km", self.distance_meters / METERS_PER_KM)
    }

    /// Travel time like `25 min`.
    pub fn duration_label(&self) -> String {
        format!(
            "{} min",
            (self.duration_seconds / SECONDS_PER_MINUTE).round() as u64
        )
    }
}

impl fmt::Display for RouteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ordering={} profile={} stops={} distance_m={:.0} duration_s={:.0} straight_line_km={:.1}",
            self.ordering,
            self.profile,
            self.stop_count,
            self.distance_meters,
            self.duration_seconds,
            self.straight_line_km,
        )
    }
}
