//! Address geocoding: the adapter seam, the sequential batch path and the
//! Nominatim-backed implementation.

use async_trait::async_trait;
use serde::Serialize;

use crate::point::{GeoPoint, Located};

mod batch;
mod nominatim;

pub use batch::geocode_many;
pub use nominatim::NominatimGeocoder;

/// Best match for a free-text address.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeocodedAddress {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
    pub original_address: String,
}

impl Located for GeocodedAddress {
    fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GeocodeOutcome {
    Success(GeocodedAddress),
    Failure { reason: String },
}

impl GeocodeOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn success(&self) -> Option<&GeocodedAddress> {
        match self {
            Self::Success(address) => Some(address),
            Self::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { reason } => Some(reason),
        }
    }
}

/// Turns one free-text address into coordinates.
///
/// Implementations never return an error: no match, transport problems and
/// malformed responses all become [`GeocodeOutcome::Failure`]. No retries.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode_one(&self, address: &str) -> GeocodeOutcome;
}
