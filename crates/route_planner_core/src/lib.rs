//! Address selection, geocoding and stop ordering for multi-stop road routes.
//! Keeps selection ranks, per-record geocoding outcomes and the as-selected or
//! nearest-neighbor stop order of the active route consistent with each other.

mod error;
pub mod export;
pub mod geocode;
pub mod logging;
pub mod optimizer;
pub mod options;
mod planner;
pub mod point;
pub mod record;
pub mod routing;
pub mod selection;
mod session;
mod summary;

pub use error::{Error, NotReadyReason, Result};
pub use geocode::{GeocodeOutcome, GeocodedAddress, Geocoder};
pub use options::{PlannerOptions, Settings};
pub use planner::RoutePlanner;
pub use point::GeoPoint;
pub use record::{RecordId, SelectableRecord};
pub use routing::{RouteResult, Router, TransportProfile};
pub use selection::{CompletionEffect, GeocodedStop, SelectionState, ToggleEffect};
pub use session::{ActiveRoute, RouteSession, StopOrdering};
pub use summary::RouteSummary;
