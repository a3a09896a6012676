use std::{fmt, sync::Arc};

use crate::{
    Result,
    optimizer::optimal_order,
    point::GeoPoint,
    point::Located,
    routing::{RouteResult, Router, TransportProfile},
    selection::{GeocodedStop, SelectionState},
    summary::RouteSummary,
};

/// Which visiting sequence produced the active route.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StopOrdering {
    AsSelected,
    Optimized,
}

impl StopOrdering {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AsSelected => "as-selected",
            Self::Optimized => "optimized",
        }
    }
}

impl fmt::Display for StopOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last successful route together with the stop sequence it was routed through.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveRoute {
    pub result: RouteResult,
    pub ordering: StopOrdering,
    pub profile: TransportProfile,
    pub stops: Vec<GeocodedStop>,
}

impl ActiveRoute {
    /// Original address strings in visiting order.
    pub fn addresses(&self) -> Vec<String> {
        self.stops
            .iter()
            .map(|s| s.geocoded.original_address.clone())
            .collect()
    }

    pub fn summary(&self) -> RouteSummary {
        RouteSummary::new(&self.result, &self.stops, self.ordering, self.profile)
    }
}

/// Runs route calculations against the current selection and keeps the
/// active result.
pub struct RouteSession {
    router: Arc<dyn Router>,
    profile: TransportProfile,
    active: Option<ActiveRoute>,
}

impl RouteSession {
    pub fn new(router: Arc<dyn Router>, profile: TransportProfile) -> Self {
        Self {
            router,
            profile,
            active: None,
        }
    }

    pub fn profile(&self) -> TransportProfile {
        self.profile
    }

    pub fn active(&self) -> Option<&ActiveRoute> {
        self.active.as_ref()
    }

    pub fn ordering(&self) -> Option<StopOrdering> {
        self.active.as_ref().map(|route| route.ordering)
    }

    /// Whether route actions (export, save, map) should be offered.
    pub fn has_route(&self) -> bool {
        self.active.is_some()
    }

    pub fn clear(&mut self) {
        if self.active.take().is_some() {
            log::debug!("session.clear: dropped active route");
        }
    }

    pub async fn calculate_as_selected(
        &mut self,
        selection: &SelectionState,
    ) -> Result<&ActiveRoute> {
        self.calculate(selection, StopOrdering::AsSelected).await
    }

    /// Routes through the nearest-neighbor order of every geocoded stop.
    /// Selection ranks are left as they are.
    pub async fn calculate_best_route(
        &mut self,
        selection: &SelectionState,
    ) -> Result<&ActiveRoute> {
        self.calculate(selection, StopOrdering::Optimized).await
    }

    /// Switches the transport profile. When a route is active and the
    /// selection is still routable, recomputes it with the same ordering.
    pub async fn change_profile(
        &mut self,
        profile: TransportProfile,
        selection: &SelectionState,
    ) -> Result<Option<&ActiveRoute>> {
        self.profile = profile;
        let Some(ordering) = self.ordering() else {
            log::debug!("session.profile: set profile={profile} recompute=false");
            return Ok(None);
        };
        if !selection.is_ready_to_route() {
            log::debug!("session.profile: set profile={profile} recompute=false reason=not-ready");
            return Ok(None);
        }

        log::debug!("session.profile: set profile={profile} recompute=true ordering={ordering}");
        self.calculate(selection, ordering).await.map(Some)
    }

    async fn calculate(
        &mut self,
        selection: &SelectionState,
        ordering: StopOrdering,
    ) -> Result<&ActiveRoute> {
        selection.readiness()?;

        let in_selection_order = selection.geocoded_in_selection_order();
        let stops = match ordering {
            StopOrdering::AsSelected => in_selection_order,
            StopOrdering::Optimized => optimal_order(&in_selection_order),
        };
        let points: Vec<GeoPoint> = stops.iter().map(Located::point).collect();

        let profile = self.profile;
        let result = match self.router.route(&points, profile).await {
            Ok(result) => result,
            Err(err) => {
                log::warn!("session.route: failed ordering={ordering} profile={profile} err={err}");
                return Err(err);
            }
        };

        let route = ActiveRoute {
            result,
            ordering,
            profile,
            stops,
        };
        log::info!("session.route: ok {}", route.summary());
        Ok(self.active.insert(route))
    }
}
