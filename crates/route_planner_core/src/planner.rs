//! Single owner of the selection, its geocoding and the route session.
//!
//! Per-record geocoding is fired off on the Tokio runtime when a record is
//! selected. The tasks live in a `JoinSet` owned by the planner and their
//! results are only folded into the selection when the owner asks for them,
//! so every mutation still happens through `&mut self`. A task that panics or
//! is cancelled still reports back, as a geocoding failure.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{
    runtime::Handle,
    task::{self, JoinError, JoinSet},
};

use crate::{
    Error, Result,
    export,
    geocode::{GeocodeOutcome, Geocoder, NominatimGeocoder, geocode_many},
    options::{PlannerOptions, Settings},
    record::{RecordId, RecordSource, SelectableRecord, eligible_records},
    routing::{OsrmRouter, Router, TransportProfile},
    selection::{
        CompletionEffect, GeocodeTicket, GeocodedStop, SelectionState, ToggleEffect,
    },
    session::{ActiveRoute, RouteSession, StopOrdering},
    summary::RouteSummary,
};

const ERR_OPTIMIZATION_DISABLED: &str = "route optimization is disabled in settings";
const ERR_NO_RUNTIME: &str = "geocoding on selection needs a running tokio runtime";
const ERR_TASK_PANICKED: &str = "could not geocode: geocoding task panicked";
const ERR_TASK_CANCELLED: &str = "could not geocode: geocoding task was cancelled";

type Joined = std::result::Result<(task::Id, GeocodeOutcome), JoinError>;

pub struct RoutePlanner {
    settings: Settings,
    geocode_delay: Duration,
    geocoder: Arc<dyn Geocoder>,
    eligible: Vec<SelectableRecord>,
    selection: SelectionState,
    session: RouteSession,
    /// Set once a record source has been loaded.
    source_loaded: bool,
    geocodes: JoinSet<GeocodeOutcome>,
    in_flight: HashMap<task::Id, GeocodeTicket>,
}

impl RoutePlanner {
    pub fn new(
        settings: Settings,
        geocode_delay: Duration,
        geocoder: Arc<dyn Geocoder>,
        router: Arc<dyn Router>,
    ) -> Self {
        Self {
            settings,
            geocode_delay,
            geocoder,
            eligible: Vec::new(),
            selection: SelectionState::new(settings.max_addresses),
            session: RouteSession::new(router, settings.profile),
            source_loaded: false,
            geocodes: JoinSet::new(),
            in_flight: HashMap::new(),
        }
    }

    /// Planner wired to the Nominatim and OSRM adapters described by `options`.
    pub fn from_options(options: &PlannerOptions) -> Result<Self> {
        options.validate()?;
        let geocoder = NominatimGeocoder::from_options(options)?;
        let router = OsrmRouter::from_options(options)?;
        Ok(Self::new(
            options.settings,
            options.geocode_delay(),
            Arc::new(geocoder),
            Arc::new(router),
        ))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn session(&self) -> &RouteSession {
        &self.session
    }

    pub fn eligible_records(&self) -> &[SelectableRecord] {
        &self.eligible
    }

    /// Number of per-record geocode requests whose result has not been folded in.
    pub fn geocodes_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Rebuilds all state from a fresh record snapshot. Results still in
    /// flight for the old snapshot will be discarded when they arrive. From
    /// here on only records of this snapshot can be selected.
    pub fn reset_source<S: RecordSource + ?Sized>(&mut self, source: &S) {
        self.eligible = eligible_records(source.snapshot());
        self.source_loaded = true;
        self.selection.reset();
        self.session.clear();
        log::info!(
            "planner.source: reset eligible={} in_flight={}",
            self.eligible.len(),
            self.in_flight.len()
        );
    }

    /// Toggles the eligible record with this id.
    pub fn toggle(&mut self, record_id: &RecordId) -> Result<ToggleEffect> {
        let record = self
            .eligible
            .iter()
            .find(|r| &r.record_id == record_id)
            .cloned()
            .ok_or_else(|| {
                Error::invalid_input(format!("record {record_id} has no usable address"))
            })?;
        self.toggle_record(record)
    }

    /// Selects or deselects `record`. Any calculated route is dropped.
    ///
    /// Once a source is loaded, `record` must belong to its eligible set.
    ///
    /// A newly selected record is geocoded in the background when
    /// auto-geocoding is on; fold the result in with [`Self::next_completion`],
    /// [`Self::apply_ready`] or [`Self::settle`].
    pub fn toggle_record(&mut self, record: SelectableRecord) -> Result<ToggleEffect> {
        let address = record.address.trim();
        if address.is_empty() {
            return Err(Error::invalid_input(format!(
                "record {} has no usable address",
                record.record_id
            )));
        }
        let record = SelectableRecord::new(record.record_id.clone(), address);
        self.ensure_eligible(&record.record_id)?;

        let runtime = if self.settings.auto_geocode && !self.selection.contains(&record.record_id)
        {
            Some(Handle::try_current().map_err(|_| Error::other(ERR_NO_RUNTIME))?)
        } else {
            None
        };

        let effect = self.selection.toggle(&record)?;
        self.session.clear();

        if let (ToggleEffect::Selected { ticket, .. }, Some(runtime)) = (&effect, runtime) {
            self.spawn_geocode(&runtime, ticket.clone());
        }

        match &effect {
            ToggleEffect::Selected { order, .. } => log::info!(
                "planner.toggle: selected record={} order={order}",
                record.record_id
            ),
            ToggleEffect::Deselected { order } => log::info!(
                "planner.toggle: deselected record={} order={order}",
                record.record_id
            ),
        }
        Ok(effect)
    }

    /// Selects several records at once and geocodes the new ones one by one
    /// with the batch delay in between. Already selected records are kept.
    pub async fn bulk_select(
        &mut self,
        records: Vec<SelectableRecord>,
    ) -> Result<Vec<CompletionEffect>> {
        let records = eligible_records(records);
        for record in &records {
            self.ensure_eligible(&record.record_id)?;
        }
        let tickets = self.selection.select_all(&records)?;
        self.session.clear();
        log::info!("planner.bulk_select: added={}", tickets.len());
        Ok(self.geocode_tickets(tickets).await)
    }

    /// Geocodes every selected record that has neither an outcome nor a
    /// request in flight, sequentially with the batch delay.
    pub async fn geocode_pending(&mut self) -> Vec<CompletionEffect> {
        let tickets: Vec<GeocodeTicket> = self
            .selection
            .pending_tickets()
            .into_iter()
            .filter(|t| !self.in_flight.values().any(|running| running == t))
            .collect();
        self.geocode_tickets(tickets).await
    }

    /// Waits for the next background geocode result and applies it.
    /// `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<CompletionEffect> {
        loop {
            let joined = self.geocodes.join_next_with_id().await?;
            if let Some(effect) = self.apply_joined(joined) {
                return Some(effect);
            }
        }
    }

    /// Applies every background result that has already arrived.
    pub fn apply_ready(&mut self) -> Vec<CompletionEffect> {
        let mut effects = Vec::new();
        while let Some(joined) = self.geocodes.try_join_next_with_id() {
            effects.extend(self.apply_joined(joined));
        }
        effects
    }

    /// Waits until every background geocode has reported back.
    pub async fn settle(&mut self) -> Vec<CompletionEffect> {
        let mut effects = Vec::new();
        while let Some(effect) = self.next_completion().await {
            effects.push(effect);
        }
        effects
    }

    pub fn is_ready_to_route(&self) -> bool {
        self.selection.is_ready_to_route()
    }

    pub async fn calculate_as_selected(&mut self) -> Result<&ActiveRoute> {
        self.session.calculate_as_selected(&self.selection).await
    }

    pub async fn calculate_best_route(&mut self) -> Result<&ActiveRoute> {
        if !self.settings.optimization_enabled {
            return Err(Error::invalid_input(ERR_OPTIMIZATION_DISABLED));
        }
        self.session.calculate_best_route(&self.selection).await
    }

    /// Stores the new profile and recomputes an active route with its ordering.
    pub async fn change_profile(
        &mut self,
        profile: TransportProfile,
    ) -> Result<Option<&ActiveRoute>> {
        self.settings.profile = profile;
        self.session.change_profile(profile, &self.selection).await
    }

    pub fn active_route(&self) -> Option<&ActiveRoute> {
        self.session.active()
    }

    pub fn active_ordering(&self) -> Option<StopOrdering> {
        self.session.ordering()
    }

    pub fn summary(&self) -> Option<RouteSummary> {
        self.session.active().map(ActiveRoute::summary)
    }

    /// Geocoded stops with their selection rank, for numbered map markers.
    pub fn markers(&self) -> Vec<GeocodedStop> {
        self.selection.geocoded_in_selection_order()
    }

    /// Original addresses in the order of the active route, falling back to
    /// selection order when no route has been calculated.
    pub fn export_order(&self) -> Vec<String> {
        match self.session.active() {
            Some(route) => route.addresses(),
            None => self
                .selection
                .geocoded_in_selection_order()
                .into_iter()
                .map(|s| s.geocoded.original_address)
                .collect(),
        }
    }

    pub fn google_maps_url(&self) -> Option<String> {
        export::google_maps_url(&self.export_order())
    }

    pub fn apple_maps_url(&self) -> Option<String> {
        export::apple_maps_url(&self.export_order())
    }

    fn ensure_eligible(&self, record_id: &RecordId) -> Result<()> {
        if self.source_loaded && !self.eligible.iter().any(|r| &r.record_id == record_id) {
            return Err(Error::invalid_input(format!(
                "record {record_id} is not in the current record source"
            )));
        }
        Ok(())
    }

    fn spawn_geocode(&mut self, runtime: &Handle, ticket: GeocodeTicket) {
        let geocoder = Arc::clone(&self.geocoder);
        let address = ticket.address.clone();
        let handle = self
            .geocodes
            .spawn_on(async move { geocoder.geocode_one(&address).await }, runtime);
        self.in_flight.insert(handle.id(), ticket);
    }

    async fn geocode_tickets(&mut self, tickets: Vec<GeocodeTicket>) -> Vec<CompletionEffect> {
        if tickets.is_empty() {
            return Vec::new();
        }
        let addresses: Vec<&str> = tickets.iter().map(|t| t.address.as_str()).collect();
        let outcomes = geocode_many(self.geocoder.as_ref(), &addresses, self.geocode_delay).await;

        tickets
            .iter()
            .zip(outcomes)
            .map(|(ticket, outcome)| self.selection.apply_geocode(ticket, outcome))
            .collect()
    }

    fn apply_joined(&mut self, joined: Joined) -> Option<CompletionEffect> {
        let (id, outcome) = match joined {
            Ok((id, outcome)) => (id, outcome),
            Err(err) => {
                let reason = if err.is_panic() {
                    ERR_TASK_PANICKED
                } else {
                    ERR_TASK_CANCELLED
                };
                log::warn!("planner.geocode: task lost id={} reason={reason}", err.id());
                (err.id(), GeocodeOutcome::failure(reason))
            }
        };
        let ticket = self.in_flight.remove(&id)?;
        Some(self.selection.apply_geocode(&ticket, outcome))
    }
}
