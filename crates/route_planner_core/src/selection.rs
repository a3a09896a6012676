//! Ordered record selection and per-record geocoding status.
//!
//! Orders are a dense `1..=N` rank in selection sequence. Every selection
//! gets a fresh generation; geocode results come back tagged with the ticket
//! they were issued for and are only applied while that exact selection is
//! still live, so late results for removed (or removed and re-added) records
//! fall on the floor.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    Error, NotReadyReason, Result,
    geocode::{GeocodeOutcome, GeocodedAddress},
    point::{GeoPoint, Located},
    record::{RecordId, SelectableRecord},
    routing::MIN_ROUTE_POINTS,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectionEntry {
    pub record_id: RecordId,
    pub address: String,
    pub order: usize,
    generation: u64,
}

/// Handle for one geocode request, issued when a record is selected.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct GeocodeTicket {
    pub record_id: RecordId,
    pub address: String,
    generation: u64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ToggleEffect {
    Selected { order: usize, ticket: GeocodeTicket },
    Deselected { order: usize },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompletionEffect {
    Recorded { record_id: RecordId, success: bool },
    /// The record was deselected (or re-selected) before the result arrived.
    Discarded { record_id: RecordId },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeocodeStatus<'a> {
    Pending,
    Success(&'a GeocodedAddress),
    Failure(&'a str),
}

/// Geocoded selection entry, as handed to routing and marker rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeocodedStop {
    pub record_id: RecordId,
    /// Selection rank, never the optimized visiting position.
    pub order: usize,
    pub geocoded: GeocodedAddress,
}

impl Located for GeocodedStop {
    fn point(&self) -> GeoPoint {
        self.geocoded.point()
    }
}

#[derive(Debug)]
pub struct SelectionState {
    entries: Vec<SelectionEntry>,
    outcomes: HashMap<RecordId, GeocodeOutcome>,
    max_len: usize,
    next_generation: u64,
}

impl SelectionState {
    pub fn new(max_len: usize) -> Self {
        Self {
            entries: Vec::new(),
            outcomes: HashMap::new(),
            max_len,
            next_generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn contains(&self, record_id: &RecordId) -> bool {
        self.position(record_id).is_some()
    }

    pub fn order_of(&self, record_id: &RecordId) -> Option<usize> {
        self.position(record_id).map(|idx| self.entries[idx].order)
    }

    /// Appends an unselected record or removes a selected one.
    ///
    /// Removal drops the record's outcome and renumbers the remaining entries.
    /// Adding past `max_len` fails and leaves the selection untouched.
    pub fn toggle(&mut self, record: &SelectableRecord) -> Result<ToggleEffect> {
        if let Some(idx) = self.position(&record.record_id) {
            let removed = self.entries.remove(idx);
            self.outcomes.remove(&removed.record_id);
            self.renumber();
            log::debug!(
                "selection.toggle: removed record={} order={} remaining={}",
                removed.record_id,
                removed.order,
                self.entries.len()
            );
            return Ok(ToggleEffect::Deselected {
                order: removed.order,
            });
        }

        if self.entries.len() >= self.max_len {
            return Err(Error::SelectionFull {
                limit: self.max_len,
            });
        }

        let ticket = self.push(record);
        let order = self.entries.len();
        log::debug!(
            "selection.toggle: added record={} order={order}",
            record.record_id
        );
        Ok(ToggleEffect::Selected { order, ticket })
    }

    /// Appends every record not already selected, all or nothing with
    /// respect to `max_len`. Returns one ticket per newly added record.
    pub fn select_all(&mut self, records: &[SelectableRecord]) -> Result<Vec<GeocodeTicket>> {
        let mut fresh: Vec<&SelectableRecord> = Vec::new();
        for record in records {
            let seen = fresh.iter().any(|r| r.record_id == record.record_id);
            if !seen && !self.contains(&record.record_id) {
                fresh.push(record);
            }
        }
        if self.entries.len() + fresh.len() > self.max_len {
            return Err(Error::SelectionFull {
                limit: self.max_len,
            });
        }

        let tickets: Vec<GeocodeTicket> = fresh.into_iter().map(|r| self.push(r)).collect();
        log::debug!(
            "selection.select_all: added={} total={}",
            tickets.len(),
            self.entries.len()
        );
        Ok(tickets)
    }

    /// Records `outcome` if the ticket's selection is still live.
    pub fn apply_geocode(
        &mut self,
        ticket: &GeocodeTicket,
        outcome: GeocodeOutcome,
    ) -> CompletionEffect {
        let live = self
            .position(&ticket.record_id)
            .is_some_and(|idx| self.entries[idx].generation == ticket.generation);
        if !live {
            log::debug!(
                "selection.geocode: discard stale record={}",
                ticket.record_id
            );
            return CompletionEffect::Discarded {
                record_id: ticket.record_id.clone(),
            };
        }

        let success = outcome.is_success();
        if let Some(reason) = outcome.failure_reason() {
            log::warn!(
                "selection.geocode: failed record={} reason={reason}",
                ticket.record_id
            );
        } else {
            log::debug!("selection.geocode: ok record={}", ticket.record_id);
        }
        self.outcomes.insert(ticket.record_id.clone(), outcome);
        CompletionEffect::Recorded {
            record_id: ticket.record_id.clone(),
            success,
        }
    }

    /// Tickets for selected records that have no outcome yet, in selection order.
    pub fn pending_tickets(&self) -> Vec<GeocodeTicket> {
        self.entries
            .iter()
            .filter(|e| !self.outcomes.contains_key(&e.record_id))
            .map(ticket_for)
            .collect()
    }

    /// Drops every selection and outcome. Outstanding tickets become stale.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.outcomes.clear();
    }

    pub fn outcome(&self, record_id: &RecordId) -> Option<&GeocodeOutcome> {
        self.outcomes.get(record_id)
    }

    pub fn status(&self, record_id: &RecordId) -> Option<GeocodeStatus<'_>> {
        if !self.contains(record_id) {
            return None;
        }
        Some(match self.outcomes.get(record_id) {
            None => GeocodeStatus::Pending,
            Some(GeocodeOutcome::Success(address)) => GeocodeStatus::Success(address),
            Some(GeocodeOutcome::Failure { reason }) => GeocodeStatus::Failure(reason),
        })
    }

    /// Records whose geocoding failed, with the reason, in selection order.
    pub fn errored_records(&self) -> Vec<(&RecordId, &str)> {
        self.entries
            .iter()
            .filter_map(|e| match self.outcomes.get(&e.record_id) {
                Some(GeocodeOutcome::Failure { reason }) => Some((&e.record_id, reason.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn pending_records(&self) -> Vec<&RecordId> {
        self.entries
            .iter()
            .filter(|e| !self.outcomes.contains_key(&e.record_id))
            .map(|e| &e.record_id)
            .collect()
    }

    /// `Ok` when at least two records are selected and all geocoded successfully.
    pub fn readiness(&self) -> std::result::Result<(), NotReadyReason> {
        if self.entries.len() < MIN_ROUTE_POINTS {
            return Err(NotReadyReason::TooFewStops {
                selected: self.entries.len(),
            });
        }
        let failed = self.errored_records().len();
        if failed > 0 {
            return Err(NotReadyReason::GeocodingErrors { failed });
        }
        let pending = self.pending_records().len();
        if pending > 0 {
            return Err(NotReadyReason::StillGeocoding { pending });
        }
        Ok(())
    }

    pub fn is_ready_to_route(&self) -> bool {
        self.readiness().is_ok()
    }

    /// Successfully geocoded entries sorted by selection order.
    pub fn geocoded_in_selection_order(&self) -> Vec<GeocodedStop> {
        // entries are kept sorted by order
        self.entries
            .iter()
            .filter_map(|e| match self.outcomes.get(&e.record_id) {
                Some(GeocodeOutcome::Success(geocoded)) => Some(GeocodedStop {
                    record_id: e.record_id.clone(),
                    order: e.order,
                    geocoded: geocoded.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, record: &SelectableRecord) -> GeocodeTicket {
        let generation = self.next_generation;
        self.next_generation += 1;
        let entry = SelectionEntry {
            record_id: record.record_id.clone(),
            address: record.address.clone(),
            order: self.entries.len() + 1,
            generation,
        };
        let ticket = ticket_for(&entry);
        self.entries.push(entry);
        ticket
    }

    fn renumber(&mut self) {
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            entry.order = idx + 1;
        }
    }

    fn position(&self, record_id: &RecordId) -> Option<usize> {
        self.entries.iter().position(|e| &e.record_id == record_id)
    }
}

fn ticket_for(entry: &SelectionEntry) -> GeocodeTicket {
    GeocodeTicket {
        record_id: entry.record_id.clone(),
        address: entry.address.clone(),
        generation: entry.generation,
    }
}
