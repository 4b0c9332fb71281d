//! The teacher state store.
//!
//! Three request lifecycles (load-all, load-details, update-details) move the
//! store through pending and fulfilled/rejected states; everything else is a
//! synchronous mutation or a derived query. Each lifecycle hands out a
//! [`Ticket`] when it starts, and only the newest ticket of a lifecycle may
//! commit its result. Tickets are numbered store-wide, so a details result
//! issued before the last one written to `details` is dropped as well.
use std::cmp::Ordering;

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;

use super::{
    calendar, date_codec,
    error::{DateError, FetchError},
    models::teacher_model::{
        Address, Qualification, QualificationKind, ScheduleSlot, TeacherDetails,
        TeacherDetailsPatch, TeacherSnapshot,
    },
    teacher_fetcher::TeacherFetcher,
    time_slots,
};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherState {
    pub details: TeacherDetails,
    pub qualifications: Vec<Qualification>,
    pub addresses: Vec<Address>,
    pub schedule: Vec<ScheduleSlot>,
    pub loading: bool,
    pub details_loading: bool,
    pub is_editing: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    LoadAll,
    LoadDetails,
    UpdateDetails,
}

impl Lifecycle {
    fn index(self) -> usize {
        match self {
            Lifecycle::LoadAll => 0,
            Lifecycle::LoadDetails => 1,
            Lifecycle::UpdateDetails => 2,
        }
    }
}

/// Handle of one in-flight request.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    lifecycle: Lifecycle,
    generation: u64,
}

impl Ticket {
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

pub struct TeacherStore<F> {
    fetcher: F,
    state: TeacherState,
    generation: u64,
    /// Generation of the outstanding ticket of each lifecycle.
    pending: [Option<u64>; 3],
    /// Generation of the ticket whose result last replaced or merged `details`.
    details_generation: u64,
}

impl<F: TeacherFetcher> TeacherStore<F> {
    pub fn new(fetcher: F) -> Self {
        TeacherStore {
            fetcher,
            state: TeacherState::default(),
            generation: 0,
            pending: [None; 3],
            details_generation: 0,
        }
    }

    pub fn state(&self) -> &TeacherState {
        &self.state
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub async fn load_all(&mut self, teacher_id: &str) {
        let ticket = self.begin_load_all();
        let result = self.fetcher.fetch_all(teacher_id).await;
        self.finish_load_all(ticket, result);
    }

    pub async fn load_details(&mut self, teacher_id: &str) {
        let ticket = self.begin_load_details();
        let result = self.fetcher.fetch_details(teacher_id).await;
        self.finish_load_details(ticket, result);
    }

    /// Sends `patch` to the API and merges whatever comes back. A patch
    /// without an id is addressed to the current teacher, if one is loaded.
    pub async fn update_details(&mut self, mut patch: TeacherDetailsPatch) {
        if patch.id.is_none() {
            if self.state.details.id.is_empty() {
                warn!("No teacher loaded, sending details update without an id");
            } else {
                patch.id = Some(self.state.details.id.clone());
            }
        }
        let ticket = self.begin_update_details();
        let result = self.fetcher.update_details(patch).await;
        self.finish_update_details(ticket, result);
    }
}

impl<F> TeacherStore<F> {
    fn begin(&mut self, lifecycle: Lifecycle) -> Ticket {
        self.generation += 1;
        self.pending[lifecycle.index()] = Some(self.generation);
        self.state.error = None;
        self.sync_pending_flags();
        debug!("{:?} pending (generation {})", lifecycle, self.generation);
        Ticket {
            lifecycle,
            generation: self.generation,
        }
    }

    fn sync_pending_flags(&mut self) {
        self.state.loading = self.pending[Lifecycle::LoadAll.index()].is_some();
        self.state.details_loading = [Lifecycle::LoadDetails, Lifecycle::UpdateDetails]
            .iter()
            .any(|lifecycle| self.pending[lifecycle.index()].is_some());
    }

    /// Closes `ticket` if it is the outstanding one of `lifecycle`. A
    /// superseded ticket leaves the flags to the request that replaced it.
    fn settle(&mut self, ticket: Ticket, lifecycle: Lifecycle) -> bool {
        if ticket.lifecycle != lifecycle {
            warn!("{:?} ticket used to finish {:?}", ticket.lifecycle, lifecycle);
            return false;
        }
        let outstanding = self.pending[lifecycle.index()];
        if outstanding != Some(ticket.generation) {
            debug!(
                "Dropping stale {:?} result (generation {}, outstanding {:?})",
                lifecycle, ticket.generation, outstanding
            );
            return false;
        }
        self.pending[lifecycle.index()] = None;
        self.sync_pending_flags();
        true
    }

    /// Whether `details` already holds a result issued after `ticket`.
    fn details_superseded(&self, ticket: Ticket) -> bool {
        if ticket.generation < self.details_generation {
            debug!(
                "{:?} result (generation {}) is older than the details written by generation {}",
                ticket.lifecycle, ticket.generation, self.details_generation
            );
            return true;
        }
        false
    }

    /// Settles a details-only lifecycle, dropping its outcome when newer
    /// details have been written meanwhile.
    fn settle_details(&mut self, ticket: Ticket, lifecycle: Lifecycle) -> bool {
        self.settle(ticket, lifecycle) && !self.details_superseded(ticket)
    }

    pub fn begin_load_all(&mut self) -> Ticket {
        self.begin(Lifecycle::LoadAll)
    }

    /// Commits the outcome of a load-all request. Returns `false` when the
    /// ticket has been superseded and the result was dropped. Details written
    /// by a request issued later are kept.
    pub fn finish_load_all(
        &mut self,
        ticket: Ticket,
        result: Result<TeacherSnapshot, FetchError>,
    ) -> bool {
        if !self.settle(ticket, Lifecycle::LoadAll) {
            return false;
        }
        match result {
            Ok(snapshot) => {
                info!(
                    "Loaded teacher {} with {} qualifications and {} schedule slots",
                    snapshot.details.id,
                    snapshot.qualifications.len(),
                    snapshot.schedule.len()
                );
                if !self.details_superseded(ticket) {
                    self.details_generation = ticket.generation;
                    self.state.details = snapshot.details;
                }
                self.state.qualifications = snapshot.qualifications;
                self.state.addresses = snapshot.addresses;
                self.state.schedule = snapshot.schedule;
                sort_schedule(&mut self.state.schedule);
            }
            Err(err) => {
                warn!("Loading teacher data failed: {}", err);
                self.state.error = Some(format!("Failed to fetch teacher data: {}", err));
            }
        }
        true
    }

    pub fn begin_load_details(&mut self) -> Ticket {
        self.begin(Lifecycle::LoadDetails)
    }

    pub fn finish_load_details(
        &mut self,
        ticket: Ticket,
        result: Result<TeacherDetails, FetchError>,
    ) -> bool {
        if !self.settle_details(ticket, Lifecycle::LoadDetails) {
            return false;
        }
        match result {
            Ok(details) => {
                self.details_generation = ticket.generation;
                self.state.details = details;
            }
            Err(err) => {
                warn!("Loading teacher details failed: {}", err);
                self.state.error = Some(format!("Failed to fetch teacher details: {}", err));
            }
        }
        true
    }

    pub fn begin_update_details(&mut self) -> Ticket {
        self.begin(Lifecycle::UpdateDetails)
    }

    pub fn finish_update_details(
        &mut self,
        ticket: Ticket,
        result: Result<TeacherDetailsPatch, FetchError>,
    ) -> bool {
        if !self.settle_details(ticket, Lifecycle::UpdateDetails) {
            return false;
        }
        match result {
            Ok(patch) => {
                self.details_generation = ticket.generation;
                self.state.details.merge(&patch);
                self.state.is_editing = false;
            }
            Err(err) => {
                warn!("Updating teacher details failed: {}", err);
                self.state.error = Some(format!("Failed to update teacher data: {}", err));
            }
        }
        true
    }

    /// Does not snapshot the details; discarding unsaved edits is up to the caller.
    pub fn set_editing(&mut self, editing: bool) {
        self.state.is_editing = editing;
    }

    /// Merges `patch` locally, without asking the API.
    pub fn update_teacher_details(&mut self, patch: &TeacherDetailsPatch) {
        self.state.details.merge(patch);
    }

    pub fn add_qualification(&mut self, qualification: Qualification) {
        self.state.qualifications.push(qualification);
    }

    /// Builds a qualification with a fresh id, adds it and returns the id.
    pub fn new_qualification(&mut self, name: &str, rate: &str, kind: QualificationKind) -> String {
        let qualification = Qualification::new(name, rate, kind);
        let id = qualification.id.clone();
        self.add_qualification(qualification);
        id
    }

    pub fn update_qualification(&mut self, qualification: Qualification) {
        if let Some(existing) = self
            .state
            .qualifications
            .iter_mut()
            .find(|q| q.id == qualification.id)
        {
            *existing = qualification;
        }
    }

    pub fn remove_qualification(&mut self, id: &str) {
        self.state.qualifications.retain(|q| q.id != id);
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    /// Stable sort by date only; slots with unreadable dates go last.
    pub fn sort_schedule_by_date(&mut self) {
        self.state
            .schedule
            .sort_by_cached_key(|slot| date_key(&slot.date));
    }

    /// Slots dated within `[start, end]`. The stored schedule is left as is.
    pub fn filter_schedule_by_date_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<&ScheduleSlot>, DateError> {
        let start = date_codec::decode(start)?;
        let end = date_codec::decode(end)?;
        Ok(self
            .state
            .schedule
            .iter()
            .filter(|slot| match date_codec::decode(&slot.date) {
                Ok(date) => start <= date && date <= end,
                Err(err) => {
                    warn!("Skipping schedule slot {}: {}", slot.id, err);
                    false
                }
            })
            .collect())
    }

    pub fn qualifications_of(
        &self,
        kind: QualificationKind,
    ) -> impl Iterator<Item = &Qualification> + '_ {
        self.state
            .qualifications
            .iter()
            .filter(move |q| q.kind == kind)
    }

    pub fn slots_on(&self, date: NaiveDate) -> Vec<&ScheduleSlot> {
        calendar::slots_on(&self.state.schedule, date)
    }

    pub fn slot_at(&self, date: NaiveDate, slot_index: usize) -> Option<&ScheduleSlot> {
        calendar::slot_at(&self.state.schedule, date, slot_index)
    }

    pub fn is_scheduled(&self, date: NaiveDate, slot_index: usize) -> bool {
        self.slot_at(date, slot_index).is_some()
    }
}

/// `(unreadable, date)`, so that readable dates come first in order.
fn date_key(date: &str) -> (bool, Option<NaiveDate>) {
    match date_codec::decode(date) {
        Ok(date) => (false, Some(date)),
        Err(_) => (true, None),
    }
}

/// Unknown labels go after every known one.
fn start_key(start_time: &str) -> usize {
    time_slots::slot_index(start_time).unwrap_or(usize::MAX)
}

/// Orders by date, then by start time on the clock.
pub fn sort_schedule(schedule: &mut [ScheduleSlot]) {
    schedule.sort_by(schedule_order);
}

/// `Ordering` of two slots as [`sort_schedule`] sees it.
pub fn schedule_order(fst: &ScheduleSlot, snd: &ScheduleSlot) -> Ordering {
    date_key(&fst.date)
        .cmp(&date_key(&snd.date))
        .then_with(|| start_key(&fst.start_time).cmp(&start_key(&snd.start_time)))
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
