//! Fulfillment-time selection against the availability service.
//!
//! One [`ScheduleSession`] per checkout drives the flow
//! `Idle -> DateSelected -> SlotsLoading -> SlotsLoaded -> SlotSelected ->
//! Confirmed`, with `SlotsError` as the recoverable branch after a failed
//! fetch (retry re-issues the fetch for the currently selected date).
//!
//! Slot fetches race: the user can pick a new date while an older fetch is
//! still in flight. The session hands out a [`FetchTicket`] per fetch and
//! discards any response whose ticket is no longer current, so the visible
//! slot list always belongs to the latest selection. There is no true
//! cancellation; the stale response simply lands in [`SlotOutcome::Stale`].

use async_trait::async_trait;
use chrono::{DateTime, Days, Local, LocalResult, NaiveDate};
use plateful_core::{FulfillmentMethod, FulfillmentSelection, ScheduleSlot};
use thiserror::Error;
use tracing::debug;

use crate::api::ApiError;

/// Days offered for scheduling when the deployment does not override it.
pub const DEFAULT_HORIZON_DAYS: u16 = 7;

// ============================================================================
// Errors and sources
// ============================================================================

/// Errors from the scheduling flow.
///
/// Everything here is user-recoverable by re-selecting; network failures are
/// not errors at this level, they park the session in
/// [`ScheduleState::SlotsError`] instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The requested transition needs input the session does not have, or
    /// the composed time is invalid.
    #[error("invalid selection: {reason}")]
    InvalidSelection { reason: String },
}

impl ScheduleError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidSelection {
            reason: reason.into(),
        }
    }
}

/// Where slot lists come from.
///
/// The production implementation is
/// [`AvailabilityClient`](crate::api::AvailabilityClient); tests substitute
/// canned sources.
#[async_trait]
pub trait SlotSource: Send + Sync {
    /// Fetch the bookable slots for one date and fulfillment method.
    ///
    /// An empty list is a normal answer, not an error.
    async fn fetch_slots(
        &self,
        date: NaiveDate,
        method: FulfillmentMethod,
    ) -> Result<Vec<ScheduleSlot>, ApiError>;
}

// ============================================================================
// States and tickets
// ============================================================================

/// Where the session currently is in the scheduling flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    /// Nothing selected yet.
    Idle,
    /// A date is selected, no slots fetched for it.
    DateSelected,
    /// A fetch is in flight.
    SlotsLoading,
    /// Slots (possibly none) arrived for the selected date.
    SlotsLoaded,
    /// The last fetch failed; retry available.
    SlotsError,
    /// A slot from the loaded list is selected.
    SlotSelected,
    /// Date and slot composed into a confirmed future timestamp.
    Confirmed,
}

/// Proof of one slot fetch, issued by [`ScheduleSession::begin_load`].
///
/// Deliberately neither `Clone` nor `Copy`: each ticket is consumed by
/// exactly one [`ScheduleSession::apply_slots`] call.
#[derive(Debug)]
pub struct FetchTicket {
    generation: u64,
    date: NaiveDate,
    method: FulfillmentMethod,
}

impl FetchTicket {
    /// Date the fetch is for.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Fulfillment method the fetch is for.
    #[must_use]
    pub const fn method(&self) -> FulfillmentMethod {
        self.method
    }
}

/// What became of one fetch response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SlotOutcome {
    /// The response was current and now drives the session state.
    Applied,
    /// The selection moved on while the fetch was in flight; discarded.
    Stale,
}

// ============================================================================
// Candidate days
// ============================================================================

/// The contiguous run of calendar days offered for scheduling, starting at
/// `base`'s own date.
#[must_use]
pub fn candidate_days(base: DateTime<Local>, horizon_days: u16) -> Vec<NaiveDate> {
    let start = base.date_naive();
    (0..u64::from(horizon_days))
        .filter_map(|offset| start.checked_add_days(Days::new(offset)))
        .collect()
}

// ============================================================================
// ScheduleSession
// ============================================================================

/// State machine for picking a fulfillment time.
///
/// All methods are synchronous apart from [`Self::load_slots`]; the UI owns
/// the awaiting.
#[derive(Debug)]
pub struct ScheduleSession {
    method: FulfillmentMethod,
    horizon_days: u16,
    state: ScheduleState,
    generation: u64,
    selected_date: Option<NaiveDate>,
    slots: Option<Vec<ScheduleSlot>>,
    selected_slot: Option<ScheduleSlot>,
    confirmed_time: Option<DateTime<Local>>,
    last_error: Option<String>,
}

impl ScheduleSession {
    /// Start a session for the given fulfillment method.
    #[must_use]
    pub const fn new(method: FulfillmentMethod, horizon_days: u16) -> Self {
        Self {
            method,
            horizon_days,
            state: ScheduleState::Idle,
            generation: 0,
            selected_date: None,
            slots: None,
            selected_slot: None,
            confirmed_time: None,
            last_error: None,
        }
    }

    /// Current flow state.
    #[must_use]
    pub const fn state(&self) -> ScheduleState {
        self.state
    }

    /// Fulfillment method availability is being checked for.
    #[must_use]
    pub const fn method(&self) -> FulfillmentMethod {
        self.method
    }

    /// The selected calendar day, if any.
    #[must_use]
    pub const fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    /// The current slot list: `None` before any successful fetch, `Some`
    /// (possibly empty) after one.
    #[must_use]
    pub fn slots(&self) -> Option<&[ScheduleSlot]> {
        self.slots.as_deref()
    }

    /// The selected slot, if any.
    #[must_use]
    pub const fn selected_slot(&self) -> Option<ScheduleSlot> {
        self.selected_slot
    }

    /// The confirmed absolute time, once [`Self::confirm_at`] has succeeded.
    #[must_use]
    pub const fn confirmed_time(&self) -> Option<DateTime<Local>> {
        self.confirmed_time
    }

    /// Message from the last failed fetch, while in
    /// [`ScheduleState::SlotsError`].
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Days the user may pick from, starting today.
    #[must_use]
    pub fn candidate_days_from(&self, base: DateTime<Local>) -> Vec<NaiveDate> {
        candidate_days(base, self.horizon_days)
    }

    /// Select a calendar day.
    ///
    /// Always allowed; re-selecting (even after confirmation) restarts the
    /// flow at [`ScheduleState::DateSelected`] and invalidates any fetch
    /// still in flight.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.generation += 1;
        self.selected_date = Some(date);
        self.slots = None;
        self.selected_slot = None;
        self.confirmed_time = None;
        self.last_error = None;
        self.state = ScheduleState::DateSelected;
    }

    /// Switch between pickup and delivery.
    ///
    /// Availability differs by method, so a change throws away any fetched
    /// slots and selection and returns to [`ScheduleState::DateSelected`]
    /// (or [`ScheduleState::Idle`] when no date was picked). Setting the
    /// same method again is a no-op.
    pub fn set_method(&mut self, method: FulfillmentMethod) {
        if method == self.method {
            return;
        }

        self.method = method;
        self.generation += 1;
        self.slots = None;
        self.selected_slot = None;
        self.confirmed_time = None;
        self.last_error = None;
        self.state = if self.selected_date.is_some() {
            ScheduleState::DateSelected
        } else {
            ScheduleState::Idle
        };
    }

    /// Start a slot fetch for the selected date.
    ///
    /// Also the retry path after [`ScheduleState::SlotsError`]. The returned
    /// ticket must be passed back to [`Self::apply_slots`] with the fetch
    /// result; any previously issued ticket becomes stale.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidSelection`] when no date is selected.
    pub fn begin_load(&mut self) -> Result<FetchTicket, ScheduleError> {
        let date = self
            .selected_date
            .ok_or_else(|| ScheduleError::invalid("no date selected"))?;

        self.generation += 1;
        self.state = ScheduleState::SlotsLoading;
        self.last_error = None;

        Ok(FetchTicket {
            generation: self.generation,
            date,
            method: self.method,
        })
    }

    /// Re-issue the fetch for the currently selected date after a failure.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidSelection`] when no date is selected.
    pub fn retry(&mut self) -> Result<FetchTicket, ScheduleError> {
        self.begin_load()
    }

    /// Feed a fetch response back into the session.
    ///
    /// Responses for a superseded ticket are discarded: the visible slot
    /// list stays whatever is current for the latest selection. A current
    /// `Ok` moves to [`ScheduleState::SlotsLoaded`] (an empty list is
    /// valid); a current `Err` moves to [`ScheduleState::SlotsError`].
    pub fn apply_slots(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<ScheduleSlot>, ApiError>,
    ) -> SlotOutcome {
        if ticket.generation != self.generation {
            debug!(
                date = %ticket.date,
                method = %ticket.method,
                "Discarding stale slot response"
            );
            return SlotOutcome::Stale;
        }

        match result {
            Ok(slots) => {
                self.slots = Some(slots);
                self.state = ScheduleState::SlotsLoaded;
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                self.state = ScheduleState::SlotsError;
            }
        }

        SlotOutcome::Applied
    }

    /// Fetch and apply slots for the selected date in one step.
    ///
    /// Equivalent to [`Self::begin_load`], awaiting the source, then
    /// [`Self::apply_slots`]; the outcome is [`SlotOutcome::Stale`] when the
    /// selection changed while the fetch was in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidSelection`] when no date is selected.
    pub async fn load_slots(
        &mut self,
        source: &(impl SlotSource + ?Sized),
    ) -> Result<SlotOutcome, ScheduleError> {
        let ticket = self.begin_load()?;
        let result = source.fetch_slots(ticket.date(), ticket.method()).await;
        Ok(self.apply_slots(ticket, result))
    }

    /// Select a slot from the loaded list.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidSelection`] when no slot list is
    /// loaded or the slot is not in it.
    pub fn select_slot(&mut self, slot: ScheduleSlot) -> Result<(), ScheduleError> {
        let Some(slots) = self.slots.as_deref() else {
            return Err(ScheduleError::invalid("no slots loaded"));
        };
        if !slots.contains(&slot) {
            return Err(ScheduleError::invalid(
                "slot is not in the current availability list",
            ));
        }

        self.selected_slot = Some(slot);
        self.state = ScheduleState::SlotSelected;
        Ok(())
    }

    /// Compose the selected date and slot into an absolute local timestamp
    /// and confirm it.
    ///
    /// The composed time must be strictly after `now`. During a DST
    /// fall-back the earlier of the two wall-clock readings is taken; a
    /// time skipped by spring-forward does not exist and is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidSelection`] when date or slot is
    /// unset, the composed time does not exist locally, or it is not in the
    /// future.
    pub fn confirm_at(&mut self, now: DateTime<Local>) -> Result<DateTime<Local>, ScheduleError> {
        let date = self
            .selected_date
            .ok_or_else(|| ScheduleError::invalid("no date selected"))?;
        let slot = self
            .selected_slot
            .ok_or_else(|| ScheduleError::invalid("no slot selected"))?;

        let composed = match date.and_time(slot.start).and_local_timezone(Local) {
            LocalResult::Single(time) => time,
            LocalResult::Ambiguous(earlier, _) => earlier,
            LocalResult::None => {
                return Err(ScheduleError::invalid(
                    "selected time does not exist in the local timezone",
                ));
            }
        };

        if composed <= now {
            return Err(ScheduleError::invalid(
                "selected time is not in the future",
            ));
        }

        debug!(time = %composed, method = %self.method, "Schedule confirmed");
        self.confirmed_time = Some(composed);
        self.state = ScheduleState::Confirmed;
        Ok(composed)
    }

    /// Confirm against the current wall clock.
    ///
    /// # Errors
    ///
    /// Same as [`Self::confirm_at`].
    pub fn confirm(&mut self) -> Result<DateTime<Local>, ScheduleError> {
        self.confirm_at(Local::now())
    }

    /// The confirmed session as a fulfillment selection, once confirmed.
    #[must_use]
    pub fn fulfillment_selection(&self) -> Option<FulfillmentSelection> {
        self.confirmed_time
            .map(|time| FulfillmentSelection::scheduled(self.method, time))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn slot(hour: u32, minute: u32) -> ScheduleSlot {
        ScheduleSlot::new(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
    }

    fn tomorrow() -> NaiveDate {
        Local::now()
            .date_naive()
            .checked_add_days(Days::new(1))
            .unwrap()
    }

    struct FixedSlots(Vec<ScheduleSlot>);

    #[async_trait]
    impl SlotSource for FixedSlots {
        async fn fetch_slots(
            &self,
            _date: NaiveDate,
            _method: FulfillmentMethod,
        ) -> Result<Vec<ScheduleSlot>, ApiError> {
            Ok(self.0.clone())
        }
    }

    fn fetch_failure() -> ApiError {
        ApiError::Api {
            status: 503,
            message: "unavailable".to_string(),
        }
    }

    #[test]
    fn test_candidate_days_contiguous_from_base() {
        let base = Local::now();
        let days = candidate_days(base, 7);

        assert_eq!(days.len(), 7);
        assert_eq!(days.first(), Some(&base.date_naive()));
        for (prev, next) in days.iter().zip(days.iter().skip(1)) {
            assert_eq!(*next, prev.checked_add_days(Days::new(1)).unwrap());
        }
    }

    #[test]
    fn test_begin_load_requires_date() {
        let mut session = ScheduleSession::new(FulfillmentMethod::Pickup, 7);
        assert!(session.begin_load().is_err());
        assert_eq!(session.state(), ScheduleState::Idle);
    }

    #[test]
    fn test_happy_path_to_confirmed() {
        let mut session = ScheduleSession::new(FulfillmentMethod::Pickup, 7);
        let date = tomorrow();

        session.select_date(date);
        assert_eq!(session.state(), ScheduleState::DateSelected);

        let ticket = session.begin_load().unwrap();
        assert_eq!(session.state(), ScheduleState::SlotsLoading);
        assert_eq!(ticket.date(), date);

        let outcome = session.apply_slots(ticket, Ok(vec![slot(13, 30), slot(14, 0)]));
        assert_eq!(outcome, SlotOutcome::Applied);
        assert_eq!(session.state(), ScheduleState::SlotsLoaded);

        session.select_slot(slot(13, 30)).unwrap();
        assert_eq!(session.state(), ScheduleState::SlotSelected);

        let confirmed = session.confirm().unwrap();
        assert_eq!(session.state(), ScheduleState::Confirmed);
        assert_eq!(confirmed.date_naive(), date);
        assert_eq!(
            session.fulfillment_selection().unwrap().scheduled_time,
            Some(confirmed)
        );
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = ScheduleSession::new(FulfillmentMethod::Pickup, 7);
        let d1 = tomorrow();
        let d2 = d1.checked_add_days(Days::new(1)).unwrap();

        session.select_date(d1);
        let first_ticket = session.begin_load().unwrap();

        // User picks a new date before the first fetch resolves.
        session.select_date(d2);
        let second_ticket = session.begin_load().unwrap();

        let current = vec![slot(18, 0)];
        assert_eq!(
            session.apply_slots(second_ticket, Ok(current.clone())),
            SlotOutcome::Applied
        );

        // The late response for the first date arrives and must not win.
        assert_eq!(
            session.apply_slots(first_ticket, Ok(vec![slot(9, 0)])),
            SlotOutcome::Stale
        );
        assert_eq!(session.slots(), Some(current.as_slice()));
        assert_eq!(session.selected_date(), Some(d2));
    }

    #[test]
    fn test_empty_slot_list_is_loaded_not_error() {
        let mut session = ScheduleSession::new(FulfillmentMethod::Delivery, 7);
        session.select_date(tomorrow());

        let ticket = session.begin_load().unwrap();
        let outcome = session.apply_slots(ticket, Ok(Vec::new()));

        assert_eq!(outcome, SlotOutcome::Applied);
        assert_eq!(session.state(), ScheduleState::SlotsLoaded);
        assert_eq!(session.slots(), Some(&[][..]));
        assert!(session.select_slot(slot(12, 0)).is_err());
    }

    #[test]
    fn test_fetch_failure_then_retry() {
        let mut session = ScheduleSession::new(FulfillmentMethod::Pickup, 7);
        session.select_date(tomorrow());

        let ticket = session.begin_load().unwrap();
        let outcome = session.apply_slots(ticket, Err(fetch_failure()));
        assert_eq!(outcome, SlotOutcome::Applied);
        assert_eq!(session.state(), ScheduleState::SlotsError);
        assert!(session.last_error().unwrap().contains("503"));

        let ticket = session.retry().unwrap();
        let outcome = session.apply_slots(ticket, Ok(vec![slot(11, 0)]));
        assert_eq!(outcome, SlotOutcome::Applied);
        assert_eq!(session.state(), ScheduleState::SlotsLoaded);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_method_change_invalidates_slots() {
        let mut session = ScheduleSession::new(FulfillmentMethod::Pickup, 7);
        session.select_date(tomorrow());
        let ticket = session.begin_load().unwrap();
        let _ = session.apply_slots(ticket, Ok(vec![slot(12, 0)]));
        session.select_slot(slot(12, 0)).unwrap();

        session.set_method(FulfillmentMethod::Delivery);

        assert_eq!(session.state(), ScheduleState::DateSelected);
        assert!(session.slots().is_none());
        assert!(session.selected_slot().is_none());
    }

    #[test]
    fn test_same_method_is_no_op() {
        let mut session = ScheduleSession::new(FulfillmentMethod::Pickup, 7);
        session.select_date(tomorrow());
        let ticket = session.begin_load().unwrap();
        let _ = session.apply_slots(ticket, Ok(vec![slot(12, 0)]));

        session.set_method(FulfillmentMethod::Pickup);

        assert_eq!(session.state(), ScheduleState::SlotsLoaded);
        assert!(session.slots().is_some());
    }

    #[test]
    fn test_confirm_rejects_past_time() {
        let mut session = ScheduleSession::new(FulfillmentMethod::Pickup, 7);
        let yesterday = Local::now()
            .date_naive()
            .checked_sub_days(Days::new(1))
            .unwrap();

        session.select_date(yesterday);
        let ticket = session.begin_load().unwrap();
        let _ = session.apply_slots(ticket, Ok(vec![slot(12, 0)]));
        session.select_slot(slot(12, 0)).unwrap();

        let err = session.confirm().unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidSelection { .. }));
        assert_ne!(session.state(), ScheduleState::Confirmed);
    }

    #[test]
    fn test_confirm_requires_slot() {
        let mut session = ScheduleSession::new(FulfillmentMethod::Pickup, 7);
        session.select_date(tomorrow());

        let err = session.confirm().unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidSelection { .. }));
    }

    #[test]
    fn test_membership_enforced_on_select_slot() {
        let mut session = ScheduleSession::new(FulfillmentMethod::Pickup, 7);
        session.select_date(tomorrow());
        let ticket = session.begin_load().unwrap();
        let _ = session.apply_slots(ticket, Ok(vec![slot(10, 0)]));

        assert!(session.select_slot(slot(10, 30)).is_err());
        assert_eq!(session.state(), ScheduleState::SlotsLoaded);
    }

    #[tokio::test]
    async fn test_load_slots_convenience() {
        let mut session = ScheduleSession::new(FulfillmentMethod::Pickup, 7);
        session.select_date(tomorrow());

        let source = FixedSlots(vec![slot(13, 30)]);
        let outcome = session.load_slots(&source).await.unwrap();

        assert_eq!(outcome, SlotOutcome::Applied);
        assert_eq!(session.slots().map(<[ScheduleSlot]>::len), Some(1));
    }
}
