//! Per-user view state.
//!
//! A `Session` is everything the screen shows: the selected day, the events
//! loaded around it and the open form, if any. It is passed explicitly to
//! each controller operation.
//!
//! Reloads can overlap (the user taps another day while a load is in
//! flight). Each reload takes a ticket with a generation number; only the
//! ticket from the most recent `start_reload` may replace the events, older
//! ones are discarded.

use chrono::NaiveTime;
use chrono_tz::Tz;
use tracing::debug;

use crate::day::DayKey;
use crate::error::{DaymarkError, DaymarkResult};
use crate::event::{Event, EventDraft};
use crate::marks::{self, MarkedDates};
use crate::window::Window;

/// Form lifecycle: `Idle -> Editing -> Submitting -> Idle | Editing`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FormState {
    #[default]
    Idle,
    Editing(EventDraft),
    Submitting(EventDraft),
}

/// A pending reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadTicket {
    pub generation: u64,
    pub day: DayKey,
    pub window: Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The session now shows this many events.
    Applied(usize),
    /// A newer reload was started; this result was discarded.
    Stale,
}

#[derive(Debug, Clone)]
pub struct Session {
    tz: Tz,
    selected: DayKey,
    events: Vec<Event>,
    window: Option<Window>,
    form: FormState,
    generation: u64,
}

impl Session {
    pub fn new(selected: DayKey, tz: Tz) -> Self {
        Session {
            tz,
            selected,
            events: Vec::new(),
            window: None,
            form: FormState::Idle,
            generation: 0,
        }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    pub fn selected(&self) -> DayKey {
        self.selected
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The window the current events were loaded for.
    pub fn window(&self) -> Option<Window> {
        self.window
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn find_event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id.as_str() == id)
    }

    // VIEW:

    /// Days with events plus the selected day.
    pub fn marked_dates(&self) -> MarkedDates {
        marks::bucket_by_day(&self.events, Some(self.selected), &self.tz)
    }

    pub fn events_for_day(&self, day: DayKey) -> Vec<&Event> {
        marks::events_on_day(&self.events, day, &self.tz)
    }

    pub fn events_for_selected_day(&self) -> Vec<&Event> {
        self.events_for_day(self.selected)
    }

    // RELOADS:

    /// Select `day` and issue a ticket for loading its window.
    pub fn start_reload(&mut self, day: DayKey) -> ReloadTicket {
        self.selected = day;
        self.generation += 1;
        ReloadTicket {
            generation: self.generation,
            day,
            window: Window::around(day, &self.tz),
        }
    }

    /// Apply the result of a reload.
    ///
    /// Stale tickets are dropped whatever their result. A failed current
    /// reload leaves the displayed events as they were.
    pub fn finish_reload(
        &mut self,
        ticket: ReloadTicket,
        result: DaymarkResult<Vec<Event>>,
    ) -> DaymarkResult<ReloadOutcome> {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                day = %ticket.day,
                "discarding stale reload"
            );
            return Ok(ReloadOutcome::Stale);
        }

        let events = result?;
        let count = events.len();
        self.events = events;
        self.window = Some(ticket.window);
        Ok(ReloadOutcome::Applied(count))
    }

    // FORM:

    /// Open a blank form on the selected day at local `time`.
    pub fn begin_create(&mut self, time: NaiveTime) -> DaymarkResult<&mut EventDraft> {
        let draft = EventDraft::starting_on(self.selected, time, &self.tz);
        self.open_form(draft)
    }

    /// Open a form pre-filled from an existing event.
    pub fn begin_edit(&mut self, event: &Event) -> DaymarkResult<&mut EventDraft> {
        self.open_form(EventDraft::from(event))
    }

    fn open_form(&mut self, draft: EventDraft) -> DaymarkResult<&mut EventDraft> {
        if matches!(self.form, FormState::Submitting(_)) {
            return Err(DaymarkError::FormBusy);
        }
        self.form = FormState::Editing(draft);
        self.draft_mut().ok_or(DaymarkError::NoActiveForm)
    }

    /// The draft being edited, if the form is open and not submitting.
    pub fn draft_mut(&mut self) -> Option<&mut EventDraft> {
        match &mut self.form {
            FormState::Editing(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn cancel_form(&mut self) -> DaymarkResult<()> {
        if matches!(self.form, FormState::Submitting(_)) {
            return Err(DaymarkError::FormBusy);
        }
        self.form = FormState::Idle;
        Ok(())
    }

    /// Move the form to `Submitting` and hand out the draft.
    pub(crate) fn take_for_submit(&mut self) -> DaymarkResult<EventDraft> {
        match std::mem::take(&mut self.form) {
            FormState::Editing(draft) => {
                self.form = FormState::Submitting(draft.clone());
                Ok(draft)
            }
            FormState::Submitting(draft) => {
                self.form = FormState::Submitting(draft);
                Err(DaymarkError::FormBusy)
            }
            FormState::Idle => Err(DaymarkError::NoActiveForm),
        }
    }

    /// Back to `Editing` with the draft the user submitted.
    pub(crate) fn submit_failed(&mut self, draft: EventDraft) {
        self.form = FormState::Editing(draft);
    }

    pub(crate) fn submit_succeeded(&mut self) {
        self.form = FormState::Idle;
    }
}
