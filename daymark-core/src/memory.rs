//! In-process calendar storage.
//!
//! `EventStore` is a plain list of calendars and events with the operations a
//! provider needs. The local provider persists one to disk; `InMemoryGateway`
//! wraps one behind the `CalendarGateway` contract for embedding and tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DaymarkError, DaymarkResult};
use crate::event::{Event, EventDraft, EventId};
use crate::gateway::{CalendarGateway, CalendarHandle, Granted};
use crate::window::Window;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventStore {
    #[serde(default)]
    pub calendars: Vec<CalendarHandle>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl EventStore {
    /// A store with a single primary calendar.
    pub fn with_calendar(calendar: CalendarHandle) -> Self {
        EventStore {
            calendars: vec![calendar],
            events: Vec::new(),
        }
    }

    /// Events in a calendar overlapping `window`, in insertion order.
    pub fn list(&self, calendar_id: &str, window: &Window) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.calendar_id == calendar_id && window.overlaps(&e.start, &e.end))
            .cloned()
            .collect()
    }

    pub fn insert(&mut self, calendar_id: &str, draft: &EventDraft) -> DaymarkResult<EventId> {
        if !self.calendars.iter().any(|c| c.id == calendar_id) {
            return Err(DaymarkError::Provider(format!(
                "Calendar '{}' does not exist",
                calendar_id
            )));
        }

        let id = EventId::new(Uuid::new_v4().to_string());
        let mut draft = draft.clone();
        draft.id = None;
        self.events.push(draft.into_event(id.clone(), calendar_id));
        Ok(id)
    }

    /// Replace an event's fields, keeping its id and calendar.
    pub fn update(&mut self, id: &EventId, draft: &EventDraft) -> DaymarkResult<()> {
        let event = self
            .events
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| DaymarkError::Provider(format!("Event '{}' not found", id)))?;

        let calendar_id = event.calendar_id.clone();
        *event = draft.clone().into_event(id.clone(), &calendar_id);
        Ok(())
    }

    pub fn remove(&mut self, id: &EventId) -> DaymarkResult<()> {
        let before = self.events.len();
        self.events.retain(|e| &e.id != id);
        if self.events.len() == before {
            return Err(DaymarkError::Provider(format!("Event '{}' not found", id)));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    store: EventStore,
    deny_access: bool,
    granted: bool,
    fail_next: Option<String>,
    fail_next_list: Option<String>,
    mutations: usize,
}

/// A `CalendarGateway` over an in-process `EventStore`.
///
/// Clones share the same store, so a test can keep one handle to inspect
/// what the controller wrote through another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryGateway {
    /// A gateway with one primary calendar named "Personal".
    pub fn new() -> Self {
        Self::from_store(EventStore::with_calendar(CalendarHandle::new(
            "personal", "Personal", true,
        )))
    }

    pub fn from_store(store: EventStore) -> Self {
        InMemoryGateway {
            state: Arc::new(Mutex::new(MemoryState {
                store,
                ..Default::default()
            })),
        }
    }

    /// Refuse calendar access from now on.
    pub fn deny_access(&self) {
        let mut state = self.lock();
        state.deny_access = true;
        state.granted = false;
    }

    /// Make the next provider call fail with `DaymarkError::Provider(message)`.
    pub fn fail_next_call(&self, message: &str) {
        self.lock().fail_next = Some(message.to_string());
    }

    /// Make the next `list_events` call fail, leaving other calls alone.
    pub fn fail_next_list(&self, message: &str) {
        self.lock().fail_next_list = Some(message.to_string());
    }

    /// Store a draft directly, bypassing access checks.
    pub fn seed(&self, calendar_id: &str, draft: &EventDraft) -> DaymarkResult<EventId> {
        self.lock().store.insert(calendar_id, draft)
    }

    pub fn snapshot(&self) -> EventStore {
        self.lock().store.clone()
    }

    /// Number of create/update/delete calls that reached the store.
    pub fn mutation_count(&self) -> usize {
        self.lock().mutations
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Access check plus any injected failure, shared by every call.
    fn guard(&self) -> DaymarkResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        if !state.granted {
            return Err(DaymarkError::PermissionDenied);
        }
        if let Some(message) = state.fail_next.take() {
            return Err(DaymarkError::Provider(message));
        }
        Ok(state)
    }
}

#[async_trait]
impl CalendarGateway for InMemoryGateway {
    async fn request_access(&self) -> DaymarkResult<Granted> {
        let mut state = self.lock();
        if state.deny_access {
            return Err(DaymarkError::PermissionDenied);
        }
        state.granted = true;
        Ok(Granted)
    }

    async fn list_calendars(&self) -> DaymarkResult<Vec<CalendarHandle>> {
        Ok(self.guard()?.store.calendars.clone())
    }

    async fn list_events(
        &self,
        calendar: &CalendarHandle,
        window: &Window,
    ) -> DaymarkResult<Vec<Event>> {
        let mut state = self.guard()?;
        if let Some(message) = state.fail_next_list.take() {
            return Err(DaymarkError::Provider(message));
        }
        let events = state.store.list(&calendar.id, window);
        debug!(calendar = %calendar.id, %window, count = events.len(), "listed events");
        Ok(events)
    }

    async fn create_event(
        &self,
        calendar: &CalendarHandle,
        draft: &EventDraft,
    ) -> DaymarkResult<EventId> {
        let mut state = self.guard()?;
        state.mutations += 1;
        state.store.insert(&calendar.id, draft)
    }

    async fn update_event(&self, id: &EventId, draft: &EventDraft) -> DaymarkResult<()> {
        let mut state = self.guard()?;
        state.mutations += 1;
        state.store.update(id, draft)
    }

    async fn delete_event(&self, id: &EventId) -> DaymarkResult<()> {
        let mut state = self.guard()?;
        state.mutations += 1;
        state.store.remove(id)
    }
}
