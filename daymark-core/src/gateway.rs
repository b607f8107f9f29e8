//! Calendar provider contract.
//!
//! A gateway is anything that can store events on the user's behalf: a
//! provider subprocess, an in-process store, a platform calendar. Access
//! must be requested first; until it is granted every other call fails with
//! `PermissionDenied`.
//!
//! Calls are never retried here. Creates, updates and deletes are not
//! idempotent, so a failure is handed back to the caller as-is.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{DaymarkError, DaymarkResult};
use crate::event::{Event, EventDraft, EventId};
use crate::window::Window;

/// Proof that the provider granted calendar access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Granted;

/// A calendar exposed by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarHandle {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_primary: bool,
}

impl CalendarHandle {
    pub fn new(id: impl Into<String>, title: impl Into<String>, is_primary: bool) -> Self {
        CalendarHandle {
            id: id.into(),
            title: title.into(),
            is_primary,
        }
    }
}

/// The primary calendar, or the first one when none is flagged primary.
pub fn pick_default(calendars: Vec<CalendarHandle>) -> DaymarkResult<CalendarHandle> {
    let primary = calendars.iter().position(|c| c.is_primary).unwrap_or(0);
    calendars
        .into_iter()
        .nth(primary)
        .ok_or(DaymarkError::CalendarNotFound)
}

#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Ask the provider for calendar access.
    async fn request_access(&self) -> DaymarkResult<Granted>;

    async fn list_calendars(&self) -> DaymarkResult<Vec<CalendarHandle>>;

    /// The calendar new events go to.
    async fn resolve_default_calendar(&self) -> DaymarkResult<CalendarHandle> {
        pick_default(self.list_calendars().await?)
    }

    /// Events in `calendar` overlapping `window`, in provider order.
    async fn list_events(
        &self,
        calendar: &CalendarHandle,
        window: &Window,
    ) -> DaymarkResult<Vec<Event>>;

    async fn create_event(
        &self,
        calendar: &CalendarHandle,
        draft: &EventDraft,
    ) -> DaymarkResult<EventId>;

    async fn update_event(&self, id: &EventId, draft: &EventDraft) -> DaymarkResult<()>;

    async fn delete_event(&self, id: &EventId) -> DaymarkResult<()>;
}

#[async_trait]
impl<G: CalendarGateway + ?Sized> CalendarGateway for std::sync::Arc<G> {
    async fn request_access(&self) -> DaymarkResult<Granted> {
        (**self).request_access().await
    }

    async fn list_calendars(&self) -> DaymarkResult<Vec<CalendarHandle>> {
        (**self).list_calendars().await
    }

    async fn resolve_default_calendar(&self) -> DaymarkResult<CalendarHandle> {
        (**self).resolve_default_calendar().await
    }

    async fn list_events(
        &self,
        calendar: &CalendarHandle,
        window: &Window,
    ) -> DaymarkResult<Vec<Event>> {
        (**self).list_events(calendar, window).await
    }

    async fn create_event(
        &self,
        calendar: &CalendarHandle,
        draft: &EventDraft,
    ) -> DaymarkResult<EventId> {
        (**self).create_event(calendar, draft).await
    }

    async fn update_event(&self, id: &EventId, draft: &EventDraft) -> DaymarkResult<()> {
        (**self).update_event(id, draft).await
    }

    async fn delete_event(&self, id: &EventId) -> DaymarkResult<()> {
        (**self).delete_event(id).await
    }
}
