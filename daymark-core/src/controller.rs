//! Form submission and synchronization with the calendar provider.
//!
//! The controller never updates the session optimistically: events only
//! change when a reload brings back what the provider actually stored.

use tracing::{debug, info, warn};

use crate::day::DayKey;
use crate::error::DaymarkResult;
use crate::event::{Event, EventId};
use crate::gateway::{CalendarGateway, CalendarHandle};
use crate::session::{ReloadOutcome, ReloadTicket, Session};
use crate::validation::validate;

pub struct EventController<G> {
    gateway: G,
    calendar: CalendarHandle,
}

impl<G: CalendarGateway> EventController<G> {
    /// Request calendar access and resolve the calendar to work in.
    pub async fn connect(gateway: G) -> DaymarkResult<Self> {
        gateway.request_access().await?;
        let calendar = gateway.resolve_default_calendar().await?;
        info!(calendar = %calendar.id, title = %calendar.title, "connected to calendar");

        Ok(EventController { gateway, calendar })
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Fetch the events for a reload ticket without touching the session.
    pub async fn fetch(&self, ticket: &ReloadTicket) -> DaymarkResult<Vec<Event>> {
        debug!(day = %ticket.day, window = %ticket.window, "fetching events");
        self.gateway.list_events(&self.calendar, &ticket.window).await
    }

    /// Select `day` and replace the session's events with its window.
    pub async fn reload(&self, session: &mut Session, day: DayKey) -> DaymarkResult<ReloadOutcome> {
        let ticket = session.start_reload(day);
        let result = self.fetch(&ticket).await;
        if let Err(e) = &result {
            warn!(day = %day, error = %e, "reload failed, keeping displayed events");
        }
        session.finish_reload(ticket, result)
    }

    /// Reload the currently selected day.
    pub async fn refresh(&self, session: &mut Session) -> DaymarkResult<ReloadOutcome> {
        let day = session.selected();
        self.reload(session, day).await
    }

    /// Save the open form.
    ///
    /// Validation runs first and never reaches the provider. On success the
    /// form closes and the selected window is reloaded before the saved event
    /// is returned. On failure the form goes back to editing.
    pub async fn submit(&self, session: &mut Session) -> DaymarkResult<Event> {
        let draft = session.take_for_submit()?.trimmed();

        if let Err(e) = validate(&draft) {
            session.submit_failed(draft);
            return Err(e.into());
        }

        let saved = match &draft.id {
            Some(id) => self.gateway.update_event(id, &draft).await.map(|()| id.clone()),
            None => self.gateway.create_event(&self.calendar, &draft).await,
        };

        let id = match saved {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, update = draft.is_update(), "saving event failed");
                session.submit_failed(draft);
                return Err(e);
            }
        };

        info!(id = %id, update = draft.is_update(), "saved event");
        session.submit_succeeded();
        self.reload_after_mutation(session).await;

        Ok(draft.into_event(id, &self.calendar.id))
    }

    /// Delete an event, then reload. Asking the user to confirm is up to the caller.
    pub async fn remove(&self, session: &mut Session, id: &EventId) -> DaymarkResult<()> {
        if let Err(e) = self.gateway.delete_event(id).await {
            warn!(id = %id, error = %e, "deleting event failed");
            return Err(e);
        }

        info!(id = %id, "deleted event");
        self.reload_after_mutation(session).await;
        Ok(())
    }

    /// The mutation already happened; a failed reload only means the view is
    /// behind, so it is logged by `reload` rather than reported as a failed save.
    async fn reload_after_mutation(&self, session: &mut Session) {
        if let Ok(outcome) = self.refresh(session).await {
            debug!(?outcome, "reloaded after change");
        }
    }
}
