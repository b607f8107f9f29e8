pub mod config;
pub mod day;
pub mod delete;
pub mod edit;
pub mod month;
pub mod new;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use daymark_core::{CalendarGateway, DayKey, DaymarkError, Event, EventController, Session};

/// Turn a daymark error into the message shown to the user.
pub fn notice(err: DaymarkError) -> anyhow::Error {
    anyhow::anyhow!(err.notice())
}

/// Select `day` and load the events around it.
pub async fn open_session<G: CalendarGateway>(
    controller: &EventController<G>,
    day: DayKey,
    tz: Tz,
) -> Result<Session> {
    let mut session = Session::new(day, tz);
    controller.reload(&mut session, day).await.map_err(notice)?;
    Ok(session)
}

/// Look up an event among the loaded ones.
pub fn loaded_event(session: &Session, id: &str) -> Result<Event> {
    session.find_event(id).cloned().with_context(|| {
        format!(
            "No event '{}' within a month of {}. Pass --date with the day it is on.",
            id,
            session.selected()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use daymark_core::memory::InMemoryGateway;

    #[tokio::test]
    async fn finds_loaded_events_by_id() {
        let controller = EventController::connect(InMemoryGateway::new()).await.unwrap();
        let day: DayKey = "2024-06-15".parse().unwrap();
        let mut session = open_session(&controller, day, Tz::UTC).await.unwrap();

        session.begin_create(NaiveTime::from_hms_opt(10, 0, 0).unwrap()).unwrap().title =
            "Standup".into();
        let saved = controller.submit(&mut session).await.unwrap();

        assert_eq!(loaded_event(&session, saved.id.as_str()).unwrap().title, "Standup");

        let err = loaded_event(&session, "missing").unwrap_err();
        assert!(err.to_string().contains("--date"));
    }
}
