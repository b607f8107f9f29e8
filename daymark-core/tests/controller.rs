//! End-to-end flows through `EventController` against the in-memory gateway.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::{Europe, Tz};
use daymark_core::memory::InMemoryGateway;
use daymark_core::{
    DayKey, DaymarkError, EventController, EventDraft, FormState,
    ReloadOutcome, Session, ValidationError,
};

const TZ: Tz = Europe::Madrid;

fn day(s: &str) -> DayKey {
    s.parse().unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

async fn connected() -> (InMemoryGateway, EventController<InMemoryGateway>) {
    let gateway = InMemoryGateway::new();
    let controller = EventController::connect(gateway.clone()).await.unwrap();
    (gateway, controller)
}

#[tokio::test]
async fn standup_is_listed_and_marked_after_create() {
    let (_, controller) = connected().await;
    let mut session = Session::new(day("2024-06-15"), TZ);
    controller.reload(&mut session, day("2024-06-15")).await.unwrap();

    let draft = session.begin_create(time(10, 0)).unwrap();
    draft.title = "Standup".into();
    let saved = controller.submit(&mut session).await.unwrap();

    assert_eq!(saved.title, "Standup");
    assert_eq!(saved.end - saved.start, Duration::hours(1));
    assert_eq!(session.form(), &FormState::Idle);

    let listed = session.events_for_day(day("2024-06-15"));
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Standup");
    assert_eq!(listed[0].id, saved.id);

    let marks = session.marked_dates();
    let info = marks[&day("2024-06-15")];
    assert!(info.marked);
    assert!(info.selected);
}

#[tokio::test]
async fn deleting_the_only_event_empties_the_day() {
    let (_, controller) = connected().await;
    let mut session = Session::new(day("2024-06-15"), TZ);

    session.begin_create(time(10, 0)).unwrap().title = "Standup".into();
    let saved = controller.submit(&mut session).await.unwrap();
    assert_eq!(session.events_for_day(day("2024-06-15")).len(), 1);

    controller.remove(&mut session, &saved.id).await.unwrap();

    assert!(session.events_for_day(day("2024-06-15")).is_empty());
    assert!(!session.marked_dates()[&day("2024-06-15")].marked);
}

#[tokio::test]
async fn edit_updates_event_in_place() {
    let (gateway, controller) = connected().await;
    let mut session = Session::new(day("2024-06-15"), TZ);

    session.begin_create(time(10, 0)).unwrap().title = "Standup".into();
    let saved = controller.submit(&mut session).await.unwrap();

    let existing = session.find_event(saved.id.as_str()).unwrap().clone();
    let draft = session.begin_edit(&existing).unwrap();
    draft.title = "  Retro  ".into();
    draft.location = " Room 2 ".into();
    let updated = controller.submit(&mut session).await.unwrap();

    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.title, "Retro");
    assert_eq!(gateway.snapshot().events.len(), 1);
    assert_eq!(session.events()[0].title, "Retro");
    assert_eq!(session.events()[0].location, "Room 2");
}

#[tokio::test]
async fn validation_errors_never_reach_the_gateway() {
    let (gateway, controller) = connected().await;
    let mut session = Session::new(day("2024-06-15"), TZ);

    session.begin_create(time(10, 0)).unwrap().title = "   ".into();
    let err = controller.submit(&mut session).await.unwrap_err();
    assert!(matches!(err, DaymarkError::Validation(ValidationError::EmptyTitle)));
    assert!(matches!(session.form(), FormState::Editing(_)));

    let draft = session.draft_mut().unwrap();
    draft.title = "Standup".into();
    draft.end = draft.start;
    let err = controller.submit(&mut session).await.unwrap_err();
    assert!(matches!(err, DaymarkError::Validation(ValidationError::InvalidRange)));

    assert_eq!(gateway.mutation_count(), 0);
}

#[tokio::test]
async fn provider_failure_returns_form_to_editing_and_keeps_events() {
    let (gateway, controller) = connected().await;
    let mut session = Session::new(day("2024-06-15"), TZ);

    session.begin_create(time(9, 0)).unwrap().title = "Existing".into();
    controller.submit(&mut session).await.unwrap();

    session.begin_create(time(11, 0)).unwrap().title = "Planning".into();
    gateway.fail_next_call("calendar busy");
    let err = controller.submit(&mut session).await.unwrap_err();

    assert!(err.is_provider_failure());
    assert_eq!(session.events().len(), 1);
    assert_eq!(session.draft_mut().unwrap().title, "Planning");
    assert_eq!(gateway.snapshot().events.len(), 1);
}

#[tokio::test]
async fn failed_reload_after_save_still_reports_success() {
    let (gateway, controller) = connected().await;
    let mut session = Session::new(day("2024-06-15"), TZ);
    controller.reload(&mut session, day("2024-06-15")).await.unwrap();

    session.begin_create(time(9, 0)).unwrap().title = "Saved".into();
    gateway.fail_next_list("network down");
    let saved = controller.submit(&mut session).await.unwrap();

    // Saved on the provider, but the view still shows the previous load
    assert_eq!(session.form(), &FormState::Idle);
    assert_eq!(gateway.snapshot().events.len(), 1);
    assert!(session.events().is_empty());

    controller.refresh(&mut session).await.unwrap();
    assert_eq!(session.events()[0].id, saved.id);
}

#[tokio::test]
async fn failed_reload_keeps_displayed_events() {
    let (_, controller) = connected().await;
    let mut session = Session::new(day("2024-06-15"), TZ);
    session.begin_create(time(9, 0)).unwrap().title = "Kept".into();
    controller.submit(&mut session).await.unwrap();

    controller.gateway().fail_next_call("network down");
    assert!(controller.refresh(&mut session).await.is_err());
    assert_eq!(session.events().len(), 1);
    assert_eq!(session.events()[0].title, "Kept");
}

#[tokio::test]
async fn created_event_round_trips_through_reload() {
    let (_, controller) = connected().await;
    let mut session = Session::new(day("2024-02-29"), TZ);

    session.begin_create(time(23, 30)).unwrap().title = "Late call".into();
    let saved = controller.submit(&mut session).await.unwrap();

    // Ends after midnight but belongs to the day it starts on
    assert_eq!(saved.day(&TZ), day("2024-02-29"));
    let ids: Vec<_> = session
        .events_for_day(day("2024-02-29"))
        .iter()
        .map(|e| e.id.clone())
        .collect();
    assert_eq!(ids, vec![saved.id]);
    assert!(session.events_for_day(day("2024-03-01")).is_empty());
}

#[tokio::test]
async fn only_events_inside_the_window_are_loaded() {
    let (gateway, controller) = connected().await;
    let seed = |title: &str, start: &str| {
        let start: DateTime<Utc> = start.parse().unwrap();
        EventDraft {
            id: None,
            title: title.into(),
            notes: String::new(),
            location: String::new(),
            start,
            end: start + Duration::hours(1),
            all_day: false,
        }
    };
    gateway.seed("personal", &seed("too early", "2024-05-01T10:00:00Z")).unwrap();
    gateway.seed("personal", &seed("inside", "2024-06-01T10:00:00Z")).unwrap();
    gateway.seed("personal", &seed("too late", "2024-07-20T10:00:00Z")).unwrap();

    let mut session = Session::new(day("2024-06-15"), TZ);
    let outcome = controller.reload(&mut session, day("2024-06-15")).await.unwrap();

    assert_eq!(outcome, ReloadOutcome::Applied(1));
    assert_eq!(session.events()[0].title, "inside");
}

#[tokio::test]
async fn stale_reload_result_is_discarded() {
    let (gateway, controller) = connected().await;
    let start: DateTime<Utc> = "2024-07-01T08:00:00Z".parse().unwrap();
    gateway
        .seed(
            "personal",
            &EventDraft {
                id: None,
                title: "July kickoff".into(),
                notes: String::new(),
                location: String::new(),
                start,
                end: start + Duration::hours(1),
                all_day: false,
            },
        )
        .unwrap();

    let mut session = Session::new(day("2024-06-15"), TZ);
    let june = session.start_reload(day("2024-06-01"));
    let july = session.start_reload(day("2024-07-01"));

    let (june_events, july_events) = tokio::join!(controller.fetch(&june), controller.fetch(&july));

    // The July result lands first, then the older June result arrives
    assert_eq!(
        session.finish_reload(july, july_events).unwrap(),
        ReloadOutcome::Applied(1)
    );
    assert_eq!(
        session.finish_reload(june, june_events).unwrap(),
        ReloadOutcome::Stale
    );

    assert_eq!(session.selected(), day("2024-07-01"));
    assert_eq!(session.window(), Some(july.window));
    assert_eq!(session.events_for_selected_day()[0].title, "July kickoff");
}

#[tokio::test]
async fn denied_access_prevents_connecting() {
    let gateway = InMemoryGateway::new();
    gateway.deny_access();

    let result = EventController::connect(gateway).await;
    assert!(matches!(result, Err(DaymarkError::PermissionDenied)));
}

#[tokio::test]
async fn no_calendars_prevents_connecting() {
    let gateway = InMemoryGateway::from_store(Default::default());

    let result = EventController::connect(gateway).await;
    assert!(matches!(result, Err(DaymarkError::CalendarNotFound)));
}
