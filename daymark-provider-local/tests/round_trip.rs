//! The controller driving this provider binary through `ProcessGateway`.

use chrono::NaiveTime;
use chrono_tz::UTC;
use daymark_core::memory::EventStore;
use daymark_core::provider::ProcessGateway;
use daymark_core::{DayKey, EventController, Session};

#[tokio::test]
async fn create_list_and_delete_through_provider_binary() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("cal.json");
    let binary = std::path::Path::new(env!("CARGO_BIN_EXE_daymark-provider-local"));

    let path = std::env::var_os("PATH").unwrap_or_default();
    let search = binary
        .parent()
        .map(|p| p.to_path_buf())
        .into_iter()
        .chain(std::env::split_paths(&path));
    // SAFETY: the only test in this binary, set before anything is spawned
    unsafe {
        std::env::set_var("PATH", std::env::join_paths(search).unwrap());
        std::env::set_var("DAYMARK_LOCAL_STORE", &store_path);
        std::env::remove_var("DAYMARK_LOCAL_DENY_ACCESS");
    }

    let controller = EventController::connect(ProcessGateway::from_name("local"))
        .await
        .unwrap();
    let day: DayKey = "2024-06-15".parse().unwrap();
    let mut session = Session::new(day, UTC);
    controller.reload(&mut session, day).await.unwrap();
    assert!(session.events().is_empty());

    let draft = session
        .begin_create(NaiveTime::from_hms_opt(10, 0, 0).unwrap())
        .unwrap();
    draft.title = "Standup".into();
    draft.location = "Room 2".into();
    let saved = controller.submit(&mut session).await.unwrap();

    let listed = session.events_for_day(day);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, saved.id);
    assert_eq!(listed[0].calendar_id, "local");
    assert_eq!(listed[0].location, "Room 2");

    let on_disk: EventStore =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    assert_eq!(on_disk.events.len(), 1);

    controller.remove(&mut session, &saved.id).await.unwrap();
    assert!(session.events_for_day(day).is_empty());
    assert!(!session.marked_dates()[&day].marked);
}
