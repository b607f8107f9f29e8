//! daymark-provider-local - file-backed calendar provider for daymark
//!
//! This binary implements the daymark provider protocol, communicating
//! with daymark via JSON over stdin/stdout. Events are kept in a single
//! JSON file:
//!   $DAYMARK_LOCAL_STORE, or <data dir>/daymark/local-calendar.json

mod store;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use daymark_core::DaymarkError;
use daymark_core::event::{EventDraft, EventId};
use daymark_core::protocol::{
    Command, CreateEvent, DeleteEvent, ErrorCode, ListEvents, Request, Response, UpdateEvent,
};
use daymark_core::validation::validate;
use daymark_core::window::Window;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::store::LocalStore;

/// Set to refuse calendar access, as a denied permission prompt would.
const DENY_ACCESS_ENV: &str = "DAYMARK_LOCAL_DENY_ACCESS";

fn main() -> Result<()> {
    // stdout carries the protocol, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("DAYMARK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let store = LocalStore::default_location()?;
    debug!(path = %store.path().display(), "using local store");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!(error = %e, "failed to read stdin");
                break;
            }
        };

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(&store, request, access_granted()),
            Err(e) => Response::error(&format!("Failed to parse request: {}", e)),
        };

        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }

    Ok(())
}

fn handle_request(store: &LocalStore, request: Request, access: bool) -> String {
    debug!(command = ?request.command, "handling request");

    match request.command {
        Command::RequestAccess => Response::success(access),
        _ if !access => {
            Response::error_with_code(ErrorCode::PermissionDenied, "Calendar access denied")
        }
        Command::ListCalendars => handle_list_calendars(store),
        Command::ListEvents => with_params(&request.params, |p| handle_list_events(store, p)),
        Command::CreateEvent => with_params(&request.params, |p| handle_create_event(store, p)),
        Command::UpdateEvent => with_params(&request.params, |p| handle_update_event(store, p)),
        Command::DeleteEvent => with_params(&request.params, |p| handle_delete_event(store, p)),
    }
}

fn access_granted() -> bool {
    std::env::var_os(DENY_ACCESS_ENV).is_none()
}

fn with_params<P: DeserializeOwned>(params: &serde_json::Value, f: impl FnOnce(P) -> String) -> String {
    match serde_json::from_value(params.clone()) {
        Ok(p) => f(p),
        Err(e) => Response::error(&format!("Invalid params: {}", e)),
    }
}

fn handle_list_calendars(store: &LocalStore) -> String {
    match store.load() {
        Ok(s) => Response::success(s.calendars),
        Err(e) => error_response(&e),
    }
}

fn handle_list_events(store: &LocalStore, params: ListEvents) -> String {
    let window = match Window::parse(&params.from, &params.to) {
        Ok(w) => w,
        Err(e) => return Response::error(&e),
    };

    match store.load() {
        Ok(s) => Response::success(s.list(&params.calendar_id, &window)),
        Err(e) => error_response(&e),
    }
}

/// Keep the error code when the failure is one daymark acts on.
fn error_response(err: &anyhow::Error) -> String {
    match err.downcast_ref::<DaymarkError>() {
        Some(e) => Response::from_error(e),
        None => Response::error(&format!("{:#}", err)),
    }
}

/// The store keeps only well-formed events.
fn check_draft(draft: &EventDraft) -> Result<()> {
    validate(&draft.trimmed())?;
    Ok(())
}

fn handle_create_event(store: &LocalStore, params: CreateEvent) -> String {
    let result = store.modify(|s| {
        check_draft(&params.event)?;
        Ok(s.insert(&params.calendar_id, &params.event)?)
    });

    match result {
        Ok(id) => Response::success(id.to_string()),
        Err(e) => error_response(&e),
    }
}

fn handle_update_event(store: &LocalStore, params: UpdateEvent) -> String {
    let id = EventId::new(params.event_id);
    let result = store.modify(|s| {
        check_draft(&params.event)?;
        Ok(s.update(&id, &params.event)?)
    });

    match result {
        Ok(()) => Response::success(()),
        Err(e) => error_response(&e),
    }
}

fn handle_delete_event(store: &LocalStore, params: DeleteEvent) -> String {
    let id = EventId::new(params.event_id);
    match store.modify(|s| Ok(s.remove(&id)?)) {
        Ok(()) => Response::success(()),
        Err(e) => error_response(&e),
    }
}
