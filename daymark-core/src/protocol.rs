//! Defines the JSON protocol used between daymark and provider binaries
//! over stdin/stdout.
//!
//! One request per line, one response per line. Timestamps are RFC 3339.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::DaymarkError;
use crate::event::{EventDraft, RawEvent};
use crate::gateway::CalendarHandle;

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    RequestAccess,
    ListCalendars,
    ListEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
}

/// Request sent from daymark to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Failure category carried in error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    PermissionDenied,
    NotFound,
    Provider,
}

/// Response sent from a provider to daymark.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success {
        data: T,
    },
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<ErrorCode>,
    },
}

const SERIALIZE_FAILED: &str =
    r#"{"status":"error","error":"Failed to serialize response","code":"provider"}"#;

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data })
            .unwrap_or_else(|_| SERIALIZE_FAILED.to_string())
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        Self::error_with_code(ErrorCode::Provider, msg)
    }

    pub fn error_with_code(code: ErrorCode, msg: &str) -> String {
        serde_json::to_string(&Response::<()>::Error {
            error: msg.to_string(),
            code: Some(code),
        })
        .unwrap_or_else(|_| SERIALIZE_FAILED.to_string())
    }

    /// Encode a daymark error, keeping the categories the caller acts on.
    pub fn from_error(err: &DaymarkError) -> String {
        let code = match err {
            DaymarkError::PermissionDenied => ErrorCode::PermissionDenied,
            DaymarkError::CalendarNotFound => ErrorCode::NotFound,
            _ => ErrorCode::Provider,
        };
        let message = match err {
            DaymarkError::Provider(msg) => msg.clone(),
            other => other.to_string(),
        };
        Self::error_with_code(code, &message)
    }
}

/// Map an error response back to a daymark error.
pub fn decode_error(error: String, code: Option<ErrorCode>) -> DaymarkError {
    match code {
        Some(ErrorCode::PermissionDenied) => DaymarkError::PermissionDenied,
        Some(ErrorCode::NotFound) => DaymarkError::CalendarNotFound,
        Some(ErrorCode::Provider) | None => DaymarkError::Provider(error),
    }
}

/// Ask for calendar access. The response is whether it was granted.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RequestAccess {}

impl ProviderCommand for RequestAccess {
    type Response = bool;
    fn command() -> Command {
        Command::RequestAccess
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListCalendars {}

impl ProviderCommand for ListCalendars {
    type Response = Vec<CalendarHandle>;
    fn command() -> Command {
        Command::ListCalendars
    }
}

/// List events overlapping `[from, to)`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    pub calendar_id: String,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<RawEvent>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Create an event. The response is the new event's id.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    pub calendar_id: String,
    pub event: EventDraft,
}

impl ProviderCommand for CreateEvent {
    type Response = String;
    fn command() -> Command {
        Command::CreateEvent
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub event_id: String,
    pub event: EventDraft,
}

impl ProviderCommand for UpdateEvent {
    type Response = ();
    fn command() -> Command {
        Command::UpdateEvent
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    pub event_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}
