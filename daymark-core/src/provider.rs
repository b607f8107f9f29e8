//! Provider subprocess gateway.
//!
//! Calendar providers are external binaries named `daymark-provider-<name>`
//! that speak the JSON protocol in `protocol` over stdin/stdout. Each call
//! spawns the binary, writes one request line and reads one response.
//!
//! Providers own their storage and credentials. The gateway only tracks
//! whether access was granted, so nothing is spawned for calls made before
//! `request_access` succeeds.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

use crate::constants::DEFAULT_PROVIDER_TIMEOUT_SECS;
use crate::error::{DaymarkError, DaymarkResult};
use crate::event::{Event, EventDraft, EventId, coerce_events};
use crate::gateway::{CalendarGateway, CalendarHandle, Granted};
use crate::protocol::{
    Command, CreateEvent, DeleteEvent, ListCalendars, ListEvents, ProviderCommand, Request,
    RequestAccess, Response, UpdateEvent, decode_error,
};
use crate::window::Window;

#[derive(Debug)]
pub struct ProcessGateway {
    name: String,
    timeout: Duration,
    granted: AtomicBool,
}

impl ProcessGateway {
    pub fn from_name(name: &str) -> Self {
        ProcessGateway {
            name: name.to_string(),
            timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            granted: AtomicBool::new(false),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binary_name(&self) -> String {
        format!("daymark-provider-{}", self.name)
    }

    fn binary_path(&self) -> DaymarkResult<PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| DaymarkError::ProviderNotInstalled(binary_name))
    }

    fn require_access(&self) -> DaymarkResult<()> {
        if self.granted.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(DaymarkError::PermissionDenied)
        }
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> DaymarkResult<C::Response> {
        timeout(self.timeout, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| DaymarkError::ProviderTimeout(self.timeout))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> DaymarkResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| DaymarkError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| DaymarkError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        debug!(provider = %self.name, ?command, "calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DaymarkError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DaymarkError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(DaymarkError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        parse_response(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Decode the first response line a provider wrote.
fn parse_response<R: DeserializeOwned>(stdout: &str) -> DaymarkResult<R> {
    let line = stdout
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| DaymarkError::Provider("Provider returned no response".into()))?;

    let response: Response<R> = serde_json::from_str(line)
        .map_err(|e| DaymarkError::Provider(format!("Failed to parse response: {}", e)))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::Error { error, code } => Err(decode_error(error, code)),
    }
}

#[async_trait]
impl CalendarGateway for ProcessGateway {
    async fn request_access(&self) -> DaymarkResult<Granted> {
        let granted = self.call(RequestAccess::default()).await?;
        self.granted.store(granted, Ordering::Release);
        if granted {
            Ok(Granted)
        } else {
            Err(DaymarkError::PermissionDenied)
        }
    }

    async fn list_calendars(&self) -> DaymarkResult<Vec<CalendarHandle>> {
        self.require_access()?;
        self.call(ListCalendars::default()).await
    }

    async fn list_events(
        &self,
        calendar: &CalendarHandle,
        window: &Window,
    ) -> DaymarkResult<Vec<Event>> {
        self.require_access()?;
        let raw = self
            .call(ListEvents {
                calendar_id: calendar.id.clone(),
                from: window.from_rfc3339(),
                to: window.to_rfc3339(),
            })
            .await?;
        Ok(coerce_events(raw))
    }

    async fn create_event(
        &self,
        calendar: &CalendarHandle,
        draft: &EventDraft,
    ) -> DaymarkResult<EventId> {
        self.require_access()?;
        let id = self
            .call(CreateEvent {
                calendar_id: calendar.id.clone(),
                event: draft.clone(),
            })
            .await?;
        Ok(EventId::new(id))
    }

    async fn update_event(&self, id: &EventId, draft: &EventDraft) -> DaymarkResult<()> {
        self.require_access()?;
        self.call(UpdateEvent {
            event_id: id.to_string(),
            event: draft.clone(),
        })
        .await
    }

    async fn delete_event(&self, id: &EventId) -> DaymarkResult<()> {
        self.require_access()?;
        self.call(DeleteEvent {
            event_id: id.to_string(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn calls_before_access_fail_without_spawning() {
        let gateway = ProcessGateway::from_name("does-not-exist-anywhere");

        assert!(matches!(
            gateway.list_calendars().await,
            Err(DaymarkError::PermissionDenied)
        ));
        assert!(matches!(
            gateway.delete_event(&EventId::new("x")).await,
            Err(DaymarkError::PermissionDenied)
        ));
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let gateway = ProcessGateway::from_name("does-not-exist-anywhere");
        match gateway.request_access().await {
            Err(DaymarkError::ProviderNotInstalled(name)) => {
                assert_eq!(name, "daymark-provider-does-not-exist-anywhere");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn parses_success_and_error_lines() {
        let ids: Vec<String> = parse_response("\n{\"status\":\"success\",\"data\":[\"a\"]}\n").unwrap();
        assert_eq!(ids, vec!["a"]);

        let denied = parse_response::<()>(
            r#"{"status":"error","error":"no","code":"permission_denied"}"#,
        );
        assert!(matches!(denied, Err(DaymarkError::PermissionDenied)));

        assert!(matches!(parse_response::<()>(""), Err(DaymarkError::Provider(_))));
        assert!(matches!(parse_response::<()>("garbage"), Err(DaymarkError::Provider(_))));
    }
}
