//! Event types.
//!
//! `Event` is what a provider has stored. `EventDraft` is what the form is
//! editing. `RawEvent` is the loose shape providers send over the wire;
//! it is converted to `Event` as soon as it arrives.

use std::fmt;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::DEFAULT_EVENT_MINUTES;
use crate::day::DayKey;

/// Opaque event identifier assigned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        EventId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A calendar event as stored by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub calendar_id: String,
    pub title: String,
    pub notes: String,
    pub location: String,
    #[serde(rename = "startDate")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end: DateTime<Utc>,
    pub all_day: bool,
}

impl Event {
    /// The day this event is listed and marked on.
    pub fn day(&self, tz: &Tz) -> DayKey {
        DayKey::of(&self.start, tz)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// An event under edit. `id` is set when editing an existing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "startDate")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
}

impl EventDraft {
    /// A blank draft on `day` at local `time`, lasting the default length.
    pub fn starting_on(day: DayKey, time: NaiveTime, tz: &Tz) -> Self {
        let start = day.at(time, tz);
        EventDraft {
            id: None,
            title: String::new(),
            notes: String::new(),
            location: String::new(),
            start,
            end: start + Duration::minutes(DEFAULT_EVENT_MINUTES),
            all_day: false,
        }
    }

    /// Whether submitting this draft updates an existing event.
    pub fn is_update(&self) -> bool {
        self.id.is_some()
    }

    /// Copy with surrounding whitespace removed from the text fields.
    pub fn trimmed(&self) -> Self {
        EventDraft {
            title: self.title.trim().to_string(),
            notes: self.notes.trim().to_string(),
            location: self.location.trim().to_string(),
            ..self.clone()
        }
    }

    /// The stored event this draft becomes once the provider accepts it.
    pub fn into_event(self, id: EventId, calendar_id: &str) -> Event {
        Event {
            id,
            calendar_id: calendar_id.to_string(),
            title: self.title,
            notes: self.notes,
            location: self.location,
            start: self.start,
            end: self.end,
            all_day: self.all_day,
        }
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        EventDraft {
            id: Some(event.id.clone()),
            title: event.title.clone(),
            notes: event.notes.clone(),
            location: event.location.clone(),
            start: event.start,
            end: event.end,
            all_day: event.all_day,
        }
    }
}

/// Event record as a provider sends it, before any checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub calendar_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub all_day: Option<bool>,
}

impl TryFrom<RawEvent> for Event {
    type Error = String;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or("missing id")?;
        let start = parse_instant(raw.start_date.as_deref()).ok_or("invalid startDate")?;
        let end = parse_instant(raw.end_date.as_deref()).ok_or("invalid endDate")?;

        if end < start {
            return Err(format!("endDate before startDate for event {}", id));
        }

        Ok(Event {
            id: EventId(id),
            calendar_id: raw.calendar_id.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            notes: raw.notes.unwrap_or_default(),
            location: raw.location.unwrap_or_default(),
            start,
            end,
            all_day: raw.all_day.unwrap_or(false),
        })
    }
}

fn parse_instant(value: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value?)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert provider records, dropping (and logging) the ones that don't hold up.
pub fn coerce_events(raw: Vec<RawEvent>) -> Vec<Event> {
    raw.into_iter()
        .filter_map(|r| match Event::try_from(r) {
            Ok(event) => Some(event),
            Err(reason) => {
                warn!(%reason, "dropping malformed provider event");
                None
            }
        })
        .collect()
}
