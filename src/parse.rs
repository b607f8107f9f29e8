//! Parsing of day and time arguments.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use daymark_core::DayKey;

/// A `--start`/`--end` argument: a time on the chosen day, or a full
/// local date and time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum When {
    Time(NaiveTime),
    At(NaiveDateTime),
}

impl When {
    /// Resolve against `day`, which only applies to a bare time.
    pub fn on(self, day: DayKey) -> (DayKey, NaiveTime) {
        match self {
            When::Time(time) => (day, time),
            When::At(dt) => (DayKey::new(dt.date()), dt.time()),
        }
    }
}

/// Parse YYYY-MM-DD, "today" or "tomorrow".
pub fn parse_day(input: &str, today: DayKey) -> Result<DayKey> {
    match input.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => today
            .date()
            .succ_opt()
            .map(DayKey::new)
            .context("Date out of range"),
        other => other.parse::<DayKey>().map_err(|e| anyhow!(e)),
    }
}

/// Parse HH:MM or YYYY-MM-DDTHH:MM.
pub fn parse_when(input: &str) -> Result<When> {
    let input = input.trim();

    if let Ok(time) = NaiveTime::parse_from_str(input, "%H:%M") {
        return Ok(When::Time(time));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M") {
        return Ok(When::At(dt));
    }

    bail!("Invalid time '{}'. Use HH:MM or YYYY-MM-DDTHH:MM", input)
}

/// Pick the day from an optional `--date`, defaulting to today.
pub fn day_or_today(input: Option<&str>, tz: &Tz) -> Result<DayKey> {
    let today = DayKey::today(tz);
    match input {
        Some(s) => parse_day(s, today),
        None => Ok(today),
    }
}

/// The current local time, to the minute.
pub fn current_minute(tz: &Tz) -> NaiveTime {
    let now = Utc::now().with_timezone(tz).time();
    NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now)
}
