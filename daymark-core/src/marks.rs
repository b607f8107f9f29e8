//! Grouping events into calendar days.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use serde::Serialize;

use crate::day::DayKey;
use crate::event::Event;

/// What the month view shows for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarkedDayInfo {
    /// At least one event starts on this day.
    pub marked: bool,
    /// This is the selected day.
    pub selected: bool,
    pub event_count: usize,
}

pub type MarkedDates = BTreeMap<DayKey, MarkedDayInfo>;

/// Mark every day that has an event starting on it, plus the selected day.
///
/// The selected day's flag is merged into its bucket, so a selected day with
/// events stays marked.
pub fn bucket_by_day(events: &[Event], selected: Option<DayKey>, tz: &Tz) -> MarkedDates {
    let mut marked = MarkedDates::new();

    for event in events {
        let info = marked.entry(event.day(tz)).or_default();
        info.marked = true;
        info.event_count += 1;
    }

    if let Some(day) = selected {
        marked.entry(day).or_default().selected = true;
    }

    marked
}

/// Events starting on `day`, in provider order.
pub fn events_on_day<'a>(events: &'a [Event], day: DayKey, tz: &Tz) -> Vec<&'a Event> {
    events.iter().filter(|e| e.day(tz) == day).collect()
}
