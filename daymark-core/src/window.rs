//! Event loading window.

use std::fmt;

use chrono::{DateTime, Months, Utc};
use chrono_tz::Tz;

use crate::constants::WINDOW_MONTHS;
use crate::day::DayKey;

/// Half-open time range `[start, end)` used to bound provider queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, String> {
        if end <= start {
            return Err(format!("Window end {} is not after start {}", end, start));
        }
        Ok(Window { start, end })
    }

    /// The window loaded around a selected day: one month each side,
    /// from local midnight to local midnight.
    ///
    /// Month steps clamp to the end of shorter months, so the window around
    /// 2024-03-31 starts on 2024-02-29.
    pub fn around(day: DayKey, tz: &Tz) -> Self {
        let months = Months::new(WINDOW_MONTHS);
        let date = day.date();
        let from = date.checked_sub_months(months).unwrap_or(date);
        let to = date.checked_add_months(months).unwrap_or(date);

        Window {
            start: DayKey::new(from).start_in(tz),
            end: DayKey::new(to).start_in(tz),
        }
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant < self.end
    }

    /// Whether an event spanning `[start, end)` intersects this window.
    /// Zero-length events count when their instant is inside.
    pub fn overlaps(&self, start: &DateTime<Utc>, end: &DateTime<Utc>) -> bool {
        if start == end {
            return self.contains(start);
        }
        *start < self.end && *end > self.start
    }

    pub fn from_rfc3339(&self) -> String {
        self.start.to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.end.to_rfc3339()
    }

    /// Parse a window sent over the provider protocol.
    pub fn parse(from: &str, to: &str) -> Result<Self, String> {
        let parse = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| format!("Invalid timestamp '{}'. Expected RFC 3339", s))
        };
        Window::new(parse(from)?, parse(to)?)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {})", self.from_rfc3339(), self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::{America, UTC};

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn one_month_each_side_of_selected_day() {
        let window = Window::around("2024-06-15".parse().unwrap(), &UTC);
        assert_eq!(window.start, utc("2024-05-15T00:00:00Z"));
        assert_eq!(window.end, utc("2024-07-15T00:00:00Z"));
    }

    #[test]
    fn bounds_are_local_midnights() {
        let window = Window::around("2024-06-15".parse().unwrap(), &America::New_York);
        assert_eq!(window.start, utc("2024-05-15T04:00:00Z"));
        assert_eq!(window.end, utc("2024-07-15T04:00:00Z"));
    }

    #[test]
    fn clamps_to_shorter_months() {
        let window = Window::around("2024-03-31".parse().unwrap(), &UTC);
        assert_eq!(window.start, utc("2024-02-29T00:00:00Z"));
        assert_eq!(window.end, utc("2024-04-30T00:00:00Z"));
    }

    #[test]
    fn end_is_exclusive() {
        let window = Window::around("2024-06-15".parse().unwrap(), &UTC);
        assert!(window.contains(&window.start));
        assert!(!window.contains(&window.end));
    }

    #[test]
    fn overlap_includes_events_straddling_edges() {
        let window = Window::new(utc("2024-06-01T00:00:00Z"), utc("2024-07-01T00:00:00Z")).unwrap();

        assert!(window.overlaps(&utc("2024-05-31T23:00:00Z"), &utc("2024-06-01T01:00:00Z")));
        assert!(!window.overlaps(&utc("2024-05-31T23:00:00Z"), &utc("2024-06-01T00:00:00Z")));
        assert!(!window.overlaps(&utc("2024-07-01T00:00:00Z"), &utc("2024-07-01T01:00:00Z")));
        assert!(window.overlaps(&utc("2024-06-10T00:00:00Z"), &utc("2024-06-10T00:00:00Z")));
    }

    #[test]
    fn parse_round_trips_protocol_strings() {
        let window = Window::around("2024-06-15".parse().unwrap(), &UTC);
        let parsed = Window::parse(&window.from_rfc3339(), &window.to_rfc3339()).unwrap();
        assert_eq!(parsed, window);
        assert!(Window::parse("2024-06-15", "2024-07-15").is_err());
    }
}
