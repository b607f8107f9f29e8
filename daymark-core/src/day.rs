//! Local calendar days.
//!
//! Every place that needs to know "which day is this event on" goes through
//! [`DayKey::of`]. Marking a day and listing a day's events must agree, so
//! there is exactly one truncation rule: interpret the instant in the
//! viewer's time zone and keep the date.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A calendar date (`YYYY-MM-DD`) in the viewer's time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        DayKey(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(DayKey)
    }

    /// The day an instant falls on, as seen from `tz`.
    pub fn of(instant: &DateTime<Utc>, tz: &Tz) -> Self {
        DayKey(instant.with_timezone(tz).date_naive())
    }

    pub fn today(tz: &Tz) -> Self {
        Self::of(&Utc::now(), tz)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// First instant of this day in `tz`.
    pub fn start_in(&self, tz: &Tz) -> DateTime<Utc> {
        resolve_local(tz, self.0.and_time(NaiveTime::MIN))
    }

    /// This day at a local wall-clock time in `tz`.
    pub fn at(&self, time: NaiveTime, tz: &Tz) -> DateTime<Utc> {
        resolve_local(tz, self.0.and_time(time))
    }
}

/// Map a local wall-clock time to an instant.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times that
/// don't exist (clocks going forward) move to the first valid minute after
/// the gap.
fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    // Gaps are at most a couple of hours in every IANA zone
    for step in 0..=(3 * 60 / 15) {
        let candidate = naive + Duration::minutes(step * 15);
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return dt.with_timezone(&Utc);
        }
    }
    naive.and_utc()
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(DayKey)
            .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        DayKey(date)
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::{America, Asia, Europe, UTC};

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn late_evening_stays_on_local_day() {
        // 23:30 in New York is already the next day in UTC
        let instant = utc("2024-06-16T03:30:00Z");
        assert_eq!(DayKey::of(&instant, &America::New_York).to_string(), "2024-06-15");
        assert_eq!(DayKey::of(&instant, &UTC).to_string(), "2024-06-16");
    }

    #[test]
    fn early_morning_east_of_utc() {
        // 01:00 in Tokyo is still the previous day in UTC
        let instant = utc("2024-06-14T16:00:00Z");
        assert_eq!(DayKey::of(&instant, &Asia::Tokyo).to_string(), "2024-06-15");
    }

    #[test]
    fn start_of_day_round_trips_through_of() {
        let day: DayKey = "2024-03-31".parse().unwrap();
        for tz in [Europe::Madrid, America::New_York, Asia::Tokyo, UTC] {
            assert_eq!(DayKey::of(&day.start_in(&tz), &tz), day);
        }
    }

    #[test]
    fn midnight_in_dst_gap_moves_forward() {
        // Havana skipped 00:00-01:00 on 2023-03-12
        let day: DayKey = "2023-03-12".parse().unwrap();
        let start = day.start_in(&America::Havana);

        assert_eq!(DayKey::of(&start, &America::Havana), day);
        assert_eq!(
            start.with_timezone(&America::Havana).time(),
            NaiveTime::from_hms_opt(1, 0, 0).unwrap()
        );
    }

    #[test]
    fn at_uses_local_wall_clock() {
        let day: DayKey = "2024-06-15".parse().unwrap();
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert_eq!(day.at(ten, &Europe::Madrid), utc("2024-06-15T08:00:00Z"));
    }

    #[test]
    fn parse_rejects_other_formats() {
        assert!("15/06/2024".parse::<DayKey>().is_err());
        assert!("2024-06-15T00:00:00".parse::<DayKey>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let day = DayKey::from_ymd(2024, 6, 15).unwrap();
        assert_eq!(serde_json::to_string(&day).unwrap(), "\"2024-06-15\"");
        let back: DayKey = serde_json::from_str("\"2024-06-15\"").unwrap();
        assert_eq!(back, day);
    }
}
