//! Terminal rendering for daymark types.

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use daymark_core::{DayKey, Event, MarkedDayInfo, Session};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self, tz: &Tz) -> String;
}

impl Render for Event {
    fn render(&self, tz: &Tz) -> String {
        let time = if self.all_day {
            format!("{:>11}", "all-day")
        } else {
            format!(
                "{}-{}",
                self.start.with_timezone(tz).format("%H:%M"),
                self.end.with_timezone(tz).format("%H:%M")
            )
        };

        let mut line = format!("  {} {}", time, self.title.bold());
        if !self.location.is_empty() {
            line.push_str(&format!(" {}", format!("@ {}", self.location).dimmed()));
        }
        line.push_str(&format!(" {}", format!("[{}]", self.id).dimmed()));
        if !self.notes.is_empty() {
            line.push_str(&format!("\n              {}", self.notes.dimmed()));
        }
        line
    }
}

/// Weeks of the month containing `date`, Monday first.
pub fn month_weeks(date: NaiveDate) -> Vec<[Option<NaiveDate>; 7]> {
    let Some(first) = date.with_day(1) else {
        return Vec::new();
    };

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut slot = first.weekday().num_days_from_monday() as usize;

    for day in first.iter_days().take_while(|d| d.month() == first.month()) {
        week[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(week);
    }

    weeks
}

/// Month grid for the selected day.
pub fn render_month(session: &Session) -> String {
    let selected = session.selected();
    let marks = session.marked_dates();

    let mut lines = vec![
        format!("   {}", selected.date().format("%B %Y").to_string().bold()),
        "Mo Tu We Th Fr Sa Su".dimmed().to_string(),
    ];

    for week in month_weeks(selected.date()) {
        let cells: Vec<String> = week
            .iter()
            .map(|slot| match slot {
                None => "  ".to_string(),
                Some(date) => {
                    let info = marks.get(&DayKey::new(*date)).copied().unwrap_or_default();
                    day_cell(date.day(), info)
                }
            })
            .collect();
        lines.push(cells.join(" "));
    }

    lines.join("\n")
}

/// One grid cell. Days with events are green, the selected day is reversed,
/// and a selected day with events is both.
fn day_cell(day: u32, info: MarkedDayInfo) -> String {
    let label = format!("{:>2}", day);
    match (info.selected, info.marked) {
        (true, true) => label.green().bold().reversed().to_string(),
        (true, false) => label.reversed().to_string(),
        (false, true) => label.green().bold().to_string(),
        (false, false) => label,
    }
}

/// Events on the selected day, in provider order.
pub fn render_day(session: &Session) -> String {
    let tz = session.timezone();
    let selected = session.selected();
    let events = session.events_for_selected_day();

    let mut lines = vec![date_label(selected, DayKey::today(tz)).bold().to_string()];
    if events.is_empty() {
        lines.push(format!("  {}", "No events".dimmed()));
    }
    lines.extend(events.iter().map(|e| e.render(tz)));

    lines.join("\n")
}

/// "Today", "Tomorrow", or e.g. "Sat Jun 15".
fn date_label(day: DayKey, today: DayKey) -> String {
    match (day.date() - today.date()).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => day.date().format("%a %b %-d").to_string(),
    }
}
