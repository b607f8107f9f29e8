use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::Args;
use daymark_core::{CalendarGateway, DayKey, EventController};
use owo_colors::OwoColorize;

use super::notice;
use crate::parse::{current_minute, day_or_today, parse_when};
use crate::render::render_day;

#[derive(Args)]
pub struct NewArgs {
    pub title: String,

    /// Day of the event (YYYY-MM-DD, "today" or "tomorrow")
    #[arg(short, long)]
    pub date: Option<String>,

    /// Start time (HH:MM, or YYYY-MM-DDTHH:MM), defaults to now
    #[arg(short, long)]
    pub start: Option<String>,

    /// End time (HH:MM, or YYYY-MM-DDTHH:MM), defaults to one hour after start
    #[arg(short, long)]
    pub end: Option<String>,

    #[arg(short, long)]
    pub notes: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    /// Make this an all-day event
    #[arg(long)]
    pub all_day: bool,
}

pub async fn run<G: CalendarGateway>(
    controller: &EventController<G>,
    tz: Tz,
    args: NewArgs,
) -> Result<()> {
    let day = day_or_today(args.date.as_deref(), &tz)?;
    let (day, time) = match &args.start {
        Some(s) => parse_when(s)?.on(day),
        None => (day, current_minute(&tz)),
    };
    let end = match &args.end {
        Some(s) => {
            let (end_day, end_time) = parse_when(s)?.on(day);
            Some(end_day.at(end_time, &tz))
        }
        None => None,
    };
    let next_day = day.date().succ_opt().context("Date out of range")?;

    let mut session = super::open_session(controller, day, tz).await?;

    let draft = session.begin_create(time).map_err(notice)?;
    draft.title = args.title;
    if let Some(notes) = args.notes {
        draft.notes = notes;
    }
    if let Some(location) = args.location {
        draft.location = location;
    }
    if let Some(end) = end {
        draft.end = end;
    }
    if args.all_day {
        draft.all_day = true;
        draft.start = day.start_in(&tz);
        draft.end = DayKey::new(next_day).start_in(&tz);
    }

    let saved = controller.submit(&mut session).await.map_err(notice)?;

    println!("{}", format!("  Created: {}", saved.title).green());
    println!();
    println!("{}", render_day(&session));

    Ok(())
}
