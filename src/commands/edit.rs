use anyhow::Result;
use chrono_tz::Tz;
use clap::Args;
use daymark_core::{CalendarGateway, EventController};
use owo_colors::OwoColorize;

use super::{loaded_event, notice};
use crate::parse::{day_or_today, parse_when};
use crate::render::render_day;

#[derive(Args)]
pub struct EditArgs {
    pub id: String,

    /// Day the event is on, if it is more than a month away
    #[arg(short, long)]
    pub date: Option<String>,

    #[arg(short, long)]
    pub title: Option<String>,

    /// New start time (HH:MM on the event's day, or YYYY-MM-DDTHH:MM).
    /// The event keeps its length unless --end is also given.
    #[arg(short, long)]
    pub start: Option<String>,

    /// New end time (HH:MM on the event's day, or YYYY-MM-DDTHH:MM)
    #[arg(short, long)]
    pub end: Option<String>,

    #[arg(short, long)]
    pub notes: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,
}

pub async fn run<G: CalendarGateway>(
    controller: &EventController<G>,
    tz: Tz,
    args: EditArgs,
) -> Result<()> {
    let day = day_or_today(args.date.as_deref(), &tz)?;
    let mut session = super::open_session(controller, day, tz).await?;

    let existing = loaded_event(&session, &args.id)?;
    let event_day = existing.day(&tz);

    let start = match &args.start {
        Some(s) => {
            let (d, t) = parse_when(s)?.on(event_day);
            Some(d.at(t, &tz))
        }
        None => None,
    };
    let end = match &args.end {
        Some(s) => {
            let (d, t) = parse_when(s)?.on(event_day);
            Some(d.at(t, &tz))
        }
        None => None,
    };

    let draft = session.begin_edit(&existing).map_err(notice)?;
    if let Some(title) = args.title {
        draft.title = title;
    }
    if let Some(notes) = args.notes {
        draft.notes = notes;
    }
    if let Some(location) = args.location {
        draft.location = location;
    }
    if let Some(start) = start {
        let length = draft.end - draft.start;
        draft.start = start;
        draft.end = start + length;
    }
    if let Some(end) = end {
        draft.end = end;
    }

    let saved = controller.submit(&mut session).await.map_err(notice)?;

    println!("{}", format!("  Updated: {}", saved.title).yellow());
    println!();
    println!("{}", render_day(&session));

    Ok(())
}
