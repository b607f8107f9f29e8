use anyhow::Result;
use chrono_tz::Tz;
use daymark_core::{CalendarGateway, EventController};
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use super::{loaded_event, notice};
use crate::parse::day_or_today;

pub async fn run<G: CalendarGateway>(
    controller: &EventController<G>,
    tz: Tz,
    id: &str,
    date: Option<&str>,
    yes: bool,
) -> Result<()> {
    let day = day_or_today(date, &tz)?;
    let mut session = super::open_session(controller, day, tz).await?;
    let event = loaded_event(&session, id)?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("  Delete \"{}\"?", event.title))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "  Cancelled".dimmed());
            return Ok(());
        }
    }

    controller.remove(&mut session, &event.id).await.map_err(notice)?;
    println!("{}", format!("  Deleted: {}", event.title).red());

    Ok(())
}
