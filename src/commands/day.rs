use anyhow::Result;
use chrono_tz::Tz;
use daymark_core::{CalendarGateway, EventController};

use crate::parse::day_or_today;
use crate::render::render_day;

pub async fn run<G: CalendarGateway>(
    controller: &EventController<G>,
    tz: Tz,
    date: Option<&str>,
) -> Result<()> {
    let day = day_or_today(date, &tz)?;
    let session = super::open_session(controller, day, tz).await?;

    println!("{}", render_day(&session));

    Ok(())
}
