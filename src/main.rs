mod commands;
mod parse;
mod render;

use anyhow::Result;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use daymark_core::EventController;
use daymark_core::config::DaymarkConfig;
use daymark_core::provider::ProcessGateway;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::edit::EditArgs;
use crate::commands::new::NewArgs;
use crate::commands::notice;

#[derive(Parser)]
#[command(name = "daymark")]
#[command(about = "Browse your calendar by day and add, edit or delete events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the month around a day, with days that have events highlighted
    Month {
        /// Day to select (YYYY-MM-DD, "today" or "tomorrow")
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List the events on a day
    Day {
        /// Day to list (YYYY-MM-DD, "today" or "tomorrow")
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Create an event
    New(NewArgs),
    /// Change an existing event
    Edit(EditArgs),
    /// Delete an event
    Delete {
        id: String,

        /// Day the event is on, if it is more than a month away
        #[arg(short, long)]
        date: Option<String>,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show configuration, or change a setting
    Config {
        /// Save an IANA time zone (e.g. Europe/Madrid) for grouping events by day
        #[arg(long)]
        set_timezone: Option<String>,

        /// Save the provider to use (runs daymark-provider-<name>)
        #[arg(long)]
        set_provider: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DAYMARK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DaymarkConfig::load().map_err(notice)?;

    if let Commands::Config {
        set_timezone,
        set_provider,
    } = cli.command
    {
        return commands::config::run(config, set_timezone, set_provider);
    }

    let tz = viewer_timezone(&config)?;

    let gateway =
        ProcessGateway::from_name(&config.provider).with_timeout(config.provider_timeout());
    let controller = EventController::connect(gateway).await.map_err(notice)?;

    match cli.command {
        Commands::Month { date } => commands::month::run(&controller, tz, date.as_deref()).await,
        Commands::Day { date } => commands::day::run(&controller, tz, date.as_deref()).await,
        Commands::New(args) => commands::new::run(&controller, tz, args).await,
        Commands::Edit(args) => commands::edit::run(&controller, tz, args).await,
        Commands::Delete { id, date, yes } => {
            commands::delete::run(&controller, tz, &id, date.as_deref(), yes).await
        }
        Commands::Config { .. } => Ok(()),
    }
}

/// The configured zone, else the system zone, else UTC.
pub(crate) fn viewer_timezone(config: &DaymarkConfig) -> Result<Tz> {
    if let Some(tz) = config.timezone().map_err(notice)? {
        return Ok(tz);
    }

    match iana_time_zone::get_timezone() {
        Ok(name) => match name.parse::<Tz>() {
            Ok(tz) => Ok(tz),
            Err(_) => {
                debug!(zone = %name, "unknown system time zone, using UTC");
                Ok(Tz::UTC)
            }
        },
        Err(e) => {
            debug!(error = %e, "could not read system time zone, using UTC");
            Ok(Tz::UTC)
        }
    }
}
