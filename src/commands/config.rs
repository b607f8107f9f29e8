use anyhow::Result;
use daymark_core::config::DaymarkConfig;
use daymark_core::provider::ProcessGateway;
use owo_colors::OwoColorize;

use super::notice;
use crate::viewer_timezone;

pub fn run(
    mut config: DaymarkConfig,
    set_timezone: Option<String>,
    set_provider: Option<String>,
) -> Result<()> {
    let config_path = DaymarkConfig::config_path().map_err(notice)?;

    if set_timezone.is_some() || set_provider.is_some() {
        apply_settings(&mut config, set_timezone, set_provider)?;
        config.save_to(&config_path).map_err(notice)?;
        println!("{}", format!("  Saved {}", config_path.display()).green());
        println!();
    }

    let tz = viewer_timezone(&config)?;
    let provider = ProcessGateway::from_name(&config.provider);

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!();
    println!("{}", "Settings".bold());
    println!("  Provider:   {} ({})", provider.name(), provider.binary_name().dimmed());
    println!("  Time zone:  {}", tz);
    println!("  Timeout:    {}s", config.provider_timeout_secs);

    Ok(())
}

/// Apply `--set-*` flags, rejecting values that would not load back.
fn apply_settings(
    config: &mut DaymarkConfig,
    timezone: Option<String>,
    provider: Option<String>,
) -> Result<()> {
    if let Some(timezone) = timezone {
        config.timezone = Some(timezone.trim().to_string());
        config.timezone().map_err(notice)?;
    }

    if let Some(provider) = provider {
        let provider = provider.trim();
        if provider.is_empty() || provider.contains(std::path::is_separator) {
            anyhow::bail!("Invalid provider name '{}'", provider);
        }
        config.provider = provider.to_string();
    }

    Ok(())
}
