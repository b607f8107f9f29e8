//! Global daymark configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PROVIDER, DEFAULT_PROVIDER_TIMEOUT_SECS};
use crate::error::{DaymarkError, DaymarkResult};

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_provider_timeout_secs() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_SECS
}

/// Configuration at ~/.config/daymark/config.toml
///
/// Any key can be overridden from the environment with a `DAYMARK_` prefix,
/// e.g. `DAYMARK_TIMEZONE=Europe/Madrid`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DaymarkConfig {
    /// Provider binary suffix: `local` runs `daymark-provider-local`.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// IANA zone used to decide which day an event is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
}

impl Default for DaymarkConfig {
    fn default() -> Self {
        DaymarkConfig {
            provider: default_provider(),
            timezone: None,
            provider_timeout_secs: default_provider_timeout_secs(),
        }
    }
}

impl DaymarkConfig {
    pub fn config_path() -> DaymarkResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DaymarkError::Config("Could not determine config directory".into()))?
            .join("daymark");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config, writing a commented default file on first run.
    pub fn load() -> DaymarkResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> DaymarkResult<Self> {
        let config: DaymarkConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("DAYMARK").try_parsing(true))
            .build()
            .map_err(|e| DaymarkError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| DaymarkError::Config(e.to_string()))?;

        if config.provider_timeout_secs == 0 {
            return Err(DaymarkError::Config(
                "provider_timeout_secs must be at least 1".into(),
            ));
        }

        Ok(config)
    }

    /// Save the current config to its default location.
    pub fn save(&self) -> DaymarkResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> DaymarkResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DaymarkError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| DaymarkError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> DaymarkResult<()> {
        let contents = format!(
            "\
# daymark configuration

# Calendar provider (runs daymark-provider-<name>):
# provider = \"{}\"

# Time zone used to group events by day (defaults to the system zone):
# timezone = \"Europe/Madrid\"

# Seconds to wait for the provider before giving up:
# provider_timeout_secs = {}
",
            DEFAULT_PROVIDER, DEFAULT_PROVIDER_TIMEOUT_SECS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DaymarkError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DaymarkError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// The configured zone, if one is set.
    pub fn timezone(&self) -> DaymarkResult<Option<Tz>> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|_| DaymarkError::Config(format!("Unknown time zone '{}'", name)))
            })
            .transpose()
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}
