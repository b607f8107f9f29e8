//! Shared limits and defaults.

/// Maximum title length, in characters.
pub const MAX_TITLE_LEN: usize = 100;

/// Maximum location length, in characters.
pub const MAX_LOCATION_LEN: usize = 100;

/// Maximum notes length, in characters.
pub const MAX_NOTES_LEN: usize = 500;

/// Default length of a new event.
pub const DEFAULT_EVENT_MINUTES: i64 = 60;

/// Months loaded on each side of the selected day.
pub const WINDOW_MONTHS: u32 = 1;

/// Per-call timeout for provider subprocesses.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Provider used when the config doesn't name one.
pub const DEFAULT_PROVIDER: &str = "local";
