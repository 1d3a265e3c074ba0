//! Shared defaults.

/// Duration assumed for a timed event without a usable end time.
pub const DEFAULT_EVENT_MINUTES: u32 = 60;

/// First hour shown on the calendar grid.
pub const DEFAULT_START_HOUR: u32 = 8;

/// Last hour shown on the calendar grid (inclusive).
pub const DEFAULT_END_HOUR: u32 = 21;

pub const DEFAULT_CALENDAR_TITLE: &str = "Weekly Calendar";

/// How long fetched display settings are trusted before refetching.
pub const SETTINGS_TTL_SECS: i64 = 300;
