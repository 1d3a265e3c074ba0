//! Dashboard display settings.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::TtlCache;
use crate::constants::{
    DEFAULT_CALENDAR_TITLE, DEFAULT_END_HOUR, DEFAULT_START_HOUR, SETTINGS_TTL_SECS,
};
use crate::error::{HearthError, HearthResult};

fn default_title() -> String {
    DEFAULT_CALENDAR_TITLE.to_string()
}

fn default_start_hour() -> u32 {
    DEFAULT_START_HOUR
}

fn default_end_hour() -> u32 {
    DEFAULT_END_HOUR
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_title")]
    pub calendar_title: String,

    #[serde(default = "default_start_hour")]
    pub calendar_start_hour: u32,

    #[serde(default = "default_end_hour")]
    pub calendar_end_hour: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_calendar_id: Option<String>,

    /// Only used for public calendars when no service account is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            calendar_title: default_title(),
            calendar_start_hour: DEFAULT_START_HOUR,
            calendar_end_hour: DEFAULT_END_HOUR,
            google_calendar_id: None,
            google_api_key: None,
        }
    }
}

/// Fields to change; `None` leaves the current value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub calendar_title: Option<String>,
    pub calendar_start_hour: Option<u32>,
    pub calendar_end_hour: Option<u32>,
    pub google_calendar_id: Option<String>,
    pub google_api_key: Option<String>,
}

impl DisplaySettings {
    pub fn validate(&self) -> HearthResult<()> {
        if self.calendar_start_hour > 23 || self.calendar_end_hour > 23 {
            return Err(HearthError::InvalidSettings(
                "calendar hours must be between 0 and 23".into(),
            ));
        }
        if self.calendar_start_hour >= self.calendar_end_hour {
            return Err(HearthError::InvalidSettings(format!(
                "start hour {} must be before end hour {}",
                self.calendar_start_hour, self.calendar_end_hour
            )));
        }
        Ok(())
    }

    /// Apply `patch` on top of these settings, keeping unspecified fields.
    pub fn merge(&self, patch: SettingsPatch) -> HearthResult<Self> {
        let merged = DisplaySettings {
            calendar_title: patch
                .calendar_title
                .unwrap_or_else(|| self.calendar_title.clone()),
            calendar_start_hour: patch
                .calendar_start_hour
                .unwrap_or(self.calendar_start_hour),
            calendar_end_hour: patch.calendar_end_hour.unwrap_or(self.calendar_end_hour),
            google_calendar_id: patch
                .google_calendar_id
                .or_else(|| self.google_calendar_id.clone()),
            google_api_key: patch.google_api_key.or_else(|| self.google_api_key.clone()),
        };
        merged.validate()?;
        Ok(merged)
    }
}

/// Display settings with a five-minute cache in front of the loader.
#[derive(Debug)]
pub struct SettingsCache {
    cache: TtlCache<DisplaySettings>,
}

impl Default for SettingsCache {
    fn default() -> Self {
        SettingsCache::new(Duration::seconds(SETTINGS_TTL_SECS))
    }
}

impl SettingsCache {
    pub fn new(ttl: Duration) -> Self {
        SettingsCache {
            cache: TtlCache::new(ttl),
        }
    }

    /// Cached settings, or whatever `load` returns if the cache is cold.
    pub fn get_or_load<F>(&mut self, now: DateTime<Utc>, load: F) -> HearthResult<DisplaySettings>
    where
        F: FnOnce() -> HearthResult<DisplaySettings>,
    {
        if let Some(settings) = self.cache.get(now) {
            return Ok(settings.clone());
        }

        let settings = load()?;
        self.cache.insert(settings.clone(), now);
        Ok(settings)
    }

    /// Merge `patch` into the current settings, persist with `save`, and
    /// cache what was saved.
    pub fn update<L, S>(
        &mut self,
        now: DateTime<Utc>,
        patch: SettingsPatch,
        load: L,
        save: S,
    ) -> HearthResult<DisplaySettings>
    where
        L: FnOnce() -> HearthResult<DisplaySettings>,
        S: FnOnce(&DisplaySettings) -> HearthResult<()>,
    {
        let current = self.get_or_load(now, load)?;
        let merged = current.merge(patch)?;
        save(&merged)?;
        self.cache.insert(merged.clone(), now);
        Ok(merged)
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}
