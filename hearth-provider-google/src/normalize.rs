//! Google Calendar API events and their conversion into dashboard events.

use anyhow::{Result, bail};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use hearth_core::event::{Event, EventColor, EventKind, EventTiming};
use serde::Deserialize;

pub const EVENT_ID_PREFIX: &str = "gcal_";
const UNTITLED: &str = "(No title)";

/// The subset of the Calendar API `Event` resource the dashboard uses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub html_link: Option<String>,
    #[serde(default)]
    pub color_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start: Option<GoogleEventTime>,
    #[serde(default)]
    pub end: Option<GoogleEventTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventTime {
    /// Set for all-day events.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub date_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleEventList {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleCalendarMeta {
    #[serde(default)]
    pub summary: Option<String>,
}

/// Map a Google `colorId` onto the dashboard palette.
pub fn color_for_id(color_id: Option<&str>) -> EventColor {
    match color_id.unwrap_or("1") {
        "1" | "9" => EventColor::Blue,
        "2" | "10" => EventColor::Green,
        "3" => EventColor::Purple,
        "4" => EventColor::Pink,
        "5" => EventColor::Yellow,
        "6" => EventColor::Orange,
        "7" => EventColor::Cyan,
        "8" => EventColor::Gray,
        "11" => EventColor::Red,
        _ => EventColor::Blue,
    }
}

impl GoogleEvent {
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }

    /// Convert into a read-only event pinned to its start date in `tz`.
    ///
    /// Timed events get `HH:MM` start/end times in `tz`; an event spanning
    /// midnight stays on its start date.
    pub fn into_event<Tz: TimeZone>(self, tz: &Tz) -> Result<Event> {
        let Some(start) = self.start.as_ref() else {
            bail!("Google event {} has no start", self.id);
        };

        let (date, timing) = if let Some(date) = start.date {
            (date, EventTiming::AllDay)
        } else if let Some(start_dt) = start.date_time {
            let local_start = start_dt.with_timezone(tz);
            let local_end = self
                .end
                .as_ref()
                .and_then(|end| end.date_time)
                .map(|end_dt| end_dt.with_timezone(tz).time());

            (
                local_start.date_naive(),
                EventTiming::Timed {
                    start: Some(local_start.time()),
                    end: local_end,
                },
            )
        } else {
            bail!("Google event {} has neither date nor dateTime", self.id);
        };

        Ok(Event {
            id: format!("{}{}", EVENT_ID_PREFIX, self.id),
            title: self
                .summary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string()),
            description: self.description.filter(|d| !d.is_empty()),
            location: self.location.filter(|l| !l.is_empty()),
            color: color_for_id(self.color_id.as_deref()),
            timing,
            kind: EventKind::External {
                date,
                html_link: self.html_link,
                remote_id: Some(self.id),
            },
        })
    }
}

/// Dashboard events for the items of one listing. Cancelled items and
/// items that cannot be converted are left out.
pub fn convert_items<Tz: TimeZone>(items: Vec<GoogleEvent>, tz: &Tz) -> Vec<Event> {
    items
        .into_iter()
        .filter(|item| !item.is_cancelled())
        .filter_map(|item| match item.into_event(tz) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!("Skipping Google event: {e:#}");
                None
            }
        })
        .collect()
}
