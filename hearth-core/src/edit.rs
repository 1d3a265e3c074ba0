//! Creating local events and changing their fields.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Weekday};
use uuid::Uuid;

use crate::error::{HearthError, HearthResult};
use crate::event::{Event, EventColor, EventKind, EventTiming, WeekdaySet, parse_time_of_day};
use crate::series::ensure_editable;

/// Color of a new event unless one is given.
pub const DEFAULT_NEW_COLOR: EventColor = EventColor::Purple;

fn default_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_end() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Field changes for an event. `None` keeps the current value; an empty
/// description or location clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color: Option<EventColor>,
    pub all_day: Option<bool>,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    /// Make the event a one-time event on this date.
    pub date: Option<NaiveDate>,
    /// Make the event weekly on these days.
    pub days: Option<WeekdaySet>,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl EventChanges {
    pub fn is_empty(&self) -> bool {
        *self == EventChanges::default()
    }

    fn check(&self) -> HearthResult<()> {
        if self.date.is_some() && self.days.is_some() {
            return Err(HearthError::InvalidEvent(
                "an event is either on a date or on weekdays, not both".into(),
            ));
        }
        if self.days.is_some_and(|days| days.is_empty()) {
            return Err(HearthError::InvalidEvent(
                "a weekly event needs at least one day".into(),
            ));
        }
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(HearthError::InvalidEvent("title cannot be empty".into()));
        }
        Ok(())
    }

    /// A new local event with a fresh id.
    ///
    /// Needs a title and either a date or weekdays. Timed events default to
    /// 09:00 to 10:00.
    pub fn create(&self) -> HearthResult<Event> {
        self.check()?;

        let title = self
            .title
            .as_deref()
            .and_then(non_empty)
            .ok_or_else(|| HearthError::InvalidEvent("a new event needs a title".into()))?;

        let kind = match (self.date, self.days) {
            (Some(date), _) => EventKind::OneTime { date },
            (None, Some(days)) => EventKind::Recurring {
                days,
                excluded: Default::default(),
            },
            (None, None) => {
                return Err(HearthError::InvalidEvent(
                    "a new event needs a date or weekdays".into(),
                ));
            }
        };

        let timing = if self.all_day.unwrap_or(false) {
            EventTiming::AllDay
        } else {
            EventTiming::Timed {
                start: Some(self.start.unwrap_or_else(default_start)),
                end: Some(self.end.unwrap_or_else(default_end)),
            }
        };

        Ok(Event {
            id: Uuid::new_v4().to_string(),
            title,
            description: self.description.as_deref().and_then(non_empty),
            location: self.location.as_deref().and_then(non_empty),
            color: self.color.unwrap_or(DEFAULT_NEW_COLOR),
            timing,
            kind,
        })
    }

    /// `event` with these changes applied. External events are refused.
    ///
    /// Switching a series to a date drops its exclusions; changing a
    /// series' days keeps them.
    pub fn apply(&self, event: &Event) -> HearthResult<Event> {
        ensure_editable(event)?;
        self.check()?;

        let timing = match (self.all_day, &event.timing) {
            (Some(true), _) => EventTiming::AllDay,
            (Some(false), EventTiming::AllDay) => EventTiming::Timed {
                start: Some(self.start.unwrap_or_else(default_start)),
                end: Some(self.end.unwrap_or_else(default_end)),
            },
            (None, EventTiming::AllDay) if self.start.is_none() && self.end.is_none() => {
                EventTiming::AllDay
            }
            (_, EventTiming::AllDay) => EventTiming::Timed {
                start: self.start,
                end: self.end,
            },
            (_, EventTiming::Timed { start, end }) => EventTiming::Timed {
                start: self.start.or(*start),
                end: self.end.or(*end),
            },
        };

        let kind = match (self.date, self.days, &event.kind) {
            (Some(date), _, _) => EventKind::OneTime { date },
            (None, Some(days), EventKind::Recurring { excluded, .. }) => EventKind::Recurring {
                days,
                excluded: excluded.clone(),
            },
            (None, Some(days), _) => EventKind::Recurring {
                days,
                excluded: Default::default(),
            },
            (None, None, kind) => kind.clone(),
        };

        Ok(Event {
            id: event.id.clone(),
            title: self
                .title
                .as_deref()
                .and_then(non_empty)
                .unwrap_or_else(|| event.title.clone()),
            description: match &self.description {
                Some(d) => non_empty(d),
                None => event.description.clone(),
            },
            location: match &self.location {
                Some(l) => non_empty(l),
                None => event.location.clone(),
            },
            color: self.color.unwrap_or(event.color),
            timing,
            kind,
        })
    }
}

/// Parse weekdays given as names (`mon`, `Tuesday`) or Monday-relative
/// indices (`0`..`6`), separated by commas.
pub fn parse_weekdays(s: &str) -> HearthResult<WeekdaySet> {
    let mut days = WeekdaySet::EMPTY;
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let index = match part.parse::<u8>() {
            Ok(index) => index,
            Err(_) => Weekday::from_str(part)
                .map(|day| day.num_days_from_monday() as u8)
                .map_err(|_| HearthError::InvalidEvent(format!("unknown weekday '{}'", part)))?,
        };
        if !days.insert(index) {
            return Err(HearthError::InvalidEvent(format!(
                "weekday index {} is outside 0-6",
                index
            )));
        }
    }

    if days.is_empty() {
        return Err(HearthError::InvalidEvent("no weekdays given".into()));
    }
    Ok(days)
}

/// Parse a palette color name, rejecting unknown names.
pub fn parse_color(s: &str) -> HearthResult<EventColor> {
    let name = s.trim();
    EventColor::ALL
        .into_iter()
        .find(|c| c.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let known: Vec<&str> = EventColor::ALL.iter().map(|c| c.name()).collect();
            HearthError::InvalidEvent(format!(
                "unknown color '{}'. Available: {}",
                name,
                known.join(", ")
            ))
        })
}

/// Parse an `HH:MM` time given on the command line.
pub fn parse_time(s: &str) -> HearthResult<NaiveTime> {
    parse_time_of_day(s)
        .ok_or_else(|| HearthError::InvalidEvent(format!("invalid time '{}'. Expected HH:MM", s)))
}
