//! Calendar events as the dashboard consumes them.
//!
//! Rows arrive from the event store (or a provider) as loosely typed
//! [`EventRecord`]s: most fields are optional and `is_recurring` defaults to
//! true when absent. [`Event::from_record`] resolves that optionality once,
//! into a required [`EventKind`] variant, so day resolution never has to ask
//! whether a field was absent or false.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::{HearthError, HearthResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// `source` value of events fetched from Google Calendar. Any other value,
/// or none, marks a local event.
pub const GOOGLE_SOURCE: &str = "google";

/// Palette an event can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    Red,
    Cyan,
    #[default]
    Blue,
    Green,
    Yellow,
    Gray,
    Purple,
    Pink,
    Orange,
    Indigo,
}

impl EventColor {
    pub const ALL: [EventColor; 10] = [
        EventColor::Red,
        EventColor::Cyan,
        EventColor::Blue,
        EventColor::Green,
        EventColor::Yellow,
        EventColor::Gray,
        EventColor::Purple,
        EventColor::Pink,
        EventColor::Orange,
        EventColor::Indigo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventColor::Red => "red",
            EventColor::Cyan => "cyan",
            EventColor::Blue => "blue",
            EventColor::Green => "green",
            EventColor::Yellow => "yellow",
            EventColor::Gray => "gray",
            EventColor::Purple => "purple",
            EventColor::Pink => "pink",
            EventColor::Orange => "orange",
            EventColor::Indigo => "indigo",
        }
    }

    /// Look up a palette entry by name. Unknown names fall back to blue.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
            .unwrap_or_default()
    }
}

impl fmt::Display for EventColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Monday-relative weekday index: Monday = 0 … Sunday = 6.
///
/// Equivalent to remapping a Sunday-first day number `d` with
/// `if d == 0 { 6 } else { d - 1 }`.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// Set of Monday-relative weekday indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    /// Adds a weekday. Returns false (and changes nothing) if `index` is not in `0..=6`.
    pub fn insert(&mut self, index: u8) -> bool {
        if index > 6 {
            return false;
        }
        self.0 |= 1 << index;
        true
    }

    pub fn contains(&self, index: u8) -> bool {
        index <= 6 && self.0 & (1 << index) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..7u8).filter(|i| self.contains(*i))
    }
}

impl FromIterator<u8> for WeekdaySet {
    /// Out-of-range indices are ignored.
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for index in iter {
            set.insert(index);
        }
        set
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventTiming {
    AllDay,
    /// `start` is only absent for malformed rows; such events are listed
    /// but never placed on the time grid.
    Timed {
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    },
}

/// What kind of event this is, and therefore which dates it lands on.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A local event on exactly one date.
    OneTime { date: NaiveDate },
    /// A local weekly series. `excluded` holds dates whose occurrence was
    /// deleted or replaced by a detached one-time event.
    Recurring {
        days: WeekdaySet,
        excluded: BTreeSet<NaiveDate>,
    },
    /// A read-only event from an external calendar, always pinned to one date.
    External {
        date: NaiveDate,
        html_link: Option<String>,
        remote_id: Option<String>,
    },
}

/// A calendar event (typed)
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color: EventColor,
    pub timing: EventTiming,
    pub kind: EventKind,
}

impl Event {
    pub fn is_all_day(&self) -> bool {
        matches!(self.timing, EventTiming::AllDay)
    }

    pub fn start_time(&self) -> Option<NaiveTime> {
        match self.timing {
            EventTiming::AllDay => None,
            EventTiming::Timed { start, .. } => start,
        }
    }

    pub fn end_time(&self) -> Option<NaiveTime> {
        match self.timing {
            EventTiming::AllDay => None,
            EventTiming::Timed { end, .. } => end,
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self.kind, EventKind::Recurring { .. })
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.kind, EventKind::External { .. })
    }

    /// The date a one-time or external event is pinned to.
    pub fn pinned_date(&self) -> Option<NaiveDate> {
        match self.kind {
            EventKind::OneTime { date } | EventKind::External { date, .. } => Some(date),
            EventKind::Recurring { .. } => None,
        }
    }

    /// Convert a store row into a typed event.
    ///
    /// Rejects one-time and external rows without a parseable `specific_date`,
    /// since they cannot land on any date. Everything else is coerced: bad
    /// weekday indices, exclusion dates and times are dropped with a warning.
    pub fn from_record(record: EventRecord) -> HearthResult<Self> {
        let EventRecord {
            id,
            title,
            description,
            location,
            color,
            is_all_day,
            is_recurring,
            start_time,
            end_time,
            specific_date,
            days_of_week,
            excluded_dates,
            source,
            google_event_id,
            google_html_link,
        } = record;

        let kind = if source.as_deref() == Some(GOOGLE_SOURCE) {
            EventKind::External {
                date: required_date(&id, specific_date.as_deref())?,
                html_link: google_html_link,
                remote_id: google_event_id,
            }
        } else if is_recurring == Some(false) {
            EventKind::OneTime {
                date: required_date(&id, specific_date.as_deref())?,
            }
        } else {
            EventKind::Recurring {
                days: weekday_set(&id, &days_of_week),
                excluded: exclusion_set(&id, &excluded_dates),
            }
        };

        let timing = if is_all_day.unwrap_or(false) {
            EventTiming::AllDay
        } else {
            EventTiming::Timed {
                start: optional_time(&id, "start_time", start_time.as_deref()),
                end: optional_time(&id, "end_time", end_time.as_deref()),
            }
        };

        Ok(Event {
            id,
            title,
            description: description.filter(|d| !d.is_empty()),
            location: location.filter(|l| !l.is_empty()),
            color: color.as_deref().map(EventColor::from_name).unwrap_or_default(),
            timing,
            kind,
        })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Convert a snapshot of store rows, skipping rows that cannot be placed.
pub fn load_events(records: Vec<EventRecord>) -> Vec<Event> {
    records
        .into_iter()
        .filter_map(|record| match Event::from_record(record) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Skipping event: {}", e);
                None
            }
        })
        .collect()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Parse `HH:MM` (or `HH:MM:SS`, as SQL `time` columns return it).
/// Seconds are dropped.
pub fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
        .and_then(|t| t.with_second(0))
}

/// Minutes past midnight.
pub fn minutes_of(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

fn required_date(id: &str, value: Option<&str>) -> HearthResult<NaiveDate> {
    let raw = value.ok_or_else(|| HearthError::InvalidRecord {
        id: id.to_string(),
        reason: "missing specific_date".into(),
    })?;

    parse_date(raw).ok_or_else(|| HearthError::InvalidRecord {
        id: id.to_string(),
        reason: format!("invalid specific_date '{}'", raw),
    })
}

fn weekday_set(id: &str, days: &[i64]) -> WeekdaySet {
    let mut set = WeekdaySet::EMPTY;
    for &day in days {
        let accepted = u8::try_from(day).is_ok_and(|d| set.insert(d));
        if !accepted {
            warn!(event = id, day, "Ignoring weekday index outside 0..=6");
        }
    }
    set
}

fn exclusion_set(id: &str, dates: &[String]) -> BTreeSet<NaiveDate> {
    dates
        .iter()
        .filter_map(|raw| {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                warn!(event = id, date = raw.as_str(), "Ignoring invalid excluded date");
            }
            parsed
        })
        .collect()
}

fn optional_time(id: &str, field: &str, value: Option<&str>) -> Option<NaiveTime> {
    let raw = value.filter(|v| !v.trim().is_empty())?;
    let parsed = parse_time_of_day(raw);
    if parsed.is_none() {
        warn!(event = id, field, value = raw, "Ignoring invalid time of day");
    }
    parsed
}

/// An event row as stored (and as providers hand it over).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_all_day: Option<bool>,
    /// Absent means recurring (rows predating one-time events).
    #[serde(default)]
    pub is_recurring: Option<bool>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub specific_date: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub days_of_week: Vec<i64>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub excluded_dates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_html_link: Option<String>,
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        let (start_time, end_time) = match event.timing {
            EventTiming::AllDay => (None, None),
            EventTiming::Timed { start, end } => (
                start.map(|t| t.format(TIME_FORMAT).to_string()),
                end.map(|t| t.format(TIME_FORMAT).to_string()),
            ),
        };

        let mut record = EventRecord {
            id: event.id.clone(),
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            color: Some(event.color.name().to_string()),
            is_all_day: Some(event.is_all_day()),
            start_time,
            end_time,
            ..Default::default()
        };

        match &event.kind {
            EventKind::OneTime { date } => {
                record.is_recurring = Some(false);
                record.specific_date = Some(date.format(DATE_FORMAT).to_string());
            }
            EventKind::Recurring { days, excluded } => {
                record.is_recurring = Some(true);
                record.days_of_week = days.iter().map(i64::from).collect();
                record.excluded_dates = excluded
                    .iter()
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .collect();
            }
            EventKind::External {
                date,
                html_link,
                remote_id,
            } => {
                record.is_recurring = Some(false);
                record.specific_date = Some(date.format(DATE_FORMAT).to_string());
                record.source = Some(GOOGLE_SOURCE.to_string());
                record.google_html_link = html_link.clone();
                record.google_event_id = remote_id.clone();
            }
        }

        record
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Accepts `null`, a single value, or an array.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(values)) => values,
        Some(OneOrMany::One(value)) => vec![value],
    })
}

/// Treats `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).expect("valid date")
    }

    #[test]
    fn test_weekday_index_matches_sunday_first_remap() {
        // 2024-03-03 is a Sunday; walk the following week.
        let sunday = date("2024-03-03");
        for native in 0..7u32 {
            let day = sunday + chrono::Duration::days(native as i64);
            let expected = (if native == 0 { 6 } else { native - 1 }) as u8;
            assert_eq!(weekday_index(day), expected, "native day {}", native);
        }
        assert_eq!(weekday_index(date("2024-03-06")), 2, "Wednesday");
        assert_eq!(weekday_index(date("2024-03-10")), 6, "Sunday");
    }

    #[test]
    fn test_weekday_set_rejects_out_of_range() {
        let mut set = WeekdaySet::EMPTY;
        assert!(set.insert(0));
        assert!(set.insert(6));
        assert!(!set.insert(7));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 6]);
        assert!(!set.contains(7));
    }

    #[test]
    fn test_color_falls_back_to_blue() {
        assert_eq!(EventColor::from_name("purple"), EventColor::Purple);
        assert_eq!(EventColor::from_name("Orange"), EventColor::Orange);
        assert_eq!(EventColor::from_name("magenta"), EventColor::Blue);
    }

    #[test]
    fn test_parse_time_of_day_accepts_seconds() {
        assert_eq!(parse_time_of_day("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_time_of_day("09:30:45"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_time_of_day("half past nine"), None);
        assert_eq!(minutes_of(NaiveTime::from_hms_opt(13, 15, 0).unwrap()), 795);
    }

    #[test]
    fn test_absent_is_recurring_means_recurring() {
        let record: EventRecord = serde_json::from_str(
            r#"{"id": 7, "title": "Bins", "days_of_week": [1], "start_time": "07:00"}"#,
        )
        .expect("Should deserialize");

        let event = Event::from_record(record).expect("Should convert");
        assert_eq!(event.id, "7");
        assert!(event.is_recurring());
        assert_eq!(event.color, EventColor::Blue);
        assert_eq!(event.start_time(), NaiveTime::from_hms_opt(7, 0, 0));
        assert_eq!(event.end_time(), None);
    }

    #[test]
    fn test_scalar_days_and_exclusions_are_accepted() {
        let record: EventRecord = serde_json::from_str(
            r#"{"id": "a", "title": "Swim", "is_recurring": true,
                "days_of_week": 3, "excluded_dates": "2024-03-07"}"#,
        )
        .expect("Should deserialize");

        assert_eq!(record.days_of_week, vec![3]);
        assert_eq!(record.excluded_dates, vec!["2024-03-07".to_string()]);

        let record: EventRecord =
            serde_json::from_str(r#"{"id": "b", "days_of_week": null, "excluded_dates": null}"#)
                .expect("Should deserialize");
        assert!(record.days_of_week.is_empty());
        assert!(record.excluded_dates.is_empty());
    }

    #[test]
    fn test_recurring_ignores_specific_date_and_bad_values() {
        let record = EventRecord {
            id: "r".into(),
            title: "Piano".into(),
            is_recurring: Some(true),
            specific_date: Some("2024-03-05".into()),
            days_of_week: vec![0, 2, 9, -1],
            excluded_dates: vec!["2024-03-04".into(), "not-a-date".into()],
            ..Default::default()
        };

        let event = Event::from_record(record).expect("Should convert");
        match &event.kind {
            EventKind::Recurring { days, excluded } => {
                assert_eq!(days.iter().collect::<Vec<_>>(), vec![0, 2]);
                assert_eq!(excluded.iter().copied().collect::<Vec<_>>(), vec![date("2024-03-04")]);
            }
            other => panic!("Expected Recurring, got {:?}", other),
        }
        assert_eq!(event.pinned_date(), None);
    }

    #[test]
    fn test_null_title_reads_as_empty() {
        let record: EventRecord = serde_json::from_str(
            r#"{"id": 3, "title": null, "is_recurring": false, "specific_date": "2024-03-05"}"#,
        )
        .expect("Should deserialize");

        assert_eq!(record.title, "");
        assert!(Event::from_record(record).is_ok());
    }

    #[test]
    fn test_one_time_without_date_is_rejected() {
        let record = EventRecord {
            id: "x".into(),
            is_recurring: Some(false),
            ..Default::default()
        };
        assert!(matches!(
            Event::from_record(record),
            Err(HearthError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_google_source_is_external_regardless_of_recurrence_fields() {
        let record = EventRecord {
            id: "gcal_1".into(),
            title: "Dentist".into(),
            is_recurring: Some(true),
            days_of_week: vec![0, 1, 2],
            specific_date: Some("2024-03-05".into()),
            source: Some("google".into()),
            google_html_link: Some("https://calendar.google.com/e/1".into()),
            ..Default::default()
        };

        let event = Event::from_record(record).expect("Should convert");
        assert!(event.is_read_only());
        assert!(!event.is_recurring());
        assert_eq!(event.pinned_date(), Some(date("2024-03-05")));
    }

    #[test]
    fn test_load_events_skips_unplaceable_rows() {
        let records = vec![
            EventRecord {
                id: "ok".into(),
                is_recurring: Some(false),
                specific_date: Some("2024-03-05".into()),
                ..Default::default()
            },
            EventRecord {
                id: "bad".into(),
                is_recurring: Some(false),
                specific_date: Some("05/03/2024".into()),
                ..Default::default()
            },
        ];

        let events = load_events(records);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "ok");
    }

    #[test]
    fn test_record_conversion_preserves_series() {
        let record = EventRecord {
            id: "s".into(),
            title: "Football".into(),
            color: Some("green".into()),
            is_all_day: Some(false),
            is_recurring: Some(true),
            start_time: Some("17:30".into()),
            end_time: Some("18:30".into()),
            days_of_week: vec![1, 3],
            excluded_dates: vec!["2024-03-05".into()],
            ..Default::default()
        };

        let event = Event::from_record(record).expect("Should convert");
        let back = EventRecord::from(&event);
        let again = Event::from_record(back.clone()).expect("Should convert again");

        assert_eq!(event, again);
        assert_eq!(back.source, None, "local rows carry no source");
        assert_eq!(back.days_of_week, vec![1, 3]);
    }
}
