//! Editing single occurrences of a weekly series.
//!
//! A series is never rewritten to change one date. Deleting an occurrence
//! adds its date to the series' exclusions; editing one does the same and
//! creates a one-time event on that date to carry the edits.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{HearthError, HearthResult};
use crate::event::{Event, EventKind};

/// The series with `date` added to its exclusions.
///
/// Excluding a date that is already excluded (or that the series never
/// lands on) is allowed and changes nothing else.
pub fn exclude_occurrence(series: &Event, date: NaiveDate) -> HearthResult<Event> {
    match &series.kind {
        EventKind::Recurring { days, excluded } => {
            let mut excluded = excluded.clone();
            excluded.insert(date);

            Ok(Event {
                kind: EventKind::Recurring {
                    days: *days,
                    excluded,
                },
                ..series.clone()
            })
        }
        EventKind::External { .. } => Err(HearthError::ReadOnlyEvent(series.id.clone())),
        EventKind::OneTime { .. } => Err(HearthError::NotRecurring(series.id.clone())),
    }
}

/// Split one occurrence off a series so it can be edited on its own.
///
/// Returns the series with `date` excluded, and a new one-time event on
/// `date` copying the series' title, color, timing and details.
pub fn detach_occurrence(series: &Event, date: NaiveDate) -> HearthResult<(Event, Event)> {
    let updated = exclude_occurrence(series, date)?;

    let occurrence = Event {
        id: Uuid::new_v4().to_string(),
        kind: EventKind::OneTime { date },
        ..series.clone()
    };

    Ok((updated, occurrence))
}

/// Local events may be changed or deleted; external ones may not.
pub fn ensure_editable(event: &Event) -> HearthResult<()> {
    if event.is_read_only() {
        return Err(HearthError::ReadOnlyEvent(event.id.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventRecord, parse_date};

    fn date(s: &str) -> NaiveDate {
        parse_date(s).expect("valid date")
    }

    fn gym() -> Event {
        Event::from_record(EventRecord {
            id: "gym".into(),
            title: "Gym".into(),
            color: Some("red".into()),
            is_recurring: Some(true),
            days_of_week: vec![0, 2],
            start_time: Some("07:00".into()),
            end_time: Some("08:00".into()),
            ..Default::default()
        })
        .expect("valid series")
    }

    #[test]
    fn test_exclude_removes_only_that_occurrence() {
        let series = gym();
        let updated = exclude_occurrence(&series, date("2024-03-04")).unwrap();

        assert!(series.occurs_on(date("2024-03-04")), "input is untouched");
        assert!(!updated.occurs_on(date("2024-03-04")));
        assert!(updated.occurs_on(date("2024-03-11")));
        assert!(updated.occurs_on(date("2024-03-06")));
    }

    #[test]
    fn test_exclude_is_idempotent() {
        let once = exclude_occurrence(&gym(), date("2024-03-04")).unwrap();
        let twice = exclude_occurrence(&once, date("2024-03-04")).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_detach_creates_pinned_copy() {
        let series = gym();
        let (updated, occurrence) = detach_occurrence(&series, date("2024-03-06")).unwrap();

        assert!(!updated.occurs_on(date("2024-03-06")));
        assert!(occurrence.occurs_on(date("2024-03-06")));
        assert!(!occurrence.occurs_on(date("2024-03-13")));
        assert_ne!(occurrence.id, series.id);
        assert_eq!(occurrence.title, "Gym");
        assert_eq!(occurrence.timing, series.timing);
        assert_eq!(occurrence.color, series.color);
    }

    #[test]
    fn test_one_time_and_external_events_cannot_be_split() {
        let one_time = Event::from_record(EventRecord {
            id: "once".into(),
            is_recurring: Some(false),
            specific_date: Some("2024-03-05".into()),
            ..Default::default()
        })
        .unwrap();
        let external = Event::from_record(EventRecord {
            id: "gcal_1".into(),
            specific_date: Some("2024-03-05".into()),
            source: Some("google".into()),
            ..Default::default()
        })
        .unwrap();

        assert!(matches!(
            exclude_occurrence(&one_time, date("2024-03-05")),
            Err(HearthError::NotRecurring(_))
        ));
        assert!(matches!(
            detach_occurrence(&external, date("2024-03-05")),
            Err(HearthError::ReadOnlyEvent(_))
        ));
        assert!(ensure_editable(&one_time).is_ok());
        assert!(ensure_editable(&external).is_err());
    }
}
