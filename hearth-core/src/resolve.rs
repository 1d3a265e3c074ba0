//! Projecting events onto calendar dates.

use chrono::NaiveDate;

use crate::event::{Event, EventKind, weekday_index};

impl Event {
    /// Whether this event has an occurrence on `date`.
    ///
    /// One-time and external events match only their pinned date. A series
    /// matches every date whose weekday is in its set, unless that exact date
    /// is excluded.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        match &self.kind {
            EventKind::External { date: pinned, .. } | EventKind::OneTime { date: pinned } => {
                *pinned == date
            }
            EventKind::Recurring { days, excluded } => {
                days.contains(weekday_index(date)) && !excluded.contains(&date)
            }
        }
    }
}

/// Events occurring on `date`, in input order.
pub fn events_for_date(events: &[Event], date: NaiveDate) -> Vec<&Event> {
    events.iter().filter(|event| event.occurs_on(date)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventRecord, load_events, parse_date};

    fn date(s: &str) -> NaiveDate {
        parse_date(s).expect("valid date")
    }

    fn ids<'a>(events: &[&'a Event]) -> Vec<&'a str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    fn one_time(id: &str, day: &str) -> EventRecord {
        EventRecord {
            id: id.into(),
            title: id.into(),
            is_recurring: Some(false),
            specific_date: Some(day.into()),
            ..Default::default()
        }
    }

    fn series(id: &str, days: &[i64], excluded: &[&str]) -> EventRecord {
        EventRecord {
            id: id.into(),
            title: id.into(),
            is_recurring: Some(true),
            days_of_week: days.to_vec(),
            excluded_dates: excluded.iter().map(|d| d.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_one_time_event_only_on_its_date() {
        let events = load_events(vec![one_time("once", "2024-03-05")]);

        assert_eq!(ids(&events_for_date(&events, date("2024-03-05"))), vec!["once"]);
        assert!(events_for_date(&events, date("2024-03-04")).is_empty());
        assert!(events_for_date(&events, date("2024-03-12")).is_empty());
    }

    #[test]
    fn test_recurring_event_respects_exclusions() {
        let events = load_events(vec![series("gym", &[0, 2], &["2024-03-04"])]);

        // 2024-03-04 is a Monday, but excluded.
        assert!(events_for_date(&events, date("2024-03-04")).is_empty());
        assert_eq!(ids(&events_for_date(&events, date("2024-03-06"))), vec!["gym"]);
        assert_eq!(ids(&events_for_date(&events, date("2024-03-11"))), vec!["gym"]);
        assert_eq!(ids(&events_for_date(&events, date("2024-03-13"))), vec!["gym"]);
        // Tuesday is not in the set.
        assert!(events_for_date(&events, date("2024-03-05")).is_empty());
    }

    #[test]
    fn test_external_event_ignores_recurrence_fields() {
        let mut record = one_time("gcal_1", "2024-03-05");
        record.source = Some("google".into());
        record.is_recurring = None;
        record.days_of_week = vec![0, 1, 2, 3, 4, 5, 6];
        record.excluded_dates = vec!["2024-03-05".into()];
        let events = load_events(vec![record]);

        assert_eq!(ids(&events_for_date(&events, date("2024-03-05"))), vec!["gcal_1"]);
        assert!(events_for_date(&events, date("2024-03-06")).is_empty());
    }

    #[test]
    fn test_series_without_days_never_matches() {
        let events = load_events(vec![series("empty", &[], &[])]);
        let monday = date("2024-03-04");

        for offset in 0..7 {
            assert!(events_for_date(&events, monday + chrono::Duration::days(offset)).is_empty());
        }
    }

    #[test]
    fn test_results_keep_input_order() {
        let events = load_events(vec![
            one_time("c", "2024-03-06"),
            series("a", &[2], &[]),
            one_time("b", "2024-03-06"),
        ]);

        assert_eq!(ids(&events_for_date(&events, date("2024-03-06"))), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_resolution_is_idempotent_and_does_not_mutate() {
        let events = load_events(vec![
            series("gym", &[0, 2], &["2024-03-04"]),
            one_time("once", "2024-03-06"),
        ]);
        let snapshot = events.clone();

        let first: Vec<Event> = events_for_date(&events, date("2024-03-06"))
            .into_iter()
            .cloned()
            .collect();
        let second: Vec<Event> = events_for_date(&events, date("2024-03-06"))
            .into_iter()
            .cloned()
            .collect();

        assert_eq!(first, second);
        assert_eq!(events, snapshot);
    }
}
