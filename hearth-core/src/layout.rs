//! Side-by-side placement of simultaneous timed events.
//!
//! Events are packed greedily into columns: each event goes into the first
//! column where it overlaps nothing already placed. The column count is
//! shared by the whole day, so every timed event of a day gets the same
//! width, even events in a quiet stretch of the day.

use chrono::NaiveDate;

use crate::constants::DEFAULT_EVENT_MINUTES;
use crate::event::{Event, minutes_of};
use crate::resolve::events_for_date;

/// A timed event with its grid column.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedEvent<'a> {
    pub event: &'a Event,
    /// Zero-based column index.
    pub column: usize,
    /// Number of columns opened for the whole day.
    pub total_columns: usize,
    /// Effective start, minutes past midnight.
    pub start_minutes: u32,
    /// Effective end, minutes past midnight (exclusive).
    pub end_minutes: u32,
}

impl PlacedEvent<'_> {
    pub fn width_percent(&self) -> f64 {
        100.0 / self.total_columns as f64
    }

    pub fn offset_percent(&self) -> f64 {
        self.column as f64 * self.width_percent()
    }
}

/// Effective `[start, end)` span in minutes used for placement.
///
/// A missing start counts as midnight. A missing end, or one that is not
/// after the start, is replaced by start + 60 minutes.
pub fn placement_span(event: &Event) -> (u32, u32) {
    let start = event.start_time().map(minutes_of).unwrap_or(0);
    let end = match event.end_time().map(minutes_of) {
        Some(end) if end > start => end,
        _ => start + DEFAULT_EVENT_MINUTES,
    };
    (start, end)
}

fn overlaps(a: (u32, u32), b: (u32, u32)) -> bool {
    a.0 < b.1 && a.1 > b.0
}

/// Assign columns to the timed events of one day.
///
/// Output is ordered by (start, end); events with identical spans keep
/// their input order.
pub fn pack_columns<'a>(timed: &[&'a Event]) -> Vec<PlacedEvent<'a>> {
    let mut spans: Vec<(&'a Event, (u32, u32))> =
        timed.iter().map(|event| (*event, placement_span(event))).collect();
    spans.sort_by_key(|(_, span)| *span);

    let mut columns: Vec<Vec<(u32, u32)>> = Vec::new();
    let mut assigned = Vec::with_capacity(spans.len());

    for (_, span) in &spans {
        let free = columns
            .iter()
            .position(|column| column.iter().all(|placed| !overlaps(*span, *placed)));

        let column = match free {
            Some(index) => index,
            None => {
                columns.push(Vec::new());
                columns.len() - 1
            }
        };

        columns[column].push(*span);
        assigned.push(column);
    }

    let total_columns = columns.len();

    spans
        .into_iter()
        .zip(assigned)
        .map(|((event, (start, end)), column)| PlacedEvent {
            event,
            column,
            total_columns,
            start_minutes: start,
            end_minutes: end,
        })
        .collect()
}

/// Everything needed to draw one date of the calendar.
#[derive(Debug, Clone)]
pub struct DayLayout<'a> {
    pub date: NaiveDate,
    pub all_day: Vec<&'a Event>,
    pub timed: Vec<PlacedEvent<'a>>,
    /// Timed events without a start time; listed, but not on the grid.
    pub unscheduled: Vec<&'a Event>,
}

impl<'a> DayLayout<'a> {
    pub fn build(events: &'a [Event], date: NaiveDate) -> Self {
        let mut all_day = Vec::new();
        let mut timed = Vec::new();
        let mut unscheduled = Vec::new();

        for event in events_for_date(events, date) {
            if event.is_all_day() {
                all_day.push(event);
            } else if event.start_time().is_some() {
                timed.push(event);
            } else {
                unscheduled.push(event);
            }
        }

        DayLayout {
            date,
            all_day,
            timed: pack_columns(&timed),
            unscheduled,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.all_day.is_empty() && self.timed.is_empty() && self.unscheduled.is_empty()
    }

    pub fn total_columns(&self) -> usize {
        self.timed.first().map(|p| p.total_columns).unwrap_or(0)
    }
}
