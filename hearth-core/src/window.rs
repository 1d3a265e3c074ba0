//! The visible calendar window: 1, 3 or 7 consecutive days.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::event::{Event, parse_date, weekday_index};
use crate::layout::DayLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[serde(rename = "day", alias = "1day")]
    Day,
    #[default]
    #[serde(rename = "3day")]
    ThreeDay,
    #[serde(rename = "week")]
    Week,
}

impl ViewMode {
    pub fn day_count(&self) -> i64 {
        match self {
            ViewMode::Day => 1,
            ViewMode::ThreeDay => 3,
            ViewMode::Week => 7,
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "1day" | "1" => Ok(ViewMode::Day),
            "3day" | "3" => Ok(ViewMode::ThreeDay),
            "week" | "7" => Ok(ViewMode::Week),
            other => Err(format!(
                "Unknown view '{}'. Expected one of: day, 3day, week",
                other
            )),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewMode::Day => "day",
            ViewMode::ThreeDay => "3day",
            ViewMode::Week => "week",
        };
        f.write_str(name)
    }
}

/// A run of consecutive dates shown side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindow {
    pub start: NaiveDate,
    pub mode: ViewMode,
}

impl CalendarWindow {
    /// The window showing `date`. Week views start on Monday; shorter
    /// views start on `date` itself.
    pub fn for_date(mode: ViewMode, date: NaiveDate) -> Self {
        let start = match mode {
            ViewMode::Week => date - Duration::days(weekday_index(date) as i64),
            ViewMode::Day | ViewMode::ThreeDay => date,
        };
        CalendarWindow { start, mode }
    }

    /// Build a window from CLI-style arguments.
    /// - `date`: YYYY-MM-DD, defaults to `today`
    /// - `view`: day, 3day or week, defaults to `default_mode`
    pub fn from_args(
        date: Option<&str>,
        view: Option<&str>,
        today: NaiveDate,
        default_mode: ViewMode,
    ) -> Result<Self, String> {
        let date = match date {
            Some(s) => parse_date(s)
                .ok_or_else(|| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))?,
            None => today,
        };

        let mode = match view {
            Some(v) => v.parse()?,
            None => default_mode,
        };

        Ok(Self::for_date(mode, date))
    }

    /// Last date shown (inclusive).
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(self.mode.day_count() - 1)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.mode.day_count()).map(move |offset| self.start + Duration::days(offset))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    pub fn next(&self) -> Self {
        self.shifted(self.mode.day_count())
    }

    pub fn previous(&self) -> Self {
        self.shifted(-self.mode.day_count())
    }

    fn shifted(&self, days: i64) -> Self {
        CalendarWindow {
            start: self.start + Duration::days(days),
            mode: self.mode,
        }
    }

    /// Local midnight at the window start.
    pub fn time_min(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Local midnight after the last visible day (exclusive).
    pub fn time_max(&self) -> NaiveDateTime {
        (self.end() + Duration::days(1)).and_time(NaiveTime::MIN)
    }

    pub fn layouts<'a>(&self, events: &'a [Event]) -> Vec<DayLayout<'a>> {
        self.days().map(|date| DayLayout::build(events, date)).collect()
    }
}

/// Hours labelled on the time grid, both ends inclusive.
pub fn visible_hours(start_hour: u32, end_hour: u32) -> RangeInclusive<u32> {
    start_hour.min(23)..=end_hour.min(23)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventRecord, load_events};

    fn date(s: &str) -> NaiveDate {
        parse_date(s).expect("valid date")
    }

    #[test]
    fn test_week_window_starts_on_monday() {
        // 2024-03-07 is a Thursday.
        let window = CalendarWindow::for_date(ViewMode::Week, date("2024-03-07"));
        assert_eq!(window.start, date("2024-03-04"));
        assert_eq!(window.end(), date("2024-03-10"));
        assert_eq!(window.days().count(), 7);

        // Sunday belongs to the week that started six days earlier.
        let window = CalendarWindow::for_date(ViewMode::Week, date("2024-03-10"));
        assert_eq!(window.start, date("2024-03-04"));
    }

    #[test]
    fn test_short_views_start_on_the_date() {
        let window = CalendarWindow::for_date(ViewMode::ThreeDay, date("2024-03-07"));
        assert_eq!(
            window.days().collect::<Vec<_>>(),
            vec![date("2024-03-07"), date("2024-03-08"), date("2024-03-09")]
        );
        assert!(window.contains(date("2024-03-09")));
        assert!(!window.contains(date("2024-03-10")));
    }

    #[test]
    fn test_navigation_moves_by_day_count() {
        let window = CalendarWindow::for_date(ViewMode::ThreeDay, date("2024-03-07"));
        assert_eq!(window.next().start, date("2024-03-10"));
        assert_eq!(window.previous().start, date("2024-03-04"));

        let week = CalendarWindow::for_date(ViewMode::Week, date("2024-03-07"));
        assert_eq!(week.next().start, date("2024-03-11"));
        assert_eq!(week.next().previous(), week);
    }

    #[test]
    fn test_from_args() {
        let today = date("2024-03-07");

        let window = CalendarWindow::from_args(None, None, today, ViewMode::Day).unwrap();
        assert_eq!(window, CalendarWindow::for_date(ViewMode::Day, today));

        let window =
            CalendarWindow::from_args(Some("2024-03-01"), Some("week"), today, ViewMode::Day)
                .unwrap();
        assert_eq!(window.start, date("2024-02-26"));
        assert_eq!(window.mode, ViewMode::Week);

        assert!(CalendarWindow::from_args(Some("03/01/2024"), None, today, ViewMode::Day).is_err());
        assert!(CalendarWindow::from_args(None, Some("month"), today, ViewMode::Day).is_err());
    }

    #[test]
    fn test_time_bounds_cover_whole_days() {
        let window = CalendarWindow::for_date(ViewMode::Day, date("2024-03-07"));
        assert_eq!(window.time_min().to_string(), "2024-03-07 00:00:00");
        assert_eq!(window.time_max().to_string(), "2024-03-08 00:00:00");
    }

    #[test]
    fn test_layouts_one_per_day() {
        let events = load_events(vec![EventRecord {
            id: "gym".into(),
            title: "Gym".into(),
            is_recurring: Some(true),
            days_of_week: vec![0, 2],
            start_time: Some("07:00".into()),
            ..Default::default()
        }]);

        let window = CalendarWindow::for_date(ViewMode::Week, date("2024-03-06"));
        let layouts = window.layouts(&events);

        assert_eq!(layouts.len(), 7);
        let busy: Vec<NaiveDate> = layouts
            .iter()
            .filter(|l| !l.is_empty())
            .map(|l| l.date)
            .collect();
        assert_eq!(busy, vec![date("2024-03-04"), date("2024-03-06")]);
    }

    #[test]
    fn test_visible_hours_default_grid() {
        let hours: Vec<u32> = visible_hours(8, 21).collect();
        assert_eq!(hours.first(), Some(&8));
        assert_eq!(hours.last(), Some(&21));
        assert_eq!(hours.len(), 14);
    }

    #[test]
    fn test_view_mode_serde_names() {
        let mode: ViewMode = serde_json::from_str("\"1day\"").unwrap();
        assert_eq!(mode, ViewMode::Day);
        assert_eq!(serde_json::to_string(&ViewMode::ThreeDay).unwrap(), "\"3day\"");
    }
}
