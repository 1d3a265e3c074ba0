//! Terminal rendering for hearth-core types.
//!
//! Extension traits that add colored output using owo_colors.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use hearth_core::event::{Event, EventColor};
use hearth_core::layout::{DayLayout, PlacedEvent};
use owo_colors::{AnsiColors, OwoColorize};

pub trait Render {
    fn render(&self) -> String;
}

fn ansi_color(color: EventColor) -> AnsiColors {
    match color {
        EventColor::Red => AnsiColors::Red,
        EventColor::Cyan => AnsiColors::Cyan,
        EventColor::Blue => AnsiColors::Blue,
        EventColor::Green => AnsiColors::Green,
        EventColor::Yellow => AnsiColors::Yellow,
        EventColor::Gray => AnsiColors::BrightBlack,
        EventColor::Purple => AnsiColors::Magenta,
        EventColor::Pink => AnsiColors::BrightMagenta,
        EventColor::Orange => AnsiColors::BrightRed,
        EventColor::Indigo => AnsiColors::BrightBlue,
    }
}

/// "HH:MM" for minutes past midnight; hours past 23 are kept as-is.
fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn format_span(start: u32, end: u32) -> String {
    format!("{}-{}", format_minutes(start), format_minutes(end))
}

/// "[2/3]" for the second of three columns, nothing when there is one.
fn column_tag(column: usize, total_columns: usize) -> String {
    if total_columns > 1 {
        format!("[{}/{}]", column + 1, total_columns)
    } else {
        String::new()
    }
}

fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    let formatted = date.format("%a %b %-d").to_string();
    match (date - today).num_days() {
        0 => format!("Today, {}", formatted),
        1 => format!("Tomorrow, {}", formatted),
        _ => formatted,
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let marker = "●".color(ansi_color(self.color)).to_string();
        let mut line = format!("{} {}", marker, self.title);

        if let Some(location) = &self.location {
            line.push_str(&format!(" {}", format!("@ {}", location).dimmed()));
        }
        if self.is_recurring() {
            line.push_str(&format!(" {}", "↻".dimmed()));
        }
        if self.is_read_only() {
            line.push_str(&format!(" {}", "(google)".dimmed()));
        }
        line
    }
}

impl Render for PlacedEvent<'_> {
    fn render(&self) -> String {
        let indent = "  ".repeat(self.column);
        let tag = column_tag(self.column, self.total_columns);
        format!(
            "{}  {}{} {}",
            format_span(self.start_minutes, self.end_minutes),
            indent,
            self.event.render(),
            tag.dimmed()
        )
        .trim_end()
        .to_string()
    }
}

pub trait LayoutRender {
    fn render_with_hours(&self, hours: &RangeInclusive<u32>, today: NaiveDate) -> String;
}

impl LayoutRender for DayLayout<'_> {
    /// Events starting outside the visible hours are dimmed.
    fn render_with_hours(&self, hours: &RangeInclusive<u32>, today: NaiveDate) -> String {
        let mut lines = vec![date_label(self.date, today).bold().to_string()];

        if self.is_empty() {
            lines.push(format!("  {}", "No events".dimmed()));
            return lines.join("\n");
        }

        for event in &self.all_day {
            lines.push(format!("  {:<11}  {}", "all-day", event.render()));
        }

        for placed in &self.timed {
            let line = format!("  {}", placed.render());
            if hours.contains(&(placed.start_minutes / 60)) {
                lines.push(line);
            } else {
                lines.push(line.dimmed().to_string());
            }
        }

        for event in &self.unscheduled {
            lines.push(format!("  {:<11}  {}", "--:--", event.render()));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_span() {
        assert_eq!(format_span(9 * 60, 10 * 60 + 30), "09:00-10:30");
        assert_eq!(format_span(23 * 60 + 30, 24 * 60 + 30), "23:30-24:30");
    }

    #[test]
    fn test_column_tag() {
        assert_eq!(column_tag(0, 1), "");
        assert_eq!(column_tag(1, 3), "[2/3]");
    }

    #[test]
    fn test_date_label() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(date_label(today, today), "Today, Mon Mar 4");
        assert_eq!(date_label(today.succ_opt().unwrap(), today), "Tomorrow, Tue Mar 5");
        assert_eq!(
            date_label(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(), today),
            "Fri Mar 8"
        );
    }
}
