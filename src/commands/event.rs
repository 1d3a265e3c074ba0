use anyhow::{Context, Result};
use clap::Args;
use hearth_core::config::HearthConfig;
use hearth_core::edit::{EventChanges, parse_color, parse_time, parse_weekdays};
use hearth_core::event::parse_date;
use hearth_core::series::ensure_editable;
use owo_colors::OwoColorize;

use crate::render::Render;

/// Fields shared by `add`, `edit` and `detach`.
#[derive(Args, Debug, Default)]
pub struct DetailArgs {
    #[arg(long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    /// red, cyan, blue, green, yellow, gray, purple, pink, orange or indigo
    #[arg(short, long)]
    pub color: Option<String>,

    /// Make the event all-day
    #[arg(long, conflicts_with_all = ["timed", "start", "end"])]
    pub all_day: bool,

    /// Make an all-day event timed
    #[arg(long)]
    pub timed: bool,

    /// Start time (HH:MM)
    #[arg(short, long)]
    pub start: Option<String>,

    /// End time (HH:MM)
    #[arg(short, long)]
    pub end: Option<String>,
}

/// When an event happens: once on a date, or every week on some days.
#[derive(Args, Debug, Default)]
pub struct ScheduleArgs {
    /// One-time event on this date (YYYY-MM-DD)
    #[arg(short, long, conflicts_with = "days")]
    pub date: Option<String>,

    /// Weekly on these days (e.g. "mon,wed" or "0,2")
    #[arg(long)]
    pub days: Option<String>,
}

pub fn changes(
    title: Option<String>,
    details: DetailArgs,
    schedule: ScheduleArgs,
) -> Result<EventChanges> {
    let all_day = match (details.all_day, details.timed) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    };

    Ok(EventChanges {
        title,
        description: details.description,
        location: details.location,
        color: details.color.as_deref().map(parse_color).transpose()?,
        all_day,
        start: details.start.as_deref().map(parse_time).transpose()?,
        end: details.end.as_deref().map(parse_time).transpose()?,
        date: schedule
            .date
            .as_deref()
            .map(|d| {
                parse_date(d).with_context(|| format!("Invalid date '{}'. Expected YYYY-MM-DD", d))
            })
            .transpose()?,
        days: schedule.days.as_deref().map(parse_weekdays).transpose()?,
    })
}

pub fn add(config: &HearthConfig, changes: EventChanges) -> Result<()> {
    let event = changes.create()?;
    config.event_file().upsert(&event)?;

    println!("{} {}", "Added".green(), event.render());
    println!("  {}", event.id.dimmed());
    Ok(())
}

pub fn edit(config: &HearthConfig, event_id: &str, changes: EventChanges) -> Result<()> {
    if changes.is_empty() {
        anyhow::bail!("Nothing to change. See `hearth edit --help` for the available options");
    }

    let file = config.event_file();
    let event = file.find(event_id)?;
    let updated = changes.apply(&event)?;
    file.upsert(&updated)?;

    println!("{} {}", "Updated".yellow(), updated.render());
    Ok(())
}

/// Delete a one-time event or a whole series.
pub fn delete(config: &HearthConfig, event_id: &str) -> Result<()> {
    let file = config.event_file();
    let event = file.find(event_id)?;
    ensure_editable(&event)?;
    file.remove(event_id)?;

    println!("{} {}", "Deleted".red(), event.title);
    Ok(())
}
