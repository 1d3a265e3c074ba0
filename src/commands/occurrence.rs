use anyhow::{Context, Result};
use chrono::NaiveDate;
use hearth_core::config::HearthConfig;
use hearth_core::edit::EventChanges;
use hearth_core::event::parse_date;
use hearth_core::series::{detach_occurrence, ensure_editable, exclude_occurrence};
use owo_colors::OwoColorize;

fn parse_occurrence_date(date: &str) -> Result<NaiveDate> {
    parse_date(date).with_context(|| format!("Invalid date '{}'. Expected YYYY-MM-DD", date))
}

pub fn exclude(config: &HearthConfig, event_id: &str, date: &str) -> Result<()> {
    let date = parse_occurrence_date(date)?;
    let file = config.event_file();

    let series = file.find(event_id)?;
    ensure_editable(&series)?;

    if !series.occurs_on(date) {
        tracing::warn!("{} does not occur on {}", series.title, date);
    }

    let updated = exclude_occurrence(&series, date)?;
    file.upsert(&updated)?;

    println!("{} {} on {}", "Excluded".red(), series.title, date);
    Ok(())
}

/// Detach one occurrence, applying `changes` to the new event.
pub fn detach(
    config: &HearthConfig,
    event_id: &str,
    date: &str,
    changes: EventChanges,
) -> Result<()> {
    let date = parse_occurrence_date(date)?;
    let file = config.event_file();

    let series = file.find(event_id)?;
    ensure_editable(&series)?;

    let (updated, occurrence) = detach_occurrence(&series, date)?;
    let occurrence = if changes.is_empty() {
        occurrence
    } else {
        changes.apply(&occurrence)?
    };
    file.upsert(&updated)?;
    file.upsert(&occurrence)?;

    println!(
        "{} {} on {} as {}",
        "Detached".green(),
        series.title,
        date,
        occurrence.id.dimmed()
    );
    Ok(())
}
