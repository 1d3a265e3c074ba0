use anyhow::Result;
use chrono::Local;
use hearth_core::config::HearthConfig;
use hearth_core::window::{CalendarWindow, visible_hours};
use owo_colors::OwoColorize;

use crate::render::LayoutRender;

use super::google;

pub async fn run(
    config: &HearthConfig,
    date: Option<&str>,
    view: Option<&str>,
    include_google: bool,
) -> Result<()> {
    let today = Local::now().date_naive();
    let window = CalendarWindow::from_args(date, view, today, config.view)
        .map_err(|e| anyhow::anyhow!(e))?;

    let mut events = config.event_file().load_events()?;

    if include_google {
        match google::fetch_window(config, &window).await {
            Ok(external) => events.extend(external),
            Err(e) => tracing::warn!("Showing calendar without Google events: {e:#}"),
        }
    }

    let settings = &config.settings;
    let hours = visible_hours(settings.calendar_start_hour, settings.calendar_end_hour);

    println!(
        "{} {}",
        settings.calendar_title.bold(),
        format!(
            "{} to {}",
            window.start.format("%a %b %-d"),
            window.end().format("%a %b %-d")
        )
        .dimmed()
    );

    for layout in window.layouts(&events) {
        println!();
        println!("{}", layout.render_with_hours(&hours, today));
    }

    Ok(())
}
