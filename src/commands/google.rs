use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use hearth_core::config::HearthConfig;
use hearth_core::event::Event;
use hearth_core::window::CalendarWindow;
use hearth_provider_google::{GoogleAuth, GoogleCalendarClient};
use owo_colors::OwoColorize;

fn client_for(config: &HearthConfig) -> Result<GoogleCalendarClient> {
    let key_file = config.google_key_path();
    let auth = GoogleAuth::resolve(
        config.settings.google_api_key.as_deref(),
        key_file.as_deref(),
    )
    .context("Failed to load Google credentials")?;

    Ok(GoogleCalendarClient::new(auth))
}

fn local_to_utc(local: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| local.and_utc())
}

/// Google events for the window, or nothing if Google isn't configured.
pub async fn fetch_window(config: &HearthConfig, window: &CalendarWindow) -> Result<Vec<Event>> {
    let Some(calendar_id) = config.settings.google_calendar_id.as_deref() else {
        return Ok(Vec::new());
    };

    let mut client = client_for(config)?;
    client
        .fetch_events(
            calendar_id,
            local_to_utc(window.time_min()),
            local_to_utc(window.time_max()),
            &Local,
        )
        .await
}

pub async fn test(config: &HearthConfig) -> Result<()> {
    let Some(calendar_id) = config.settings.google_calendar_id.as_deref() else {
        anyhow::bail!(
            "No Google calendar configured.\n\n\
            Set one with:\n  \
            hearth config --calendar-id <id>"
        );
    };

    let mut client = client_for(config)?;
    if !client.auth().is_configured() {
        anyhow::bail!(
            "No Google credentials found.\n\n\
            Set HEARTH_GOOGLE_SERVICE_ACCOUNT_EMAIL and HEARTH_GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY,\n\
            set google_key_file in config.toml, or use an API key for a public calendar."
        );
    }

    println!("Connecting to {} using {}...", calendar_id, client.auth().describe());
    let name = client.test_connection(calendar_id).await?;
    println!("{} {}", "Connected:".green(), name.bold());

    Ok(())
}
