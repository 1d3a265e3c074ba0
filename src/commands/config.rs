use anyhow::Result;
use chrono::Utc;
use hearth_core::config::HearthConfig;
use hearth_core::settings::{SettingsCache, SettingsPatch};
use owo_colors::OwoColorize;

pub fn run(config: &HearthConfig, patch: SettingsPatch) -> Result<()> {
    let config_path = HearthConfig::config_path()?;

    let settings = if patch == SettingsPatch::default() {
        config.settings.clone()
    } else {
        let mut cache = SettingsCache::default();
        let updated = cache.update(
            Utc::now(),
            patch,
            || Ok(config.settings.clone()),
            |settings| {
                let mut config = config.clone();
                config.settings = settings.clone();
                config.save()
            },
        )?;
        println!("{}", "Settings saved".green());
        updated
    };

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Events:  {}", config.events_path().display());
    if let Some(key_file) = config.google_key_path() {
        println!("  Google key:  {}", key_file.display());
    }

    println!("{}", "Settings".bold());
    println!("  Title:     {}", settings.calendar_title);
    println!(
        "  Hours:     {:02}:00 to {:02}:00",
        settings.calendar_start_hour, settings.calendar_end_hour
    );
    println!("  View:      {}", config.view);
    println!(
        "  Google:    {}",
        settings.google_calendar_id.as_deref().unwrap_or("(not set)")
    );
    if settings.google_api_key.is_some() {
        println!("  API key:   {}", "set".dimmed());
    }

    Ok(())
}
