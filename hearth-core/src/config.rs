//! Global hearth configuration.

use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::error::{HearthError, HearthResult};
use crate::settings::DisplaySettings;
use crate::store::EventFile;
use crate::window::ViewMode;

static DEFAULT_EVENTS_FILE: &str = "~/.local/share/hearth/events.json";

fn default_events_file() -> PathBuf {
    PathBuf::from(DEFAULT_EVENTS_FILE)
}

fn is_default_events_file(p: &PathBuf) -> bool {
    *p == default_events_file()
}

/// Configuration at ~/.config/hearth/config.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HearthConfig {
    #[serde(default = "default_events_file", skip_serializing_if = "is_default_events_file")]
    pub events_file: PathBuf,

    #[serde(default)]
    pub view: ViewMode,

    /// Downloaded service-account JSON key, used when the key is not
    /// provided through the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_key_file: Option<PathBuf>,

    #[serde(default)]
    pub settings: DisplaySettings,
}

impl Default for HearthConfig {
    fn default() -> Self {
        HearthConfig {
            events_file: default_events_file(),
            view: ViewMode::default(),
            google_key_file: None,
            settings: DisplaySettings::default(),
        }
    }
}

impl HearthConfig {
    pub fn config_path() -> HearthResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| HearthError::Config("Could not determine config directory".into()))?
            .join("hearth");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config, creating a commented-out default file on first run.
    pub fn load() -> HearthResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> HearthResult<Self> {
        let config: HearthConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| HearthError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| HearthError::Config(e.to_string()))?;

        config.settings.validate()?;
        Ok(config)
    }

    /// Write the current config to ~/.config/hearth/config.toml
    pub fn save(&self) -> HearthResult<()> {
        let config_path = Self::config_path()?;

        let content =
            toml::to_string_pretty(self).map_err(|e| HearthError::Config(e.to_string()))?;

        std::fs::write(&config_path, content)
            .map_err(|e| HearthError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn events_path(&self) -> PathBuf {
        expand_tilde(&self.events_file)
    }

    pub fn event_file(&self) -> EventFile {
        EventFile::new(self.events_path())
    }

    pub fn google_key_path(&self) -> Option<PathBuf> {
        self.google_key_file.as_deref().map(expand_tilde)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> HearthResult<()> {
        let contents = format!(
            "\
# hearth configuration

# Where calendar events are stored:
# events_file = \"{}\"

# Initial calendar view (day, 3day or week):
# view = \"3day\"

# Google service-account key (JSON), if not set through the environment:
# google_key_file = \"~/.config/hearth/google-key.json\"

# [settings]
# calendar_title = \"Weekly Calendar\"
# calendar_start_hour = 8
# calendar_end_hour = 21
# google_calendar_id = \"family@group.calendar.google.com\"
",
            DEFAULT_EVENTS_FILE
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HearthError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| HearthError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_loads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hearth").join("config.toml");

        HearthConfig::create_default_config(&path).unwrap();
        let config = HearthConfig::load_from(&path).unwrap();

        assert_eq!(config.events_file, default_events_file());
        assert_eq!(config.view, ViewMode::ThreeDay);
        assert_eq!(config.settings, DisplaySettings::default());
    }

    #[test]
    fn test_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
events_file = "/srv/hearth/events.json"
view = "week"

[settings]
calendar_title = "Kitchen"
calendar_end_hour = 22
"#,
        )
        .unwrap();

        let config = HearthConfig::load_from(&path).unwrap();
        assert_eq!(config.events_path(), PathBuf::from("/srv/hearth/events.json"));
        assert_eq!(config.view, ViewMode::Week);
        assert_eq!(config.settings.calendar_title, "Kitchen");
        assert_eq!(config.settings.calendar_start_hour, 8);
        assert_eq!(config.settings.calendar_end_hour, 22);
    }

    #[test]
    fn test_invalid_hours_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings]\ncalendar_start_hour = 22\ncalendar_end_hour = 8\n")
            .unwrap();

        assert!(HearthConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_tilde_is_expanded() {
        let config = HearthConfig::default();
        assert!(!config.events_path().to_string_lossy().starts_with('~'));
    }
}
