/// Viewer preferences
///
/// A small JSON file remembering the last opened folder and feature
/// selection, so reopening the app lands where the user left off. Stored in
/// the platform config directory:
/// - Linux: ~/.config/featurescope/config.json
/// - macOS: ~/Library/Application Support/featurescope/config.json
/// - Windows: %APPDATA%\featurescope\config.json
///
/// Loading and saving fail softly; preferences are never worth an error
/// dialog.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Folder of the most recently loaded dataset
    pub last_folder: Option<PathBuf>,
    /// Feature selections restored when the columns still exist
    pub last_x: Option<String>,
    pub last_y: Option<String>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("featurescope");
        path.push("config.json");
        Some(path)
    }

    /// Load saved preferences, or defaults when there are none
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            log::warn!("ignoring malformed config {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Persist preferences; failures are logged and swallowed
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("could not create config directory: {}", e);
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    log::warn!("could not save config {}: {}", path.display(), e);
                }
            }
            Err(e) => log::warn!("could not serialize config: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_json() {
        let config = Config {
            last_folder: Some(PathBuf::from("/data/cells")),
            last_x: Some("area".into()),
            last_y: Some("eccentricity".into()),
        };

        let json = serde_json::to_string(&config).unwrap();
        let restored: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_defaults_are_empty() {
        let config = Config::default();
        assert_eq!(config.last_folder, None);
        assert_eq!(config.last_x, None);
        assert_eq!(config.last_y, None);
    }
}
