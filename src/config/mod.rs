// src/config/mod.rs

use crate::scene::SelectionBehavior;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default location of the settings file, relative to the working directory.
pub const SETTINGS_FILE: &str = "scene_ed.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Editor-wide settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Selection behavior of `add_default` / `insert_at_default`.
    pub default_selection: SelectionBehavior,
    /// Maximum number of undo records kept; unbounded when absent.
    pub undo_limit: Option<usize>,
    /// `env_logger` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Half edge length of the cube the generator scatters props in.
    pub generator_extent: f32,
    pub generator_count: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            default_selection: SelectionBehavior::Change,
            undo_limit: None,
            log_filter: "info".to_string(),
            generator_extent: 10.0,
            generator_count: 8,
        }
    }
}

impl EditorSettings {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json_str(&text)?;
        info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Like [`load`](Self::load), but a missing file is `Ok(None)`.
    pub fn load_optional<P: AsRef<Path>>(path: P) -> Result<Option<Self>, ConfigError> {
        match fs::read_to_string(path.as_ref()) {
            Ok(text) => Ok(Some(Self::from_json_str(&text)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path.as_ref(), self.to_json_string()?)?;
        info!("Saved settings to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            EditorSettings::from_json_str(r#"{ "default_selection": "add", "undo_limit": 50 }"#)
                .unwrap();
        assert_eq!(settings.default_selection, SelectionBehavior::Add);
        assert_eq!(settings.undo_limit, Some(50));
        assert_eq!(settings.log_filter, "info");
        assert_eq!(settings.generator_count, 8);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(
            EditorSettings::from_json_str("{}").unwrap(),
            EditorSettings::default()
        );
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            EditorSettings::from_json_str(r#"{ "default_selection": "sometimes" }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_none() {
        let path = std::env::temp_dir().join("scene_ed_settings_that_do_not_exist.json");
        assert!(EditorSettings::load_optional(&path).unwrap().is_none());
        assert!(matches!(EditorSettings::load(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("scene_ed_settings_{}.json", std::process::id()));
        let settings = EditorSettings {
            default_selection: SelectionBehavior::Keep,
            generator_extent: 2.5,
            ..EditorSettings::default()
        };
        settings.save(&path).unwrap();
        let loaded = EditorSettings::load_optional(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, Some(settings));
    }
}
