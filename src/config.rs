//! Persisted configuration: a flat, human-editable JSON record.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory, next to the executable.
pub const CONFIG_FILE: &str = "focus_veil_config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration file {path} is malformed: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write configuration to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Saved editor state. Missing fields fall back to the field defaults so old
/// or hand-trimmed files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_veil_color")]
    pub veil_color: String,
    #[serde(default = "default_veil_opacity")]
    pub veil_opacity: f32,
    #[serde(default = "default_peek_through_opacity")]
    pub peek_through_opacity: f32,
    #[serde(default = "default_show_quick_start")]
    pub show_quick_start_on_startup: bool,
    /// Focus area bounds as `[x1, y1, x2, y2]` rows.
    #[serde(default)]
    pub focus_areas: Vec<[f32; 4]>,
}

fn default_veil_color() -> String {
    "#0C0000".to_string()
}

fn default_veil_opacity() -> f32 {
    1.0
}

fn default_peek_through_opacity() -> f32 {
    0.55
}

fn default_show_quick_start() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            veil_color: default_veil_color(),
            veil_opacity: default_veil_opacity(),
            peek_through_opacity: default_peek_through_opacity(),
            show_quick_start_on_startup: default_show_quick_start(),
            focus_areas: Vec::new(),
        }
    }
}

impl Config {
    /// Load the record from `path`. A missing file is not an error; it means
    /// "no saved config" and yields the defaults. Malformed content fails
    /// without touching any in-memory state.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no saved configuration, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source: err,
                })
            }
        };

        serde_json::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            source: err,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            source: err,
        })?;
        std::fs::write(path, json).map_err(|err| ConfigError::Write {
            path: path.display().to_string(),
            source: err,
        })
    }
}
