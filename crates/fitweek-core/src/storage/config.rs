//! TOML-based application configuration.
//!
//! Holds the injected rule table, the submission policy, and the weekly
//! reminder message. Themed competition weeks (say, doubled health
//! points) are a config edit, not a code change.
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::gate::SubmissionPolicy;
use crate::rules::PointRules;

/// Weekly reminder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_reminder_message")]
    pub message: String,
}

fn default_reminder_message() -> String {
    "Reminder: log this week's scores before the week resets!".to_string()
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            message: default_reminder_message(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rules: PointRules,
    #[serde(default)]
    pub submission: SubmissionPolicy,
    #[serde(default)]
    pub reminder: ReminderConfig,
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::new(),
                message: e.to_string(),
            })?
            .join("config.toml"))
    }

    /// Load from disk, writing (and returning) the default config when no
    /// file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be parsed, if the rule
    /// table it carries is unusable, or if the default cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                cfg.rules
                    .validate()
                    .map_err(|e| ConfigError::InvalidValue {
                        key: "rules".to_string(),
                        message: e.to_string(),
                    })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
