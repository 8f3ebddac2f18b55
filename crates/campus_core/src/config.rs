//! Core configuration.
//!
//! # Responsibility
//! - Hold storage naming and reminder timing knobs in one place.
//! - Parse an optional TOML file; every field has a default.
//!
//! # Invariants
//! - Unknown keys are rejected so typos surface at startup.
//! - `default_semester` is the only semester id used by fallback paths.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

const MAX_REMINDER_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Storage and reminder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Prefix of the local cache key; the uid is appended.
    pub cache_namespace: String,
    /// Remote collection holding one document per user.
    pub users_collection: String,
    /// Semester id used whenever a default semester must be synthesized.
    pub default_semester: String,
    pub reminders: ReminderConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            cache_namespace: "CampusKing_v6.0_".to_string(),
            users_collection: "users".to_string(),
            default_semester: "114-1".to_string(),
            reminders: ReminderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReminderConfig {
    /// Seconds between two background checks.
    pub interval_secs: u64,
    /// Minutes before a course start at which its reminder fires.
    pub lead_minutes: i64,
    /// Local hour (0..=23) during which the daily briefing may fire.
    pub briefing_hour: u32,
    /// Seconds a sent course reminder suppresses duplicates.
    pub dedupe_ttl_secs: i64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            lead_minutes: 10,
            briefing_hour: 7,
            dedupe_ttl_secs: 3600,
        }
    }
}

impl CoreConfig {
    /// Parses TOML text; an empty string yields defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_semester.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "default_semester",
                reason: "must not be blank",
            });
        }
        if self.users_collection.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "users_collection",
                reason: "must not be blank",
            });
        }
        if !(1..=MAX_REMINDER_SECS as u64).contains(&self.reminders.interval_secs) {
            return Err(ConfigError::Invalid {
                field: "reminders.interval_secs",
                reason: "must be within 1..=86400",
            });
        }
        if !(0..=MAX_REMINDER_SECS).contains(&self.reminders.dedupe_ttl_secs) {
            return Err(ConfigError::Invalid {
                field: "reminders.dedupe_ttl_secs",
                reason: "must be within 0..=86400",
            });
        }
        if !(0..=24 * 60).contains(&self.reminders.lead_minutes) {
            return Err(ConfigError::Invalid {
                field: "reminders.lead_minutes",
                reason: "must be within 0..=1440",
            });
        }
        if self.reminders.briefing_hour > 23 {
            return Err(ConfigError::Invalid {
                field: "reminders.briefing_hour",
                reason: "must be within 0..=23",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};

    #[test]
    fn empty_text_yields_defaults() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.cache_namespace, "CampusKing_v6.0_");
        assert_eq!(config.reminders.lead_minutes, 10);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = CoreConfig::from_toml_str(
            "default_semester = \"115-1\"\n[reminders]\nlead_minutes = 5\n",
        )
        .unwrap();
        assert_eq!(config.default_semester, "115-1");
        assert_eq!(config.reminders.lead_minutes, 5);
        assert_eq!(config.reminders.interval_secs, 60);
        assert_eq!(config.users_collection, "users");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = CoreConfig::from_toml_str("cache_prefix = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn blank_default_semester_is_rejected() {
        let err = CoreConfig::from_toml_str("default_semester = \" \"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "default_semester",
                ..
            }
        ));
    }

    #[test]
    fn from_file_reads_toml_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campusking.toml");
        std::fs::write(&path, "users_collection = \"students\"\n").unwrap();

        let config = CoreConfig::from_file(&path).unwrap();
        assert_eq!(config.users_collection, "students");
        assert_eq!(config.default_semester, "114-1");

        let err = CoreConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn zero_reminder_interval_is_rejected() {
        let err = CoreConfig::from_toml_str("[reminders]\ninterval_secs = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "reminders.interval_secs",
                ..
            }
        ));
    }
}
