//! Runtime settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a JSON settings file.
pub const SETTINGS_ENV: &str = "ECM_SETTINGS";

/// Demo runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeSettings {
    /// Entities created by the demo scenario.
    pub entity_count: usize,
    /// Maximum log level (`trace`, `debug`, `info`, `warn`, `error`).
    pub log_level: String,
    /// Log every entity's components during the print passes.
    pub print_components: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            entity_count: 3,
            log_level: "info".to_string(),
            print_components: true,
        }
    }
}

impl RuntimeSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid runtime settings")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Settings from the file named by `ECM_SETTINGS`, or defaults when unset.
    pub fn load() -> Result<Self> {
        match std::env::var_os(SETTINGS_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn level(&self) -> Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown log level '{}'", self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let settings = RuntimeSettings::from_json("{}").unwrap();
        assert_eq!(settings, RuntimeSettings::default());
        assert_eq!(settings.level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn partial_override() {
        let settings =
            RuntimeSettings::from_json(r#"{ "entity_count": 10, "log_level": "debug" }"#).unwrap();
        assert_eq!(settings.entity_count, 10);
        assert!(settings.print_components);
        assert_eq!(settings.level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(RuntimeSettings::from_json(r#"{ "entities": 4 }"#).is_err());
    }

    #[test]
    fn bad_level_is_an_error() {
        let settings = RuntimeSettings {
            log_level: "loud".into(),
            ..RuntimeSettings::default()
        };
        assert!(settings.level().is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(RuntimeSettings::from_file(Path::new("/nonexistent/ecm.json")).is_err());
    }
}
