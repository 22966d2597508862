//! Codec configuration.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Settings file (JSON, optional)
//! 3. Environment variables (highest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Options shared by the message and module identity codecs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Pretty-print encoded JSON.
    pub pretty: bool,
    /// Log skipped unknown fields at `debug` while decoding.
    pub log_unknown_fields: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            log_unknown_fields: true,
        }
    }
}

impl CodecConfig {
    /// Load configuration with hierarchical resolution.
    ///
    /// A settings file that does not exist is skipped. One that exists but
    /// cannot be read is an [`Error::Io`]; bad JSON is an [`Error::Config`].
    pub fn load(settings_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = settings_path {
            if path.exists() {
                config = load_config_file(path)?;
            } else {
                tracing::debug!(path = %path.display(), "No codec settings file, using defaults");
            }
        }

        apply_env_overrides(&mut config, |name| std::env::var(name).ok());
        Ok(config)
    }
}

fn load_config_file(path: &Path) -> Result<CodecConfig> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn apply_env_overrides(config: &mut CodecConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("HUBWIRE_PRETTY") {
        match parse_flag(&val) {
            Some(flag) => config.pretty = flag,
            None => tracing::warn!(value = %val, "Ignoring unparseable HUBWIRE_PRETTY"),
        }
    }
    if let Some(val) = lookup("HUBWIRE_LOG_UNKNOWN_FIELDS") {
        match parse_flag(&val) {
            Some(flag) => config.log_unknown_fields = flag,
            None => tracing::warn!(value = %val, "Ignoring unparseable HUBWIRE_LOG_UNKNOWN_FIELDS"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn default_config_is_compact_and_logs_unknown_fields() {
        let config = CodecConfig::default();
        assert!(!config.pretty);
        assert!(config.log_unknown_fields);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let mut expected = CodecConfig::default();
        apply_env_overrides(&mut expected, |name| std::env::var(name).ok());
        assert_eq!(CodecConfig::load(Some(&path)).unwrap(), expected);
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"pretty":true}"#).unwrap();
        let config = load_config_file(&path).unwrap();
        assert!(config.pretty);
        assert!(config.log_unknown_fields);
    }

    #[test]
    fn corrupt_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            CodecConfig::load(Some(&path)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CodecConfig::load(Some(dir.path())),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn env_overrides_file() {
        let mut config = CodecConfig {
            pretty: true,
            log_unknown_fields: true,
        };
        apply_env_overrides(
            &mut config,
            env(&[("HUBWIRE_PRETTY", "off"), ("HUBWIRE_LOG_UNKNOWN_FIELDS", "0")]),
        );
        assert!(!config.pretty);
        assert!(!config.log_unknown_fields);
    }

    #[test]
    fn unparseable_env_value_is_ignored() {
        let mut config = CodecConfig::default();
        apply_env_overrides(&mut config, env(&[("HUBWIRE_PRETTY", "maybe")]));
        assert_eq!(config, CodecConfig::default());
    }
}
