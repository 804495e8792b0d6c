//! TOML-based configuration for inimerge.
//!
//! Every section is optional; a missing file at the default location means
//! "use the defaults".

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::models::{RepeatablePolicy, DEFAULT_REPEATABLE_SETTINGS};
use crate::output::DEFAULT_OUTPUT_NAME;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeConfig {
    /// Merge behaviour.
    #[serde(default)]
    pub merge: MergeSection,

    /// Output settings.
    #[serde(default)]
    pub output: OutputSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeSection {
    /// Setting names exempt from conflict detection; all distinct values
    /// are kept.
    #[serde(default = "default_repeatable")]
    pub repeatable_settings: Vec<String>,
}

fn default_repeatable() -> Vec<String> {
    DEFAULT_REPEATABLE_SETTINGS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for MergeSection {
    fn default() -> Self {
        Self {
            repeatable_settings: default_repeatable(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputSection {
    /// File name suggested for the merged result.
    #[serde(default = "default_file_name")]
    pub default_file_name: String,
}

fn default_file_name() -> String {
    DEFAULT_OUTPUT_NAME.into()
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            default_file_name: default_file_name(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingSection {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl MergeConfig {
    /// Default config location: `<config dir>/inimerge/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("inimerge").join("config.toml"))
    }

    /// Load a [`MergeConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: MergeConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Load from `path` when given (it must exist). Otherwise load the
    /// default location if a file is there, falling back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from_file(path)?,
                _ => {
                    debug!("no configuration file, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate that all values are sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in &self.merge.repeatable_settings {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "merge.repeatable_settings".into(),
                    detail: "setting names must not be blank".into(),
                });
            }
            if name.trim() != name {
                return Err(ConfigError::InvalidValue {
                    field: "merge.repeatable_settings".into(),
                    detail: format!("'{}' has surrounding whitespace", name),
                });
            }
        }
        if self.output.default_file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "output.default_file_name".into(),
                detail: "default file name must not be empty".into(),
            });
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".into(),
                detail: format!(
                    "'{}' is not one of {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        Ok(())
    }

    /// The repeatable-settings policy for a merge session.
    pub fn policy(&self) -> RepeatablePolicy {
        RepeatablePolicy::new(self.merge.repeatable_settings.iter().cloned())
    }

    /// The default configuration rendered as TOML.
    pub fn default_toml() -> Result<String, ConfigError> {
        toml::to_string_pretty(&Self::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_toml() -> &'static str {
        r#"
[merge]
repeatable_settings = ["Paths", "+Suppress", "+ActiveGameNameRedirects"]

[output]
default_file_name = "DefaultEngine.ini"

[logging]
level = "debug"
"#
    }

    #[test]
    fn test_parse_full_config() {
        let config: MergeConfig = toml::from_str(sample_toml()).expect("failed to parse toml");
        assert_eq!(config.merge.repeatable_settings.len(), 3);
        assert_eq!(config.output.default_file_name, "DefaultEngine.ini");
        assert_eq!(config.logging.level, "debug");
        assert!(config.policy().is_repeatable("+ActiveGameNameRedirects"));
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let config: MergeConfig = toml::from_str("").unwrap();
        assert_eq!(config, MergeConfig::default());
        assert_eq!(config.merge.repeatable_settings, vec!["Paths", "+Suppress"]);
        assert_eq!(config.output.default_file_name, "merged_engine.ini");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let config = MergeConfig::load_from_file(&path).expect("load_from_file failed");
        assert_eq!(config.logging.level, "debug");

        let config = MergeConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.output.default_file_name, "DefaultEngine.ini");
    }

    #[test]
    fn test_file_not_found() {
        let result = MergeConfig::load_from_file("/nonexistent/config.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));

        let result = MergeConfig::load_or_default(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[merge\nrepeatable_settings = 3").unwrap();

        let result = MergeConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validate_rejects_blank_repeatable() {
        let mut config = MergeConfig::default();
        config.merge.repeatable_settings.push("  ".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "merge.repeatable_settings"
        ));
    }

    #[test]
    fn test_validate_rejects_padded_repeatable() {
        let mut config = MergeConfig::default();
        config.merge.repeatable_settings = vec![" Paths".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_file_name() {
        let mut config = MergeConfig::default();
        config.output.default_file_name = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "output.default_file_name"
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let mut config = MergeConfig::default();
        config.logging.level = "chatty".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "logging.level"
        ));

        config.logging.level = "INFO".into();
        config.validate().unwrap();
    }

    #[test]
    fn test_default_toml_round_trips() {
        let rendered = MergeConfig::default_toml().unwrap();
        assert!(rendered.contains("repeatable_settings"));
        let parsed: MergeConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, MergeConfig::default());
    }
}
