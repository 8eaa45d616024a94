//! Configuration for the PCAS converter.
//!
//! Supports loading configuration from:
//! - `~/.config/pcas/config.toml` for user defaults
//! - `pcas.toml` in the current directory
//! - Environment variables (PCAS_*)
//! - Command-line arguments (highest priority)

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Complete converter configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Institution and entity codes.
    pub codes: CodesConfig,
    /// Roster input settings.
    pub input: InputConfig,
    /// Output file settings.
    pub output: OutputConfig,
    /// Interchange validation settings.
    pub validation: ValidationConfig,
    /// Run log settings.
    pub logging: LoggingConfig,
}

/// Codes stamped into the generated files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodesConfig {
    /// Three-character institution code of the interchange file.
    pub institution: String,
    /// Four-character entity code of every PCAS record.
    pub entity: String,
}

impl Default for CodesConfig {
    fn default() -> Self {
        Self {
            institution: "111".to_string(),
            entity: "3294".to_string(),
        }
    }
}

/// Roster input configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Column delimiter.
    pub delimiter: char,
    /// Leading rows holding column titles.
    pub header_rows: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            header_rows: 1,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for generated files (current directory when unset).
    pub dir: Option<PathBuf>,
    /// Extension of the interchange file.
    pub interchange_extension: String,
    /// Extension of the PCAS file.
    pub institutional_extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            interchange_extension: "TXT".to_string(),
            institutional_extension: "PCAS.TXT".to_string(),
        }
    }
}

/// Validation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Abort on interchange lines with an unknown record type.
    pub strict_record_types: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Run log path.
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("pcas.log"),
        }
    }
}

impl Config {
    /// Load configuration from default locations.
    pub fn load() -> Self {
        let mut config = Config::default();

        // Try user config first
        if let Some(user_config) = Self::user_config_path() {
            if let Ok(c) = Self::load_from_file(&user_config) {
                config = config.merge(c);
            }
        }

        // Then project config (higher priority)
        if let Ok(c) = Self::load_from_file(Path::new("pcas.toml")) {
            config = config.merge(c);
        }

        config.apply_env_vars();
        config
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the user configuration file path.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pcas").join("config.toml"))
    }

    /// Merge another config into this one (non-default values in `other` win).
    pub fn merge(mut self, other: Config) -> Self {
        let defaults = Config::default();

        if other.codes.institution != defaults.codes.institution {
            self.codes.institution = other.codes.institution;
        }
        if other.codes.entity != defaults.codes.entity {
            self.codes.entity = other.codes.entity;
        }
        if other.input.delimiter != defaults.input.delimiter {
            self.input.delimiter = other.input.delimiter;
        }
        if other.input.header_rows != defaults.input.header_rows {
            self.input.header_rows = other.input.header_rows;
        }
        if other.output.dir.is_some() {
            self.output.dir = other.output.dir;
        }
        if other.output.interchange_extension != defaults.output.interchange_extension {
            self.output.interchange_extension = other.output.interchange_extension;
        }
        if other.output.institutional_extension != defaults.output.institutional_extension {
            self.output.institutional_extension = other.output.institutional_extension;
        }
        if other.validation.strict_record_types {
            self.validation.strict_record_types = true;
        }
        if other.logging.file != defaults.logging.file {
            self.logging.file = other.logging.file;
        }

        self
    }

    /// Apply environment variables to configuration.
    fn apply_env_vars(&mut self) {
        if let Ok(val) = std::env::var("PCAS_INSTITUTION") {
            self.codes.institution = val;
        }
        if let Ok(val) = std::env::var("PCAS_ENTITY") {
            self.codes.entity = val;
        }
        if let Ok(val) = std::env::var("PCAS_DELIMITER") {
            if let Some(c) = val.chars().next() {
                self.input.delimiter = c;
            }
        }
        if let Ok(val) = std::env::var("PCAS_HEADER_ROWS") {
            if let Ok(n) = val.parse() {
                self.input.header_rows = n;
            }
        }
        if let Ok(val) = std::env::var("PCAS_OUTPUT_DIR") {
            self.output.dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("PCAS_STRICT") {
            self.validation.strict_record_types = matches!(val.as_str(), "1" | "true" | "yes");
        }
        if let Ok(val) = std::env::var("PCAS_LOG_FILE") {
            self.logging.file = PathBuf::from(val);
        }
    }

    /// Generate a default configuration file.
    pub fn generate_default() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

/// Configuration error.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// I/O error reading config.
    #[error("I/O error for {}: {message}", path.display())]
    #[diagnostic(code(config::io_error))]
    IoError { path: PathBuf, message: String },

    /// Parse error in config file.
    #[error("Parse error in {}: {message}", path.display())]
    #[diagnostic(code(config::parse_error), help("See `pcas config` for the expected format"))]
    ParseError { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.codes.institution, "111");
        assert_eq!(config.codes.entity, "3294");
        assert_eq!(config.input.delimiter, ',');
        assert_eq!(config.input.header_rows, 1);
        assert_eq!(config.output.interchange_extension, "TXT");
        assert_eq!(config.output.institutional_extension, "PCAS.TXT");
        assert!(!config.validation.strict_record_types);
        assert_eq!(config.logging.file, PathBuf::from("pcas.log"));
    }

    #[test]
    fn test_generate_default() {
        let toml = Config::generate_default();
        assert!(toml.contains("[codes]"));
        assert!(toml.contains("[input]"));
        assert!(toml.contains("[output]"));
        assert!(toml.contains("[validation]"));
        assert!(toml.contains("[logging]"));
    }

    #[test]
    fn test_default_roundtrips_through_toml() {
        let parsed: Config = toml::from_str(&Config::generate_default()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[codes]
institution = "222"

[input]
delimiter = ";"
header_rows = 2

[output]
dir = "/data/pcas"

[validation]
strict_record_types = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.codes.institution, "222");
        assert_eq!(config.codes.entity, "3294");
        assert_eq!(config.input.delimiter, ';');
        assert_eq!(config.input.header_rows, 2);
        assert_eq!(config.output.dir, Some(PathBuf::from("/data/pcas")));
        assert!(config.validation.strict_record_types);
    }

    #[test]
    fn test_merge_config() {
        let base = Config::default();
        let override_config: Config = toml::from_str("[codes]\nentity = \"9999\"\n").unwrap();
        let merged = base.merge(override_config);
        assert_eq!(merged.codes.entity, "9999");
        // Other values should remain default
        assert_eq!(merged.codes.institution, "111");
        assert_eq!(merged.input.delimiter, ',');
        assert_eq!(merged.input.header_rows, 1);
    }

    #[test]
    fn test_merge_header_rows() {
        let project: Config = toml::from_str("[input]\nheader_rows = 0\n").unwrap();
        let merged = Config::default().merge(project);
        assert_eq!(merged.input.header_rows, 0);
        assert_eq!(merged.input.delimiter, ',');
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load_from_file(Path::new("/nonexistent/pcas.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }
}
