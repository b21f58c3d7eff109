//! Error types for configuration loading.
//!
//! This module defines all errors that can occur while reading a
//! configuration file or merging it into a run configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk.
    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML file at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse YAML file at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Failed to parse JSON configuration.
    #[error("Failed to parse JSON file at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The file extension does not map to a known format.
    #[error("Unsupported config format at {path} (expected .toml, .yaml, .yml or .json)")]
    UnsupportedFormat { path: PathBuf },

    /// A value is outside its accepted range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Type alias for Result with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
