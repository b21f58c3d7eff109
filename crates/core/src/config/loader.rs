//! Configuration file loader.
//!
//! The file format is picked from the extension:
//! - `.toml`: TOML
//! - `.yaml` / `.yml`: YAML
//! - `.json`: JSON

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::{CliOverrides, RunConfig};
use fxp_protocol::config_models::FileConfig;
use std::path::Path;
use tracing::debug;

/// Loads a [`FileConfig`] from `path`.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file cannot be read
/// - The extension is not one of the supported formats
/// - The content does not parse in that format
///
/// # Example
///
/// ```rust,no_run
/// use fxp_core::config::loader::load_file_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = load_file_config(Path::new("pipeline.toml")).await?;
/// println!("symbol override: {:?}", file.symbol);
/// # Ok(())
/// # }
/// ```
pub async fn load_file_config(path: &Path) -> ConfigResult<FileConfig> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

    let config: FileConfig = match ext.as_deref() {
        Some("toml") => toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?,
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
                path: path.to_path_buf(),
                source,
            })?
        }
        Some("json") => serde_json::from_str(&content).map_err(|source| ConfigError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?,
        _ => {
            return Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Loads the optional file layer and merges it with `cli` over the defaults.
pub async fn load_run_config(
    config_path: Option<&Path>,
    cli: CliOverrides,
) -> ConfigResult<RunConfig> {
    let file = match config_path {
        Some(path) => Some(load_file_config(path).await?),
        None => None,
    };
    RunConfig::merge(file, cli)
}
