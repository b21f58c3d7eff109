//! Configuration loading and merging.
//!
//! A run is configured from three layers, highest precedence first:
//! command-line overrides, an optional configuration file, built-in defaults.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_file_config, load_run_config};
pub use models::{CliOverrides, RunConfig};
