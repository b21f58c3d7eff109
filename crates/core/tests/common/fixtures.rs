//! Test fixtures for creating project trees and run configurations.

use fxp_core::config::RunConfig;
use std::path::Path;
use tempfile::TempDir;

/// Create a temporary project root with the usual source layout.
///
/// This creates:
/// - `src/`, `src/pipeline/`, `src/features/`, `src/models/`
/// - empty `data/`, `models/` and `output/` directories
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let root = temp_dir.path();

    for dir in [
        "src/pipeline",
        "src/features",
        "src/models",
        "data",
        "models",
        "output",
    ] {
        std::fs::create_dir_all(root.join(dir))?;
    }

    Ok(temp_dir)
}

/// A run configuration rooted at `root` selecting `stages`.
#[allow(dead_code)]
pub fn run_config(root: &Path, stages: &[&str]) -> RunConfig {
    RunConfig {
        stages: stages.iter().map(|s| s.to_string()).collect(),
        project_root: root.to_path_buf(),
        data_dir: root.join("data"),
        models_dir: root.join("models"),
        output_dir: root.join("output"),
        ..RunConfig::default()
    }
}

/// Write an executable `/bin/sh` script.
#[cfg(unix)]
#[allow(dead_code)]
pub fn write_script(path: &Path, body: &str) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("#!/bin/sh\n{body}\n"))?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}
