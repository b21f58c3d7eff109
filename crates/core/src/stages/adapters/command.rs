//! Command-backed stage units.
//!
//! An external stage is either a single executable (exposing `main`) or a
//! directory of executables whose file stems name the entry points they
//! implement (`main`, `run`, `generate`, `predict`, ...). Commands run with
//! the project root as working directory and receive the run configuration
//! through `FXJEFE_*` environment variables.

use crate::stages::base::{EntryPoint, StageContext, StageError, StageOutput, StageUnit};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

/// A stage unit backed by one or more executables.
#[derive(Debug, Clone)]
pub struct CommandStage {
    provider: String,
    commands: Vec<(EntryPoint, PathBuf)>,
}

impl CommandStage {
    pub fn new(provider: &str, commands: Vec<(EntryPoint, PathBuf)>) -> Self {
        Self {
            provider: provider.to_string(),
            commands,
        }
    }

    /// Look for `candidate` inside `location`.
    ///
    /// Returns `Ok(None)` when `location` holds neither a directory named
    /// `candidate` with at least one executable in it, nor an executable file
    /// named `candidate`. A path that exists but cannot be inspected is an
    /// error, not a miss.
    pub fn discover(location: &Path, candidate: &str) -> Result<Option<Self>, StageError> {
        let dir = location.join(candidate);
        match std::fs::metadata(&dir) {
            Ok(meta) if meta.is_dir() => {
                let commands = scan_entry_points(&dir)?;
                return Ok((!commands.is_empty()).then(|| Self::new(candidate, commands)));
            }
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(StageError::Lookup { path: dir, source }),
        }

        Ok(which::which_in(candidate, Some(location.as_os_str()), location)
            .ok()
            .map(|program| Self::new(candidate, vec![(EntryPoint::Main, program)])))
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    fn program_for(&self, entry: &EntryPoint) -> Option<&Path> {
        self.commands
            .iter()
            .find(|(exposed, _)| exposed == entry)
            .map(|(_, path)| path.as_path())
    }
}

/// Executables directly inside `dir`, keyed by file stem. The first file per
/// stem in name order wins.
fn scan_entry_points(dir: &Path) -> Result<Vec<(EntryPoint, PathBuf)>, StageError> {
    let lookup_error = |source| StageError::Lookup {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(lookup_error)? {
        let path = entry.map_err(lookup_error)?.path();
        if is_executable(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut commands: Vec<(EntryPoint, PathBuf)> = Vec::new();
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let entry = EntryPoint::from_name(stem);
        if !commands.iter().any(|(existing, _)| *existing == entry) {
            commands.push((entry, path));
        }
    }
    Ok(commands)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Stream the non-empty lines of a child's output.
fn output_lines<R>(reader: R) -> Pin<Box<dyn Stream<Item = String> + Send>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            yield line;
        }
    };

    Box::pin(stream)
}

fn parse_output(line: String) -> serde_json::Value {
    serde_json::from_str(&line).unwrap_or(serde_json::Value::String(line))
}

#[async_trait]
impl StageUnit for CommandStage {
    fn entry_points(&self) -> Vec<EntryPoint> {
        self.commands.iter().map(|(entry, _)| entry.clone()).collect()
    }

    async fn invoke(
        &self,
        entry: &EntryPoint,
        context: &StageContext,
    ) -> Result<StageOutput, StageError> {
        let program = self.program_for(entry).ok_or_else(|| {
            StageError::Body(anyhow::anyhow!(
                "{} does not expose the '{}' entry point",
                self.provider,
                entry
            ))
        })?;
        let command = program.display().to_string();

        let mut cmd = Command::new(program);
        cmd.current_dir(&context.project_root)
            .envs(context.params.to_env())
            .env("FXJEFE_PROJECT_ROOT", &context.project_root)
            .env("FXJEFE_DATA_DIR", &context.data_dir)
            .env("FXJEFE_MODELS_DIR", &context.models_dir)
            .env("FXJEFE_OUTPUT_DIR", &context.output_dir)
            .env("FXJEFE_STAGE", context.stage.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| StageError::Spawn {
            command: command.clone(),
            source,
        })?;

        let stdout = child.stdout.take().ok_or_else(|| StageError::Spawn {
            command: command.clone(),
            source: std::io::Error::other("stdout was not captured"),
        })?;

        // stderr is drained on its own task; only its last line is kept.
        let stderr_task = child.stderr.take().map(|stderr| {
            let stage = context.stage;
            tokio::spawn(async move {
                let mut lines = output_lines(stderr);
                let mut last = None;
                while let Some(line) = lines.next().await {
                    debug!(stage = %stage, stream = "stderr", "{line}");
                    last = Some(line);
                }
                last
            })
        });

        let mut lines = output_lines(stdout);
        let mut last_line = None;
        while let Some(line) = lines.next().await {
            debug!(stage = %context.stage, stream = "stdout", "{line}");
            last_line = Some(line);
        }

        let status = child.wait().await.map_err(|source| StageError::Spawn {
            command: command.clone(),
            source,
        })?;

        let last_stderr = match stderr_task {
            Some(task) => task.await.ok().flatten(),
            None => None,
        };

        if !status.success() {
            return Err(StageError::CommandFailed {
                command,
                status: status.to_string(),
                detail: last_stderr.unwrap_or_else(|| "no error output".to_string()),
            });
        }

        Ok(last_line.map(parse_output))
    }
}
