//! Base StageUnit trait and supporting types.

use crate::config::RunConfig;
use async_trait::async_trait;
use fxp_protocol::config_models::StageParams;
use fxp_protocol::stage_models::StageName;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A recognised invocation convention on a stage unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    /// Primary entry convention.
    Main,
    /// Stage-specific named convention such as `generate` or `predict`.
    Named(String),
    /// Generic fallback convention.
    Run,
}

impl EntryPoint {
    pub fn named(name: &str) -> Self {
        Self::Named(name.to_string())
    }

    /// The name this entry point is exposed under.
    pub fn name(&self) -> &str {
        match self {
            Self::Main => "main",
            Self::Named(name) => name,
            Self::Run => "run",
        }
    }

    /// Map an exposed name back to an entry point.
    pub fn from_name(name: &str) -> Self {
        match name {
            "main" => Self::Main,
            "run" => Self::Run,
            other => Self::Named(other.to_string()),
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a stage unit receives when invoked.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// The catalog stage being run.
    pub stage: StageName,

    pub project_root: PathBuf,
    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
    pub output_dir: PathBuf,

    /// Opaque parameter bundle.
    pub params: StageParams,
}

impl StageContext {
    pub fn new(stage: StageName, config: &RunConfig) -> Self {
        Self {
            stage,
            project_root: config.project_root.clone(),
            data_dir: config.data_dir.clone(),
            models_dir: config.models_dir.clone(),
            output_dir: config.output_dir.clone(),
            params: config.params.clone(),
        }
    }
}

#[derive(Error, Debug)]
pub enum StageError {
    /// The stage body returned an error.
    #[error("{0:#}")]
    Body(#[from] anyhow::Error),

    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {detail}")]
    CommandFailed {
        command: String,
        status: String,
        detail: String,
    },

    /// A lookup location could not be inspected while resolving.
    #[error("Failed to inspect '{}': {source}", path.display())]
    Lookup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Stage panicked: {0}")]
    Panicked(String),

    #[error("Inference backend unavailable and degraded mode is disabled: {0}")]
    DegradedRefused(String),
}

/// Free-form payload a stage may hand back.
pub type StageOutput = Option<serde_json::Value>;

/// An independently resolvable unit of work.
///
/// A unit exposes zero or more entry points; the executor picks one
/// according to the stage's dispatch policy and calls [`StageUnit::invoke`]
/// with it.
#[async_trait]
pub trait StageUnit: Send + Sync {
    /// Entry points this unit exposes.
    fn entry_points(&self) -> Vec<EntryPoint>;

    async fn invoke(
        &self,
        entry: &EntryPoint,
        context: &StageContext,
    ) -> Result<StageOutput, StageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoStage;

    #[async_trait]
    impl StageUnit for EchoStage {
        fn entry_points(&self) -> Vec<EntryPoint> {
            vec![EntryPoint::Run]
        }

        async fn invoke(
            &self,
            entry: &EntryPoint,
            context: &StageContext,
        ) -> Result<StageOutput, StageError> {
            Ok(Some(serde_json::json!({
                "entry": entry.name(),
                "stage": context.stage.as_str(),
            })))
        }
    }

    #[test]
    fn test_entry_point_names_round_trip() {
        for entry in [EntryPoint::Main, EntryPoint::named("predict"), EntryPoint::Run] {
            assert_eq!(EntryPoint::from_name(entry.name()), entry);
        }
    }

    #[test]
    fn test_stage_context_from_config() {
        let config = RunConfig::default();
        let context = StageContext::new(StageName::Evaluation, &config);

        assert_eq!(context.stage, StageName::Evaluation);
        assert_eq!(context.project_root, config.project_root);
        assert_eq!(context.params, config.params);
    }

    #[tokio::test]
    async fn test_stage_unit_invoke() {
        let context = StageContext::new(StageName::Setup, &RunConfig::default());
        let output = EchoStage
            .invoke(&EntryPoint::Run, &context)
            .await
            .expect("echo stage should succeed");

        let output = output.expect("echo stage returns a payload");
        assert_eq!(output["entry"], "run");
        assert_eq!(output["stage"], "setup");
    }

    #[test]
    fn test_stage_error_messages() {
        let err = StageError::CommandFailed {
            command: "feature_engineering".to_string(),
            status: "exit status: 3".to_string(),
            detail: "missing column".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'feature_engineering' exited with exit status: 3: missing column"
        );

        let err = StageError::from(anyhow::anyhow!("bad input").context("loading data"));
        assert_eq!(err.to_string(), "loading data: bad input");
    }
}
