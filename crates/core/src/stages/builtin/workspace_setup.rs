//! Built-in `setup` provider: make sure the working directories exist.

use crate::stages::base::{EntryPoint, StageContext, StageError, StageOutput, StageUnit};
use anyhow::Context;
use async_trait::async_trait;
use tracing::info;

/// Create the data, models and output directories of `context`.
///
/// The executor also calls this ahead of any external `setup` provider, so
/// the directories exist whichever provider runs.
pub async fn prepare_workspace(context: &StageContext) -> anyhow::Result<()> {
    for dir in [&context.data_dir, &context.models_dir, &context.output_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceSetupStage;

#[async_trait]
impl StageUnit for WorkspaceSetupStage {
    fn entry_points(&self) -> Vec<EntryPoint> {
        vec![EntryPoint::named("resolve")]
    }

    async fn invoke(
        &self,
        _entry: &EntryPoint,
        context: &StageContext,
    ) -> Result<StageOutput, StageError> {
        prepare_workspace(context).await?;

        info!(project_root = %context.project_root.display(), "workspace ready");

        Ok(Some(serde_json::json!({
            "project_root": context.project_root.display().to_string(),
            "data_dir": context.data_dir.display().to_string(),
            "models_dir": context.models_dir.display().to_string(),
            "output_dir": context.output_dir.display().to_string(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use fxp_protocol::stage_models::StageName;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_creates_working_directories() {
        let root = tempdir().expect("Failed to create temp dir");
        let config = RunConfig {
            project_root: root.path().to_path_buf(),
            data_dir: root.path().join("data"),
            models_dir: root.path().join("models"),
            output_dir: root.path().join("nested").join("output"),
            ..RunConfig::default()
        };
        let context = StageContext::new(StageName::Setup, &config);

        let output = WorkspaceSetupStage
            .invoke(&EntryPoint::named("resolve"), &context)
            .await
            .expect("setup should succeed")
            .expect("setup reports the workspace");

        assert!(root.path().join("data").is_dir());
        assert!(root.path().join("models").is_dir());
        assert!(root.path().join("nested/output").is_dir());
        assert_eq!(
            output["project_root"],
            root.path().display().to_string().as_str()
        );
    }

    #[tokio::test]
    async fn test_fails_when_directory_cannot_be_created() {
        let root = tempdir().expect("Failed to create temp dir");
        let blocker = root.path().join("data");
        std::fs::write(&blocker, "a file, not a directory").expect("Failed to write file");

        let config = RunConfig {
            project_root: root.path().to_path_buf(),
            data_dir: blocker.join("inner"),
            ..RunConfig::default()
        };
        let context = StageContext::new(StageName::Setup, &config);

        let err = WorkspaceSetupStage
            .invoke(&EntryPoint::named("resolve"), &context)
            .await
            .expect_err("a file is in the way");

        assert!(err.to_string().starts_with("Failed to create"));
    }
}
