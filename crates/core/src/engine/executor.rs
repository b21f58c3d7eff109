//! Single-stage execution.

use crate::config::RunConfig;
use crate::state::stage::{annotate, begin, fail, finish, mark_running, skip, start, succeed};
use crate::stages::base::{EntryPoint, StageContext, StageError, StageOutput, StageUnit};
use crate::stages::builtin::workspace_setup::prepare_workspace;
use crate::stages::registry::StageBinding;
use crate::stages::resolver::{ResolvedStage, StageResolver};
use fxp_protocol::stage_models::{StageResult, StageStatus};
use std::any::Any;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

/// Runs one catalog stage and always produces a [`StageResult`].
///
/// 1. Dry run: SKIPPED, no resolution, no invocation
/// 2. Unresolved: SKIPPED with a note
/// 3. Resolution error or panic: FAILED, contained here
/// 4. Resolved without a callable entry point: SUCCESS, no output
/// 5. Invocation error or panic: FAILED, contained here
/// 6. Otherwise: SUCCESS with the unit's output
#[derive(Clone)]
pub struct StageExecutor {
    resolver: Arc<dyn StageResolver>,
}

impl StageExecutor {
    pub fn new(resolver: Arc<dyn StageResolver>) -> Self {
        Self { resolver }
    }

    pub async fn execute(&self, binding: &StageBinding, config: &RunConfig) -> StageResult {
        let stage = binding.stage;
        let mut progress = begin(stage);

        if config.dry_run {
            info!(%stage, "[dry-run] would execute stage");
            skip(&mut progress, "dry run");
            return finish(progress);
        }

        info!(%stage, "starting stage");

        if binding.prepares_workspace() {
            if let Err(err) = prepare_workspace(&StageContext::new(stage, config)).await {
                start(&mut progress);
                fail(&mut progress, format!("{err:#}"));
                error!(%stage, error = %format!("{err:#}"), "workspace preparation failed");
                return finish(progress);
            }
        }

        let resolved = match resolve_contained(Arc::clone(&self.resolver), binding.candidates).await {
            Ok(Some(resolved)) => resolved,
            Ok(None) => {
                let note = format!(
                    "no provider found (tried: {})",
                    binding.candidates.join(", ")
                );
                warn!(%stage, "{note}");
                skip(&mut progress, note);
                return finish(progress);
            }
            Err(err) => {
                start(&mut progress);
                fail(&mut progress, err.to_string());
                let result = finish(progress);
                error!(%stage, error = %err, "stage resolution failed");
                return result;
            }
        };

        mark_running(&mut progress, &resolved.provider);
        debug!(%stage, provider = %resolved.provider, location = ?resolved.location, "resolved");

        let policy = binding.dispatch_policy();
        match policy.select(&resolved.unit.entry_points()).cloned() {
            None => {
                debug!(%stage, provider = %resolved.provider, "no entry point exposed, nothing to call");
                annotate(&mut progress, "no entry point exposed");
                succeed(&mut progress, None);
            }
            Some(entry) => {
                let context = StageContext::new(stage, config);
                match invoke_contained(Arc::clone(&resolved.unit), entry, context).await {
                    Ok(output) => {
                        succeed(&mut progress, output);
                    }
                    Err(err) => {
                        fail(&mut progress, err.to_string());
                    }
                }
            }
        }

        let result = finish(progress);
        let elapsed = format!("{:.2}s", result.elapsed.as_secs_f64());
        match (&result.status, &result.error) {
            (StageStatus::Failed, Some(err)) => {
                error!(%stage, %elapsed, error = %err, "stage failed");
            }
            (status, _) => {
                info!(%stage, %status, %elapsed, "stage completed");
            }
        }
        result
    }
}

/// Resolve on the blocking pool. The lookup touches the filesystem, and a
/// panicking resolver must not unwind through the run.
async fn resolve_contained(
    resolver: Arc<dyn StageResolver>,
    candidates: &'static [&'static str],
) -> Result<Option<ResolvedStage>, StageError> {
    let handle = tokio::task::spawn_blocking(move || resolver.resolve(candidates));
    contained(handle.await)
}

/// Invoke `entry` on its own task so that a panicking unit is reported as an
/// error instead of unwinding through the run.
async fn invoke_contained(
    unit: Arc<dyn StageUnit>,
    entry: EntryPoint,
    context: StageContext,
) -> Result<StageOutput, StageError> {
    let handle = tokio::spawn(async move { unit.invoke(&entry, &context).await });
    contained(handle.await)
}

fn contained<T>(joined: Result<Result<T, StageError>, JoinError>) -> Result<T, StageError> {
    match joined {
        Ok(result) => result,
        Err(join_error) if join_error.is_panic() => {
            Err(StageError::Panicked(panic_message(join_error.into_panic())))
        }
        Err(join_error) => Err(StageError::Panicked(join_error.to_string())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
