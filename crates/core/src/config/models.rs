//! Run configuration and the explicit default/file/CLI merge.

use crate::config::error::{ConfigError, ConfigResult};
use fxp_protocol::config_models::{FileConfig, StageParams};
use fxp_protocol::stage_models::StageName;
use std::path::{Path, PathBuf};

/// Settings for one pipeline run. Built once, then only read.
///
/// # Example
///
/// ```rust
/// use fxp_core::config::{CliOverrides, RunConfig};
///
/// let cli = CliOverrides {
///     steps: Some(vec!["setup".to_string(), "5".to_string()]),
///     dry_run: Some(true),
///     ..CliOverrides::default()
/// };
/// let config = RunConfig::merge(None, cli).unwrap();
/// assert!(config.dry_run);
/// assert_eq!(config.stages.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Requested stage selectors (names or 1-based catalog indices), as
    /// given. Validated by the pipeline runner before anything executes.
    pub stages: Vec<String>,

    /// Validate the selection without invoking any stage.
    pub dry_run: bool,

    /// Project root; relative directories below are resolved against it.
    pub project_root: PathBuf,

    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
    pub output_dir: PathBuf,

    /// Extra directories searched for stage providers, after the built-in
    /// source locations.
    pub lookup_dirs: Vec<PathBuf>,

    /// Parameters handed to stage units.
    pub params: StageParams,
}

impl Default for RunConfig {
    fn default() -> Self {
        let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            stages: all_stage_selectors(),
            dry_run: false,
            data_dir: project_root.join("data"),
            models_dir: project_root.join("models"),
            output_dir: project_root.join("output"),
            lookup_dirs: Vec::new(),
            params: StageParams::default(),
            project_root,
        }
    }
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub steps: Option<Vec<String>>,
    pub dry_run: Option<bool>,
    pub project_root: Option<PathBuf>,
    pub symbol: Option<String>,
    pub timeframe: Option<String>,
    pub data_file: Option<String>,
    pub model_file: Option<String>,
    pub confidence_threshold: Option<f64>,
    pub account_equity: Option<f64>,
    pub max_risk_pct: Option<f64>,
    pub allow_degraded_inference: Option<bool>,
}

fn all_stage_selectors() -> Vec<String> {
    StageName::ALL.iter().map(|s| s.as_str().to_string()).collect()
}

fn resolve_dir(root: &Path, dir: PathBuf) -> PathBuf {
    if dir.is_absolute() {
        dir
    } else {
        root.join(dir)
    }
}

impl RunConfig {
    /// Merge built-in defaults, an optional file layer and CLI overrides,
    /// field by field (CLI > file > default), then validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a merged value is out of range.
    pub fn merge(file: Option<FileConfig>, cli: CliOverrides) -> ConfigResult<Self> {
        let file = file.unwrap_or_default();
        let defaults = StageParams::default();

        let project_root = cli
            .project_root
            .or(file.project_root)
            .unwrap_or_else(|| RunConfig::default().project_root);

        let data_dir = resolve_dir(
            &project_root,
            file.data_dir.unwrap_or_else(|| PathBuf::from("data")),
        );
        let models_dir = resolve_dir(
            &project_root,
            file.models_dir.unwrap_or_else(|| PathBuf::from("models")),
        );
        let output_dir = resolve_dir(
            &project_root,
            file.output_dir.unwrap_or_else(|| PathBuf::from("output")),
        );

        let params = StageParams {
            symbol: cli.symbol.or(file.symbol).unwrap_or(defaults.symbol),
            timeframe: cli.timeframe.or(file.timeframe).unwrap_or(defaults.timeframe),
            data_file: cli.data_file.or(file.data_file).unwrap_or(defaults.data_file),
            feature_count: file.feature_count.unwrap_or(defaults.feature_count),
            confidence_threshold: cli
                .confidence_threshold
                .or(file.confidence_threshold)
                .unwrap_or(defaults.confidence_threshold),
            model_file: cli.model_file.or(file.model_file).unwrap_or(defaults.model_file),
            signals_file: file.signals_file.unwrap_or(defaults.signals_file),
            allow_degraded_inference: cli
                .allow_degraded_inference
                .or(file.allow_degraded_inference)
                .unwrap_or(defaults.allow_degraded_inference),
            sharpe_threshold: file.sharpe_threshold.unwrap_or(defaults.sharpe_threshold),
            sortino_threshold: file.sortino_threshold.unwrap_or(defaults.sortino_threshold),
            profit_factor_threshold: file
                .profit_factor_threshold
                .unwrap_or(defaults.profit_factor_threshold),
            expectancy_threshold: file
                .expectancy_threshold
                .unwrap_or(defaults.expectancy_threshold),
            calmar_threshold: file.calmar_threshold.unwrap_or(defaults.calmar_threshold),
            account_equity: cli
                .account_equity
                .or(file.account_equity)
                .unwrap_or(defaults.account_equity),
            max_risk_pct: cli
                .max_risk_pct
                .or(file.max_risk_pct)
                .unwrap_or(defaults.max_risk_pct),
        };

        let config = Self {
            stages: cli
                .steps
                .or_else(|| {
                    file.steps
                        .map(|steps| steps.iter().map(ToString::to_string).collect())
                })
                .unwrap_or_else(all_stage_selectors),
            dry_run: cli.dry_run.or(file.dry_run).unwrap_or(false),
            data_dir,
            models_dir,
            output_dir,
            lookup_dirs: file.lookup_dirs.unwrap_or_default(),
            params,
            project_root,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges. Stage selectors are checked by the runner.
    pub fn validate(&self) -> ConfigResult<()> {
        let p = &self.params;

        if !(0.0..=1.0).contains(&p.confidence_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "confidence_threshold",
                reason: format!("{} is not within [0, 1]", p.confidence_threshold),
            });
        }
        if !p.account_equity.is_finite() || p.account_equity < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "account_equity",
                reason: format!("{} must be a non-negative amount", p.account_equity),
            });
        }
        if !(p.max_risk_pct > 0.0 && p.max_risk_pct <= 100.0) {
            return Err(ConfigError::InvalidValue {
                field: "max_risk_pct",
                reason: format!("{} is not within (0, 100]", p.max_risk_pct),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxp_protocol::config_models::StageSelector;

    #[test]
    fn test_merge_defaults_only() {
        let config = RunConfig::merge(None, CliOverrides::default()).unwrap();

        assert_eq!(config.stages.len(), StageName::ALL.len());
        assert_eq!(config.stages[0], "setup");
        assert!(!config.dry_run);
        assert_eq!(config.params, StageParams::default());
        assert_eq!(config.data_dir, config.project_root.join("data"));
    }

    #[test]
    fn test_merge_precedence_cli_over_file_over_default() {
        let file = FileConfig {
            symbol: Some("GBPUSD".to_string()),
            timeframe: Some("M15".to_string()),
            account_equity: Some(50_000.0),
            project_root: Some(PathBuf::from("/srv/from-file")),
            ..FileConfig::default()
        };
        let cli = CliOverrides {
            symbol: Some("USDJPY".to_string()),
            project_root: Some(PathBuf::from("/srv/from-cli")),
            ..CliOverrides::default()
        };

        let config = RunConfig::merge(Some(file), cli).unwrap();

        // CLI wins over file
        assert_eq!(config.params.symbol, "USDJPY");
        assert_eq!(config.project_root, PathBuf::from("/srv/from-cli"));
        // File wins over default
        assert_eq!(config.params.timeframe, "M15");
        assert_eq!(config.params.account_equity, 50_000.0);
        // Default otherwise
        assert_eq!(config.params.max_risk_pct, 1.5);
    }

    #[test]
    fn test_relative_dirs_resolve_against_root() {
        let file = FileConfig {
            project_root: Some(PathBuf::from("/srv/fx")),
            data_dir: Some(PathBuf::from("market")),
            output_dir: Some(PathBuf::from("/var/out")),
            ..FileConfig::default()
        };

        let config = RunConfig::merge(Some(file), CliOverrides::default()).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/fx/market"));
        assert_eq!(config.models_dir, PathBuf::from("/srv/fx/models"));
        assert_eq!(config.output_dir, PathBuf::from("/var/out"));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let cli = CliOverrides {
            confidence_threshold: Some(1.5),
            ..CliOverrides::default()
        };

        match RunConfig::merge(None, cli) {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "confidence_threshold")
            }
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_risk_rejected() {
        let file = FileConfig {
            max_risk_pct: Some(0.0),
            ..FileConfig::default()
        };
        assert!(RunConfig::merge(Some(file), CliOverrides::default()).is_err());
    }

    #[test]
    fn test_steps_are_kept_verbatim() {
        let cli = CliOverrides {
            steps: Some(vec!["7".to_string(), "setup".to_string()]),
            ..CliOverrides::default()
        };

        let config = RunConfig::merge(None, cli).unwrap();
        assert_eq!(config.stages, vec!["7".to_string(), "setup".to_string()]);
    }

    #[test]
    fn test_file_indices_become_selectors() {
        let file = FileConfig {
            steps: Some(vec![StageSelector::Index(5), StageSelector::from("setup")]),
            ..FileConfig::default()
        };

        let config = RunConfig::merge(Some(file), CliOverrides::default()).unwrap();
        assert_eq!(config.stages, vec!["5".to_string(), "setup".to_string()]);
    }
}
