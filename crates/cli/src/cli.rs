//! Command-line arguments.

use clap::Parser;
use fxp_core::config::CliOverrides;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fxjefe-pipeline")]
#[command(about = "Run the FXJEFE trading pipeline stages in order", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Project root directory
    #[arg(long, env = "FXJEFE_PROJECT_ROOT")]
    pub root: Option<PathBuf>,

    /// Configuration file (.toml, .yaml or .json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Comma-separated stages to run, by name or 1-based index (default: all)
    #[arg(long, value_delimiter = ',')]
    pub steps: Option<Vec<String>>,

    /// Validate the selection without executing any stage
    #[arg(long)]
    pub dry_run: bool,

    /// List available stages and exit
    #[arg(long)]
    pub list_steps: bool,

    /// Instrument symbol
    #[arg(long)]
    pub symbol: Option<String>,

    /// Bar timeframe
    #[arg(long)]
    pub timeframe: Option<String>,

    /// Input data file, relative to the data directory
    #[arg(long)]
    pub data_file: Option<String>,

    /// Model file, relative to the models directory
    #[arg(long)]
    pub model_file: Option<String>,

    /// Minimum probability for a BUY/SELL decision
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Account equity used for position sizing
    #[arg(long)]
    pub equity: Option<f64>,

    /// Maximum risk per trade, in percent of equity
    #[arg(long)]
    pub max_risk_pct: Option<f64>,

    /// Fail the prediction stage instead of falling back to uniform output
    #[arg(long)]
    pub no_degraded: bool,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Values given on the command line, as config overrides. Flags that were
    /// not passed stay `None` so the file and default layers apply.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            steps: self.steps.clone(),
            dry_run: self.dry_run.then_some(true),
            project_root: self.root.clone(),
            symbol: self.symbol.clone(),
            timeframe: self.timeframe.clone(),
            data_file: self.data_file.clone(),
            model_file: self.model_file.clone(),
            confidence_threshold: self.threshold,
            account_equity: self.equity,
            max_risk_pct: self.max_risk_pct,
            allow_degraded_inference: self.no_degraded.then_some(false),
        }
    }

    /// Default log filter for the verbosity flags; `RUST_LOG` wins over it.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}
