//! # fxp-protocol
//!
//! Shared data model for the FXJEFE stage pipeline.
//!
//! This crate defines the structures exchanged between the engine, the
//! stage units it drives and the command-line front end:
//! - The stage catalog and stage lifecycle
//! - Per-stage and per-run results
//! - Stage parameters and configuration file shape
//! - Trading-signal records
//!
//! ## Modules
//!
//! - [`stage_models`]: Stage catalog, status and results
//! - [`run_models`]: Aggregate run result
//! - [`config_models`]: Stage parameters and file configuration
//! - [`signal_models`]: Signals emitted by the prediction stage
//!
//! No engine logic lives here; only serde-friendly data types.

pub mod config_models;
pub mod run_models;
pub mod signal_models;
pub mod stage_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use run_models::*;
pub use signal_models::*;
pub use stage_models::*;
