//! # fxp-core
//!
//! Stage orchestration engine for the FXJEFE trading pipeline.
//!
//! This crate provides:
//! - Run configuration merged from defaults, a config file and CLI overrides
//! - Stage resolution over the project tree with built-in fallbacks
//! - Per-stage execution with failure containment and timing
//! - The sequential pipeline runner and its end-of-run summary
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and merging
//! - [`stages`]: Stage unit trait, registry, resolver and adapters
//! - [`engine`]: Pipeline runner and stage executor
//! - [`state`]: Per-stage lifecycle state machine
//! - [`report`]: Run summary rendering

pub mod config;
pub mod engine;
pub mod report;
pub mod stages;
pub mod state;
