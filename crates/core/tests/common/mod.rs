//! Common test utilities for the engine integration tests.
//!
//! This module provides shared functionality across the integration tests:
//! - Test fixtures (project trees, run configs, stage scripts)
//! - Custom assertions over run results
//! - Fake resolvers built from scripted stages

pub mod assertions;
pub mod fake_stages;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fake_stages::*;
#[allow(unused_imports)]
pub use fixtures::*;
