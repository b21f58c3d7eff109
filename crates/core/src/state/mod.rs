//! State management for pipeline stages.
//!
//! This module provides the per-stage state machine driven by the
//! [`StageExecutor`](crate::engine::StageExecutor).

pub mod stage;

pub use stage::StageProgress;
