//! Stage units compiled into the engine.
//!
//! These are registered in [`BuiltinProviders::standard`](crate::stages::BuiltinProviders::standard)
//! and are only consulted when no external provider with the same id is
//! found on the lookup path.

pub mod signals;
pub mod workspace_setup;

pub use signals::SignalGenerationStage;
pub use workspace_setup::WorkspaceSetupStage;
