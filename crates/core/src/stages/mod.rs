//! Stage abstraction layer.
//!
//! A stage in the catalog is bound (see [`registry`]) to an ordered list of
//! candidate provider ids. A [`StageResolver`] turns those ids into a
//! [`StageUnit`], and the [`DispatchPolicy`] decides which of the unit's entry
//! points gets called.

pub mod adapters;
pub mod base;
pub mod builtin;
pub mod dispatch;
pub mod registry;
pub mod resolver;

pub use base::{EntryPoint, StageContext, StageError, StageOutput, StageUnit};
pub use dispatch::DispatchPolicy;
pub use registry::{StageBinding, StageRegistry};
pub use resolver::{
    BuiltinProviders, LookupGuard, LookupPath, LookupResolver, ResolvedStage, StageResolver,
};
