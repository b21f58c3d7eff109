//! Fake resolvers for deterministic testing.

use fxp_core::stages::adapters::MockStage;
use fxp_core::stages::{BuiltinProviders, ResolvedStage, StageError, StageResolver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A resolver that only knows the given providers.
#[allow(dead_code)]
pub fn resolver_with(providers: &[(&str, MockStage)]) -> Arc<BuiltinProviders> {
    let mut builtins = BuiltinProviders::empty();
    for (id, stage) in providers {
        builtins.register(id, Arc::new(stage.clone()));
    }
    Arc::new(builtins)
}

/// Wraps a resolver and counts how often it is asked to resolve.
#[allow(dead_code)]
pub struct CountingResolver<R> {
    inner: R,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl<R: StageResolver> CountingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<R: StageResolver> StageResolver for CountingResolver<R> {
    fn resolve(&self, candidates: &[&str]) -> Result<Option<ResolvedStage>, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(candidates)
    }
}

/// How a [`FaultyResolver`] misbehaves.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    Error,
    Panic,
}

/// Misbehaves whenever `trigger` is among the candidates and delegates
/// otherwise.
#[allow(dead_code)]
pub struct FaultyResolver<R> {
    inner: R,
    trigger: &'static str,
    fault: Fault,
}

#[allow(dead_code)]
impl<R: StageResolver> FaultyResolver<R> {
    pub fn new(inner: R, trigger: &'static str, fault: Fault) -> Self {
        Self {
            inner,
            trigger,
            fault,
        }
    }
}

impl<R: StageResolver> StageResolver for FaultyResolver<R> {
    fn resolve(&self, candidates: &[&str]) -> Result<Option<ResolvedStage>, StageError> {
        if !candidates.contains(&self.trigger) {
            return self.inner.resolve(candidates);
        }
        match self.fault {
            Fault::Error => Err(StageError::Lookup {
                path: self.trigger.into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
            }),
            Fault::Panic => panic!("resolver exploded on {}", self.trigger),
        }
    }
}
