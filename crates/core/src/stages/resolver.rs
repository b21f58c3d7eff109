//! Stage resolution.
//!
//! A [`StageResolver`] turns the ordered candidate provider ids of one stage
//! into a concrete [`StageUnit`], or reports that none is available. Not
//! finding a provider is a normal outcome: the executor marks the stage
//! SKIPPED. A lookup location that exists but cannot be read is an error,
//! and the stage is FAILED.
//!
//! [`LookupResolver`] is the default implementation. It searches a shared
//! [`LookupPath`] that is temporarily augmented with the project's source
//! directories for the duration of a single `resolve` call, then falls back
//! to the built-in providers.

use crate::config::RunConfig;
use crate::stages::adapters::command::CommandStage;
use crate::stages::base::{StageError, StageUnit};
use crate::stages::builtin::signals::SignalGenerationStage;
use crate::stages::builtin::workspace_setup::WorkspaceSetupStage;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Root-relative source directories searched on every resolution.
const SOURCE_DIRS: [&str; 8] = [
    "src",
    "src/pipeline",
    "src/features",
    "src/models",
    "src/evaluation",
    "src/trading",
    "src/tracing",
    "src/utils",
];

/// A located implementation for one stage.
#[derive(Clone)]
pub struct ResolvedStage {
    /// The candidate id that matched.
    pub provider: String,

    /// Where it was found; `None` for built-in providers.
    pub location: Option<PathBuf>,

    pub unit: Arc<dyn StageUnit>,
}

impl fmt::Debug for ResolvedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedStage")
            .field("provider", &self.provider)
            .field("location", &self.location)
            .field("entry_points", &self.unit.entry_points())
            .finish()
    }
}

/// Locates a stage implementation from an ordered list of candidate ids.
pub trait StageResolver: Send + Sync {
    /// Returns the first candidate that resolves, `Ok(None)` when none does.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] when a candidate location exists but cannot
    /// be inspected. The executor reports this as a stage failure.
    fn resolve(&self, candidates: &[&str]) -> Result<Option<ResolvedStage>, StageError>;
}

#[derive(Debug, Default)]
struct LookupEntries {
    next_owner: u64,
    /// Each entry is tagged with the augmentation that added it; base
    /// entries have no owner.
    list: Vec<(Option<u64>, PathBuf)>,
}

/// Shared, ordered list of lookup locations.
///
/// Cloning shares the underlying list. Temporary additions go through
/// [`LookupPath::augment`] so that they never outlive one resolution.
#[derive(Debug, Clone, Default)]
pub struct LookupPath {
    entries: Arc<Mutex<LookupEntries>>,
}

impl LookupPath {
    pub fn new(entries: Vec<PathBuf>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(LookupEntries {
                next_owner: 0,
                list: entries.into_iter().map(|path| (None, path)).collect(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LookupEntries> {
        // A panic while holding the lock cannot leave the list half-written,
        // so a poisoned lock is still usable.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the current entries.
    pub fn entries(&self) -> Vec<PathBuf> {
        self.lock().list.iter().map(|(_, path)| path.clone()).collect()
    }

    /// Prepend `extra` and return a guard that removes exactly those entries
    /// when dropped. Guards may be dropped in any order.
    ///
    /// # Example
    ///
    /// ```
    /// use fxp_core::stages::LookupPath;
    /// use std::path::PathBuf;
    ///
    /// let path = LookupPath::new(vec![PathBuf::from("/opt/stages")]);
    /// {
    ///     let _guard = path.augment(vec![PathBuf::from("/srv/fx/src")]);
    ///     assert_eq!(path.entries().len(), 2);
    /// }
    /// assert_eq!(path.entries(), vec![PathBuf::from("/opt/stages")]);
    /// ```
    #[must_use = "the augmentation is reverted as soon as the guard is dropped"]
    pub fn augment(&self, extra: Vec<PathBuf>) -> LookupGuard {
        let mut entries = self.lock();
        entries.next_owner += 1;
        let owner = entries.next_owner;

        let mut augmented: Vec<(Option<u64>, PathBuf)> =
            extra.into_iter().map(|path| (Some(owner), path)).collect();
        augmented.append(&mut entries.list);
        entries.list = augmented;

        LookupGuard {
            path: self.clone(),
            owner,
        }
    }
}

/// Removes one augmentation from a [`LookupPath`] on drop.
#[derive(Debug)]
pub struct LookupGuard {
    path: LookupPath,
    owner: u64,
}

impl Drop for LookupGuard {
    fn drop(&mut self) {
        let owner = Some(self.owner);
        self.path.lock().list.retain(|(tag, _)| *tag != owner);
    }
}

/// Table of providers compiled into the engine, keyed by provider id.
///
/// The table is itself a [`StageResolver`], which makes it a convenient
/// filesystem-free resolver for embedding and tests.
#[derive(Clone, Default)]
pub struct BuiltinProviders {
    units: HashMap<String, Arc<dyn StageUnit>>,
}

impl BuiltinProviders {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The providers shipped with the engine.
    pub fn standard() -> Self {
        let mut providers = Self::empty();
        providers.register("workspace_setup", Arc::new(WorkspaceSetupStage));
        providers.register(
            "generate_signals_with_xgboost",
            Arc::new(SignalGenerationStage::default()),
        );
        providers
    }

    /// Register (or replace) a provider.
    pub fn register(&mut self, provider: &str, unit: Arc<dyn StageUnit>) {
        self.units.insert(provider.to_string(), unit);
    }

    pub fn get(&self, provider: &str) -> Option<Arc<dyn StageUnit>> {
        self.units.get(provider).cloned()
    }

    pub fn providers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.units.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for BuiltinProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinProviders")
            .field("providers", &self.providers())
            .finish()
    }
}

impl StageResolver for BuiltinProviders {
    fn resolve(&self, candidates: &[&str]) -> Result<Option<ResolvedStage>, StageError> {
        Ok(candidates.iter().find_map(|candidate| {
            self.get(candidate).map(|unit| ResolvedStage {
                provider: candidate.to_string(),
                location: None,
                unit,
            })
        }))
    }
}

/// Filesystem-first resolver with built-in fallbacks.
///
/// For each candidate, in order, every lookup location is searched:
/// - `<location>/<candidate>/` containing executables is a command unit
///   exposing one entry point per executable (`main`, `run`, or a named
///   convention);
/// - an executable file `<location>/<candidate>` is a command unit exposing
///   `main`.
///
/// If no location matches, the built-in table is consulted for that
/// candidate before moving on to the next one.
#[derive(Debug, Clone)]
pub struct LookupResolver {
    project_root: PathBuf,
    extra_dirs: Vec<PathBuf>,
    lookup_path: LookupPath,
    builtins: BuiltinProviders,
}

impl LookupResolver {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            extra_dirs: Vec::new(),
            lookup_path: LookupPath::default(),
            builtins: BuiltinProviders::standard(),
        }
    }

    /// Resolver rooted at the configured project root, searching the
    /// configured `lookup_dirs` as well.
    pub fn from_config(config: &RunConfig) -> Self {
        let extra_dirs = config
            .lookup_dirs
            .iter()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    config.project_root.join(dir)
                }
            })
            .collect();

        Self {
            extra_dirs,
            ..Self::new(&config.project_root)
        }
    }

    /// Share an existing lookup path; its entries are searched after the
    /// project directories.
    pub fn with_lookup_path(mut self, lookup_path: LookupPath) -> Self {
        self.lookup_path = lookup_path;
        self
    }

    pub fn with_builtins(mut self, builtins: BuiltinProviders) -> Self {
        self.builtins = builtins;
        self
    }

    pub fn lookup_path(&self) -> &LookupPath {
        &self.lookup_path
    }

    fn project_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.project_root.clone()];
        dirs.extend(SOURCE_DIRS.iter().map(|dir| self.project_root.join(dir)));
        dirs.extend(self.extra_dirs.iter().cloned());
        dirs
    }

    fn search(
        &self,
        locations: &[PathBuf],
        candidate: &str,
    ) -> Result<Option<ResolvedStage>, StageError> {
        for location in locations {
            if let Some(unit) = CommandStage::discover(location, candidate)? {
                debug!(
                    candidate,
                    location = %location.display(),
                    "resolved command provider"
                );
                return Ok(Some(ResolvedStage {
                    provider: candidate.to_string(),
                    location: Some(location.clone()),
                    unit: Arc::new(unit),
                }));
            }
        }

        Ok(self.builtins.get(candidate).map(|unit| {
            debug!(candidate, "resolved built-in provider");
            ResolvedStage {
                provider: candidate.to_string(),
                location: None,
                unit,
            }
        }))
    }
}

impl StageResolver for LookupResolver {
    fn resolve(&self, candidates: &[&str]) -> Result<Option<ResolvedStage>, StageError> {
        let _guard = self.lookup_path.augment(self.project_dirs());
        let locations: Vec<PathBuf> = self
            .lookup_path
            .entries()
            .into_iter()
            .filter(|location| location.is_dir())
            .collect();

        for candidate in candidates {
            if let Some(resolved) = self.search(&locations, candidate)? {
                return Ok(Some(resolved));
            }
        }
        Ok(None)
    }
}
