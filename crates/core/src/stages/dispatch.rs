//! Dispatch policy: which entry point of a resolved unit gets called.

use crate::stages::base::EntryPoint;

/// Fixed priority order of entry points for one stage:
/// `Main`, then the stage's named convention, then `Run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPolicy {
    order: [EntryPoint; 3],
}

impl DispatchPolicy {
    /// Build the policy for a stage whose named convention is `named`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fxp_core::stages::{DispatchPolicy, EntryPoint};
    ///
    /// let policy = DispatchPolicy::for_named("predict");
    /// let exposed = vec![EntryPoint::Run, EntryPoint::named("predict")];
    /// assert_eq!(policy.select(&exposed), Some(&EntryPoint::named("predict")));
    /// ```
    pub fn for_named(named: &str) -> Self {
        Self {
            order: [EntryPoint::Main, EntryPoint::named(named), EntryPoint::Run],
        }
    }

    pub fn order(&self) -> &[EntryPoint] {
        &self.order
    }

    /// First entry point in priority order that the unit exposes.
    pub fn select(&self, exposed: &[EntryPoint]) -> Option<&EntryPoint> {
        self.order.iter().find(|entry| exposed.contains(entry))
    }
}
