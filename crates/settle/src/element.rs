//! Observable and clickable element seams.
//!
//! The browser driver is an external collaborator; it plugs in by
//! implementing these traits over its own element handles.

use crate::condition::{Condition, ElementState};
use crate::result::Staleness;

/// Result of evaluating a condition against a live element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Condition holds
    Satisfied,
    /// Element was read, condition does not hold
    Unsatisfied,
    /// Element could not be read
    Stale(Staleness),
}

impl Check {
    /// Whether the condition holds
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied)
    }
}

/// A queryable reference to UI state.
///
/// Implementations must not mutate application state when queried.
pub trait Observable {
    /// Identity used in logs and error messages
    fn name(&self) -> &str;

    /// Current snapshot of the element
    fn state(&self) -> Result<ElementState, Staleness>;

    /// Evaluate `condition`, keeping staleness distinct from "false"
    fn check(&self, condition: &Condition) -> Check {
        match self.state() {
            Ok(state) if condition.matches(&state) => Check::Satisfied,
            Ok(_) => Check::Unsatisfied,
            Err(stale) => Check::Stale(stale),
        }
    }

    /// Whether `condition` holds; a stale element does not satisfy anything
    fn has(&self, condition: &Condition) -> bool {
        self.check(condition).is_satisfied()
    }

    /// Existence probe
    fn exists(&self) -> Result<bool, Staleness> {
        self.state().map(|s| s.exists)
    }
}

/// An element the pointer can move to and click
pub trait Clickable: Observable {
    /// Move the pointer over the element
    fn hover(&self) -> Result<(), Staleness>;

    /// Issue the click
    fn click(&self) -> Result<(), Staleness>;
}

impl<T: Observable + ?Sized> Observable for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn state(&self) -> Result<ElementState, Staleness> {
        (**self).state()
    }

    fn check(&self, condition: &Condition) -> Check {
        (**self).check(condition)
    }

    fn has(&self, condition: &Condition) -> bool {
        (**self).has(condition)
    }

    fn exists(&self) -> Result<bool, Staleness> {
        (**self).exists()
    }
}

impl<T: Clickable + ?Sized> Clickable for &T {
    fn hover(&self) -> Result<(), Staleness> {
        (**self).hover()
    }

    fn click(&self) -> Result<(), Staleness> {
        (**self).click()
    }
}
