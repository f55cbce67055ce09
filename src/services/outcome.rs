//! Outcomes shared by the mutating services.

use crate::domain::errors::StoreError;

/// Result of a guarded mutation.
///
/// A rejected guard is a policy outcome, not an error: the state is untouched
/// and nothing is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Rejected,
}

impl Transition {
    pub const fn from_applied(applied: bool) -> Self {
        if applied {
            Self::Applied
        } else {
            Self::Rejected
        }
    }

    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }

    pub const fn is_rejected(self) -> bool {
        matches!(self, Self::Rejected)
    }
}

/// A write that failed after the in-memory mutation was applied.
#[derive(Debug)]
pub struct PersistenceNotice {
    /// Which record failed to save (`journey`, `ledger`, `nodes:<outline>`)
    pub record: String,
    pub error: StoreError,
}

impl std::fmt::Display for PersistenceNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "progress not saved ({}): {}", self.record, self.error)
    }
}
