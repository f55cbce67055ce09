//! Progress store port.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::errors::StoreResult;
use crate::domain::models::{JourneyState, LedgerState, ProgressMap};

/// Device-local persistence for the three engine records.
///
/// Each record loads and saves independently. `Ok(None)` means the record has
/// never been written; callers substitute defaults through [`recover`].
pub trait ProgressStore: Send + Sync {
    /// Load the stage journey record.
    fn load_journey(&self) -> StoreResult<Option<JourneyState>>;

    /// Save the stage journey record.
    fn save_journey(&self, state: &JourneyState) -> StoreResult<()>;

    /// Load the XP/trophy ledger record.
    fn load_ledger(&self) -> StoreResult<Option<LedgerState>>;

    /// Save the XP/trophy ledger record.
    fn save_ledger(&self, ledger: &LedgerState) -> StoreResult<()>;

    /// Load node progress for one content outline.
    fn load_node_progress(&self, outline_id: &str) -> StoreResult<Option<ProgressMap>>;

    /// Save node progress for one content outline.
    fn save_node_progress(&self, outline_id: &str, progress: &ProgressMap) -> StoreResult<()>;
}

impl<S: ProgressStore + ?Sized> ProgressStore for Arc<S> {
    fn load_journey(&self) -> StoreResult<Option<JourneyState>> {
        (**self).load_journey()
    }

    fn save_journey(&self, state: &JourneyState) -> StoreResult<()> {
        (**self).save_journey(state)
    }

    fn load_ledger(&self) -> StoreResult<Option<LedgerState>> {
        (**self).load_ledger()
    }

    fn save_ledger(&self, ledger: &LedgerState) -> StoreResult<()> {
        (**self).save_ledger(ledger)
    }

    fn load_node_progress(&self, outline_id: &str) -> StoreResult<Option<ProgressMap>> {
        (**self).load_node_progress(outline_id)
    }

    fn save_node_progress(&self, outline_id: &str, progress: &ProgressMap) -> StoreResult<()> {
        (**self).save_node_progress(outline_id, progress)
    }
}

/// Resolve a load result to a usable value.
///
/// Missing and unreadable records both become `T::default()`; an unreadable
/// record is logged and otherwise ignored.
pub fn recover<T: Default>(record: &str, loaded: StoreResult<Option<T>>) -> T {
    match loaded {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!(record, "no stored record, starting from defaults");
            T::default()
        }
        Err(err) => {
            warn!(record, error = %err, "discarding unreadable record, starting from defaults");
            T::default()
        }
    }
}
