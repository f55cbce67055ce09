//! Null progress store implementation.
//!
//! Used for throwaway sessions where nothing should touch the disk.

use crate::domain::errors::StoreResult;
use crate::domain::models::{JourneyState, LedgerState, ProgressMap};

use super::ProgressStore;

/// A no-op store that remembers nothing.
#[derive(Debug, Clone, Default)]
pub struct NullProgressStore;

impl NullProgressStore {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressStore for NullProgressStore {
    fn load_journey(&self) -> StoreResult<Option<JourneyState>> {
        Ok(None)
    }

    fn save_journey(&self, _state: &JourneyState) -> StoreResult<()> {
        Ok(())
    }

    fn load_ledger(&self) -> StoreResult<Option<LedgerState>> {
        Ok(None)
    }

    fn save_ledger(&self, _ledger: &LedgerState) -> StoreResult<()> {
        Ok(())
    }

    fn load_node_progress(&self, _outline_id: &str) -> StoreResult<Option<ProgressMap>> {
        Ok(None)
    }

    fn save_node_progress(&self, _outline_id: &str, _progress: &ProgressMap) -> StoreResult<()> {
        Ok(())
    }
}
