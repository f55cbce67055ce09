//! In-memory progress store.
//!
//! Keeps records for the life of the process. Writes can be made to fail on
//! demand, which lets callers exercise the non-fatal persistence path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::{JourneyState, LedgerState, ProgressMap};
use crate::domain::ports::ProgressStore;

#[derive(Debug, Default)]
struct Records {
    journey: Option<JourneyState>,
    ledger: Option<LedgerState>,
    nodes: HashMap<String, ProgressMap>,
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<Records>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write.
    pub fn failing() -> Self {
        let store = Self::new();
        store.set_fail_writes(true);
        store
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn records(&self) -> StoreResult<MutexGuard<'_, Records>> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("record lock poisoned".to_string()))
    }

    fn write<F: FnOnce(&mut Records)>(&self, apply: F) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes are disabled".to_string()));
        }
        apply(&mut *self.records()?);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl ProgressStore for InMemoryStore {
    fn load_journey(&self) -> StoreResult<Option<JourneyState>> {
        Ok(self.records()?.journey.clone())
    }

    fn save_journey(&self, state: &JourneyState) -> StoreResult<()> {
        self.write(|records| records.journey = Some(state.clone()))
    }

    fn load_ledger(&self) -> StoreResult<Option<LedgerState>> {
        Ok(self.records()?.ledger.clone())
    }

    fn save_ledger(&self, ledger: &LedgerState) -> StoreResult<()> {
        self.write(|records| records.ledger = Some(ledger.clone()))
    }

    fn load_node_progress(&self, outline_id: &str) -> StoreResult<Option<ProgressMap>> {
        Ok(self.records()?.nodes.get(outline_id).cloned())
    }

    fn save_node_progress(&self, outline_id: &str, progress: &ProgressMap) -> StoreResult<()> {
        self.write(|records| {
            records
                .nodes
                .insert(outline_id.to_string(), progress.clone());
        })
    }
}
