//! Stage machine service.
//!
//! Wraps [`JourneyState`] with the elevated-privilege capability and
//! persistence. Every accepted mutation writes the full journey record once;
//! rejected guards write nothing.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::domain::models::{Access, JourneyState, StageId, StageMeta, ViewMode};
use crate::domain::ports::{recover, ProgressStore};

use super::outcome::{PersistenceNotice, Transition};

const RECORD: &str = "journey";

pub struct StageMachine<S: ProgressStore> {
    store: Arc<S>,
    state: JourneyState,
    access: Access,
    unsaved: Option<PersistenceNotice>,
}

impl<S: ProgressStore> StageMachine<S> {
    /// Load the journey from `store`, falling back to the default journey.
    pub fn load(store: Arc<S>, access: Access) -> Self {
        let state = recover(RECORD, store.load_journey());
        debug!(
            current = %state.current_stage,
            completed = state.completed_stages.len(),
            "journey loaded"
        );
        Self {
            store,
            state,
            access,
            unsaved: None,
        }
    }

    pub fn state(&self) -> &JourneyState {
        &self.state
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn set_access(&mut self, access: Access) {
        self.access = access;
    }

    pub fn current_stage(&self) -> StageId {
        self.state.current_stage
    }

    pub fn viewing_stage(&self) -> StageId {
        self.state.viewing_stage
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state.view_mode
    }

    pub fn stage_meta(&self, stage: StageId) -> StageMeta {
        self.state.meta(stage)
    }

    pub fn can_advance(&self) -> bool {
        self.state.can_advance(self.access)
    }

    pub fn can_preview_back(&self, stage: StageId) -> bool {
        self.state.can_preview_back(stage, self.access)
    }

    pub fn can_peek_next(&self) -> bool {
        self.state.can_peek_next(self.access)
    }

    pub fn is_stage_editable(&self, stage: StageId) -> bool {
        self.state.is_stage_editable(stage, self.access)
    }

    pub fn is_stage_completed(&self, stage: StageId) -> bool {
        self.state.is_stage_completed(stage)
    }

    pub fn go_to_stage(&mut self, stage: StageId) -> Transition {
        if !self.state.go_to_stage(stage, self.access) {
            trace!(%stage, current = %self.state.current_stage, "go_to_stage rejected");
            return Transition::Rejected;
        }
        debug!(%stage, mode = self.state.view_mode.as_str(), "viewing stage");
        self.persist();
        Transition::Applied
    }

    /// Always applies; on the last stage nothing moves.
    pub fn complete_current_stage(&mut self) -> Transition {
        let finished = self.state.current_stage;
        self.state.complete_current_stage();
        info!(
            stage = %finished,
            current = %self.state.current_stage,
            "stage completed"
        );
        self.persist();
        Transition::Applied
    }

    pub fn preview_stage(&mut self, stage: StageId) -> Transition {
        match self.state.preview_stage(stage, self.access) {
            Some(mode) => {
                debug!(%stage, mode = mode.as_str(), "previewing stage");
                self.persist();
                Transition::Applied
            }
            None => {
                trace!(%stage, "preview_stage rejected");
                Transition::Rejected
            }
        }
    }

    /// Always applies.
    pub fn return_to_current(&mut self) -> Transition {
        self.state.return_to_current();
        self.persist();
        Transition::Applied
    }

    /// Restore the default journey and persist it.
    pub fn reset_journey(&mut self) -> Transition {
        self.state.reset();
        info!("journey reset");
        self.persist();
        Transition::Applied
    }

    /// Take the pending persistence failure, if the last write failed.
    pub fn take_notice(&mut self) -> Option<PersistenceNotice> {
        self.unsaved.take()
    }

    /// Each write is a full snapshot, so a later success supersedes an
    /// earlier failure.
    fn persist(&mut self) {
        match self.store.save_journey(&self.state) {
            Ok(()) => self.unsaved = None,
            Err(error) => {
                warn!(record = RECORD, %error, "journey not saved; keeping in-memory state");
                self.unsaved = Some(PersistenceNotice {
                    record: RECORD.to_string(),
                    error,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;

    fn stage(n: u8) -> StageId {
        StageId::new(n).unwrap()
    }

    fn machine() -> (Arc<InMemoryStore>, StageMachine<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let machine = StageMachine::load(Arc::clone(&store), Access::Standard);
        (store, machine)
    }

    #[test]
    fn test_rejected_transition_writes_nothing() {
        let (store, mut machine) = machine();
        let before = machine.state().clone();

        assert_eq!(machine.go_to_stage(stage(5)), Transition::Rejected);
        assert_eq!(machine.preview_stage(stage(2)), Transition::Rejected);
        assert_eq!(machine.state(), &before);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_accepted_transition_is_persisted() {
        let (store, mut machine) = machine();
        assert!(machine.complete_current_stage().is_applied());
        assert_eq!(store.write_count(), 1);

        let reloaded = StageMachine::load(Arc::clone(&store), Access::Standard);
        assert_eq!(reloaded.current_stage(), stage(2));
        assert!(reloaded.is_stage_completed(stage(1)));
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let store = Arc::new(InMemoryStore::failing());
        let mut machine = StageMachine::load(Arc::clone(&store), Access::Standard);

        assert!(machine.complete_current_stage().is_applied());
        assert_eq!(machine.current_stage(), stage(2));

        let notice = machine.take_notice().expect("failure should be reported");
        assert_eq!(notice.record, "journey");
        assert!(machine.take_notice().is_none());

        store.set_fail_writes(false);
        machine.return_to_current();
        assert!(machine.take_notice().is_none());
        assert_eq!(
            store.load_journey().unwrap().map(|s| s.current_stage),
            Some(stage(2))
        );
    }

    #[test]
    fn test_elevated_access_can_be_granted_later() {
        let (_store, mut machine) = machine();
        assert!(machine.go_to_stage(stage(6)).is_rejected());

        machine.set_access(Access::Elevated);
        assert!(machine.go_to_stage(stage(6)).is_applied());
        assert_eq!(machine.view_mode(), ViewMode::PreviewBack);
        assert!(machine.is_stage_editable(stage(6)));
    }

    #[test]
    fn test_reset_twice_is_stable() {
        let (_store, mut machine) = machine();
        machine.complete_current_stage();
        machine.complete_current_stage();

        machine.reset_journey();
        let first = machine.state().clone();
        machine.reset_journey();
        assert_eq!(machine.state(), &first);
        assert_eq!(first, JourneyState::default());
    }
}
