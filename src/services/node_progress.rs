//! Per-outline node progress tracking.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, trace, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{validate_outline_id, NodeProgress, ProgressMap, ProgressStatus};
use crate::domain::ports::{recover, ProgressStore};

use super::outcome::{PersistenceNotice, Transition};

/// Progress records for one content outline.
///
/// Records are created lazily on first touch and never removed.
pub struct NodeProgressBook<S: ProgressStore> {
    store: Arc<S>,
    outline_id: String,
    progress: ProgressMap,
    unsaved: Option<PersistenceNotice>,
}

impl<S: ProgressStore> NodeProgressBook<S> {
    pub fn load(store: Arc<S>, outline_id: &str) -> DomainResult<Self> {
        validate_outline_id(outline_id)?;
        let progress = recover(
            &record_name(outline_id),
            store.load_node_progress(outline_id),
        );
        debug!(outline = outline_id, records = progress.len(), "node progress loaded");
        Ok(Self {
            store,
            outline_id: outline_id.to_string(),
            progress,
            unsaved: None,
        })
    }

    pub fn outline_id(&self) -> &str {
        &self.outline_id
    }

    pub fn progress(&self) -> &ProgressMap {
        &self.progress
    }

    pub fn get(&self, node_id: &str) -> Option<&NodeProgress> {
        self.progress.get(node_id)
    }

    pub fn status(&self, node_id: &str) -> ProgressStatus {
        self.get(node_id)
            .map(|record| record.status)
            .unwrap_or_default()
    }

    /// Count a visit, creating the record if needed.
    pub fn visit(&mut self, node_id: &str) -> NodeProgress {
        let record = self.progress.entry(node_id.to_string()).or_default();
        record.record_visit(Utc::now());
        let snapshot = record.clone();
        trace!(outline = %self.outline_id, node = node_id, visits = snapshot.visit_count, "node visited");
        self.persist();
        snapshot
    }

    pub fn start(&mut self, node_id: &str) -> Transition {
        self.advance(node_id, ProgressStatus::InProgress)
    }

    /// Rejected when the node is already completed.
    pub fn complete(&mut self, node_id: &str) -> Transition {
        self.advance(node_id, ProgressStatus::Completed)
    }

    fn advance(&mut self, node_id: &str, status: ProgressStatus) -> Transition {
        let current = self.status(node_id);
        if !current.can_transition_to(status) {
            trace!(node = node_id, from = current.as_str(), to = status.as_str(), "node transition rejected");
            return Transition::Rejected;
        }

        let record = self.progress.entry(node_id.to_string()).or_default();
        record.transition_to(status, Utc::now());
        debug!(outline = %self.outline_id, node = node_id, status = status.as_str(), "node progressed");
        self.persist();
        Transition::Applied
    }

    pub fn take_notice(&mut self) -> Option<PersistenceNotice> {
        self.unsaved.take()
    }

    fn persist(&mut self) {
        if let Err(error) = self.store.save_node_progress(&self.outline_id, &self.progress) {
            let record = record_name(&self.outline_id);
            warn!(%record, %error, "node progress not saved; keeping in-memory state");
            self.unsaved = Some(PersistenceNotice { record, error });
        } else {
            self.unsaved = None;
        }
    }
}

fn record_name(outline_id: &str) -> String {
    format!("nodes:{outline_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;

    fn book() -> (Arc<InMemoryStore>, NodeProgressBook<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let book = NodeProgressBook::load(Arc::clone(&store), "guided").unwrap();
        (store, book)
    }

    #[test]
    fn test_visit_creates_record_lazily() {
        let (_store, mut book) = book();
        assert!(book.get("intro").is_none());

        book.visit("intro");
        let record = book.visit("intro");
        assert_eq!(record.visit_count, 2);
        assert_eq!(record.status, ProgressStatus::NotStarted);
        assert!(record.last_visited.is_some());
    }

    #[test]
    fn test_complete_twice_is_rejected() {
        let (store, mut book) = book();
        assert!(book.start("intro").is_applied());
        assert!(book.complete("intro").is_applied());
        assert!(book.complete("intro").is_rejected());
        assert!(book.start("intro").is_rejected());
        assert_eq!(store.write_count(), 2);

        let record = book.get("intro").unwrap();
        assert!(record.started_at.is_some());
        assert!(record.completed_at.is_some());
    }

    #[test]
    fn test_outlines_are_independent() {
        let (store, mut book) = book();
        book.complete("intro");

        let other = NodeProgressBook::load(Arc::clone(&store), "map-3d").unwrap();
        assert!(other.progress().is_empty());

        let reloaded = NodeProgressBook::load(Arc::clone(&store), "guided").unwrap();
        assert_eq!(reloaded.status("intro"), ProgressStatus::Completed);
    }

    #[test]
    fn test_invalid_outline_id() {
        let store = Arc::new(InMemoryStore::new());
        assert!(NodeProgressBook::load(store, "no/slashes").is_err());
    }
}
