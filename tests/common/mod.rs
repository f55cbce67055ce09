//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

#![allow(dead_code)]

use std::sync::Arc;

use journey::domain::models::{LearningNode, StageId};
use journey::{EngineSettings, JourneyEngine, JsonFileStore};
use tempfile::TempDir;

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Engine over a JSON store rooted in `dir`.
pub fn file_engine(dir: &TempDir) -> JourneyEngine<JsonFileStore> {
    let store = Arc::new(JsonFileStore::new(dir.path().join("profile")));
    JourneyEngine::load(store, EngineSettings::default())
}

pub fn stage(n: u8) -> StageId {
    StageId::new(n).expect("stage in range")
}

/// `A`, `B` requires `A`, `C` requires `A` and `B`.
pub fn abc_chain() -> Vec<LearningNode> {
    vec![
        LearningNode::new("A", "Node A"),
        LearningNode::new("B", "Node B").with_prerequisite("A"),
        LearningNode::new("C", "Node C")
            .with_prerequisite("A")
            .with_prerequisite("B"),
    ]
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
