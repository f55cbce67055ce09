//! Domain errors for the journey progression engine.
//!
//! Guard rejections are deliberately absent: an illegal transition is a policy
//! outcome reported through `Transition::Rejected`, not an error.

use std::path::PathBuf;

use thiserror::Error;

/// Format a cycle path as a human-readable string: `a -> b -> c -> a`.
fn format_cycle_path(path: &[String]) -> String {
    let mut rendered = path.join(" -> ");
    if let Some(first) = path.first() {
        rendered.push_str(" -> ");
        rendered.push_str(first);
    }
    rendered
}

/// Domain-level errors that can occur in the progression engine.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Stage {0} is outside the journey (expected 1-8)")]
    InvalidStage(u8),

    #[error("Invalid stage {0:?}: expected a number from 1 to 8")]
    InvalidStageInput(String),

    #[error("Duplicate node id in outline: {0}")]
    DuplicateNode(String),

    #[error("Node {0} lists itself as a prerequisite")]
    SelfPrerequisite(String),

    #[error("Prerequisite cycle detected: {}", format_cycle_path(.0))]
    PrerequisiteCycle(Vec<String>),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid outline id {0:?}: use letters, digits, '-' or '_'")]
    InvalidOutlineId(String),

    #[error("Invalid level table: {0}")]
    InvalidLevelTable(String),

    #[error("Unknown rarity: {0}")]
    UnknownRarity(String),

    #[error("Unknown XP source: {0}")]
    UnknownXpSource(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Errors raised by a `ProgressStore` implementation.
///
/// None of these are fatal: reads fall back to defaults and writes leave the
/// in-memory state applied.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported record version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
