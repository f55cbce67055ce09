//! Learning node model.
//!
//! Content outlines are forests of learning nodes. Prerequisite edges may point
//! at any node in the forest (siblings, cousins, other branches), so the
//! nesting says nothing about unlock order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// An addressable unit of learning content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningNode {
    /// Unique across the whole forest, nested children included
    pub id: String,
    pub title: String,
    /// Ids of nodes that must be completed first
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LearningNode>,
}

impl LearningNode {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            prerequisites: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a prerequisite.
    pub fn with_prerequisite(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !self.prerequisites.contains(&id) {
            self.prerequisites.push(id);
        }
        self
    }

    /// Add a nested child node.
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

/// A named content outline (e.g. the guided-learning path or the 3D map).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub nodes: Vec<LearningNode>,
}

/// Outline ids end up in file names, so they are restricted to a safe alphabet.
pub fn validate_outline_id(id: &str) -> DomainResult<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidOutlineId(id.to_string()))
    }
}

/// Recorded progress status of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl Default for ProgressStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Progress only moves forward.
    pub fn can_transition_to(&self, new_status: Self) -> bool {
        new_status > *self
    }
}

/// Per-node progress record, created lazily on first visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeProgress {
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(default)]
    pub visit_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visited: Option<DateTime<Utc>>,
    /// Set once, on the first move into in-progress
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Set once, on the first move into completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl NodeProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_visit(&mut self, at: DateTime<Utc>) {
        self.visit_count = self.visit_count.saturating_add(1);
        self.last_visited = Some(at);
    }

    /// Move to a later status. Returns `false` for backwards or repeated moves.
    pub fn transition_to(&mut self, new_status: ProgressStatus, at: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(new_status) {
            return false;
        }

        self.status = new_status;
        match new_status {
            ProgressStatus::InProgress => {
                self.started_at.get_or_insert(at);
            }
            ProgressStatus::Completed => {
                self.completed_at.get_or_insert(at);
            }
            ProgressStatus::NotStarted => {}
        }
        true
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }
}

/// Node progress keyed by node id.
pub type ProgressMap = BTreeMap<String, NodeProgress>;

/// Derived status shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeState {
    Completed,
    InProgress,
    Available,
    Locked,
}

impl NodeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::InProgress => "in-progress",
            Self::Available => "available",
            Self::Locked => "locked",
        }
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::InProgress | Self::Available)
    }
}
