//! Unlock resolution over learning-node forests.
//!
//! Prerequisites are arbitrary cross-references, so every computation first
//! flattens the forest into an id-indexed table and evaluates against that,
//! never against the tree shape. The resolver knows nothing about any specific
//! content outline.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{LearningNode, NodeState, ProgressMap, ProgressStatus};

/// Forest flattened into traversal order (parent before children, top to
/// bottom) with an id index.
#[derive(Debug)]
pub struct FlatForest<'a> {
    order: Vec<&'a LearningNode>,
    index: HashMap<&'a str, usize>,
}

impl<'a> FlatForest<'a> {
    /// Flatten `forest`. On duplicate ids the first occurrence wins.
    pub fn new(forest: &'a [LearningNode]) -> Self {
        let mut order = Vec::new();
        let mut stack: Vec<&'a LearningNode> = forest.iter().rev().collect();
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(node.children.iter().rev());
        }

        let mut index = HashMap::with_capacity(order.len());
        for (position, node) in order.iter().enumerate() {
            index.entry(node.id.as_str()).or_insert(position);
        }
        Self { order, index }
    }

    pub fn get(&self, id: &str) -> Option<&'a LearningNode> {
        self.index.get(id).map(|&position| self.order[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a LearningNode> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A prerequisite id that names no node in the forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownPrerequisite {
    pub node: String,
    pub prerequisite: String,
}

/// Result of structural validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForestReport {
    pub node_count: usize,
    /// Nodes referencing these stay locked forever
    pub unknown_prerequisites: Vec<UnknownPrerequisite>,
}

/// Per-state counts for one outline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutlineSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub available: usize,
    pub locked: usize,
    /// Whole percent of nodes completed
    pub percent_complete: u8,
}

/// Service for resolving node unlocks and next-step recommendations
#[derive(Debug, Clone, Default)]
pub struct UnlockResolver;

/// Walk prerequisite edges depth-first from `id`.
///
/// `trail` is the chain of nodes that led here. Reaching a node that is
/// already on it closes a loop; the loop is left in `trail`, starting at that
/// node. Nodes in `cleared` were fully explored without finding one.
fn find_prerequisite_loop<'a>(
    id: &'a str,
    prerequisites: &HashMap<&'a str, Vec<&'a str>>,
    cleared: &mut HashSet<&'a str>,
    trail: &mut Vec<&'a str>,
) -> bool {
    if let Some(start) = trail.iter().position(|&seen| seen == id) {
        trail.drain(..start);
        return true;
    }
    if cleared.contains(id) {
        return false;
    }

    trail.push(id);
    let closes_loop = prerequisites
        .get(id)
        .into_iter()
        .flatten()
        .any(|&prerequisite| find_prerequisite_loop(prerequisite, prerequisites, cleared, trail));
    if !closes_loop {
        trail.pop();
        cleared.insert(id);
    }
    closes_loop
}

impl UnlockResolver {
    pub fn new() -> Self {
        Self
    }

    /// Ids of every unlocked node.
    ///
    /// A node is unlocked when each of its prerequisites is a node of this
    /// forest whose progress is completed. Unknown prerequisite ids are never
    /// satisfied, even if stale progress exists for them.
    pub fn compute_unlocked(
        &self,
        forest: &[LearningNode],
        progress: &ProgressMap,
    ) -> HashSet<String> {
        let flat = FlatForest::new(forest);
        let completed: HashSet<&str> = flat
            .iter()
            .map(|node| node.id.as_str())
            .filter(|id| {
                progress
                    .get(*id)
                    .is_some_and(|record| record.status == ProgressStatus::Completed)
            })
            .collect();

        flat.iter()
            .filter(|node| {
                node.prerequisites
                    .iter()
                    .all(|prerequisite| completed.contains(prerequisite.as_str()))
            })
            .map(|node| node.id.clone())
            .collect()
    }

    /// Display status of a single node.
    pub fn node_status(
        &self,
        id: &str,
        progress: &ProgressMap,
        unlocked: &HashSet<String>,
    ) -> NodeState {
        match progress.get(id).map(|record| record.status) {
            Some(ProgressStatus::Completed) => NodeState::Completed,
            Some(ProgressStatus::InProgress) => NodeState::InProgress,
            _ if unlocked.contains(id) => NodeState::Available,
            _ => NodeState::Locked,
        }
    }

    /// First node in traversal order that is unlocked and not completed.
    pub fn recommend_next(
        &self,
        forest: &[LearningNode],
        progress: &ProgressMap,
        unlocked: &HashSet<String>,
    ) -> Option<String> {
        FlatForest::new(forest)
            .iter()
            .find(|node| {
                unlocked.contains(&node.id)
                    && !progress.get(&node.id).is_some_and(|record| record.is_completed())
            })
            .map(|node| node.id.clone())
    }

    /// Status of every node in traversal order.
    pub fn node_states(
        &self,
        forest: &[LearningNode],
        progress: &ProgressMap,
    ) -> Vec<(String, NodeState)> {
        let unlocked = self.compute_unlocked(forest, progress);
        FlatForest::new(forest)
            .iter()
            .map(|node| (node.id.clone(), self.node_status(&node.id, progress, &unlocked)))
            .collect()
    }

    pub fn summarize(&self, forest: &[LearningNode], progress: &ProgressMap) -> OutlineSummary {
        let mut summary = OutlineSummary::default();
        for (_, state) in self.node_states(forest, progress) {
            summary.total += 1;
            match state {
                NodeState::Completed => summary.completed += 1,
                NodeState::InProgress => summary.in_progress += 1,
                NodeState::Available => summary.available += 1,
                NodeState::Locked => summary.locked += 1,
            }
        }
        if summary.total > 0 {
            let percent = summary.completed * 100 / summary.total;
            summary.percent_complete = u8::try_from(percent).unwrap_or(100);
        }
        summary
    }

    /// Structural checks: unique ids, no self or cyclic prerequisites.
    ///
    /// Unknown prerequisite ids are reported rather than rejected.
    pub fn validate(&self, forest: &[LearningNode]) -> DomainResult<ForestReport> {
        let flat = FlatForest::new(forest);

        let mut seen = HashSet::with_capacity(flat.len());
        for node in flat.iter() {
            if !seen.insert(node.id.as_str()) {
                return Err(DomainError::DuplicateNode(node.id.clone()));
            }
            if node.prerequisites.contains(&node.id) {
                return Err(DomainError::SelfPrerequisite(node.id.clone()));
            }
        }

        if let Some(cycle) = self.detect_cycle(forest) {
            return Err(DomainError::PrerequisiteCycle(cycle));
        }

        let mut unknown_prerequisites = Vec::new();
        for node in flat.iter() {
            for prerequisite in &node.prerequisites {
                if flat.contains(prerequisite) {
                    continue;
                }
                warn!(
                    node = %node.id,
                    %prerequisite,
                    "prerequisite names no node in the outline; node stays locked"
                );
                unknown_prerequisites.push(UnknownPrerequisite {
                    node: node.id.clone(),
                    prerequisite: prerequisite.clone(),
                });
            }
        }

        Ok(ForestReport {
            node_count: flat.len(),
            unknown_prerequisites,
        })
    }

    /// Detect a prerequisite cycle, returning the ids along it.
    pub fn detect_cycle(&self, forest: &[LearningNode]) -> Option<Vec<String>> {
        let flat = FlatForest::new(forest);
        let prerequisites: HashMap<&str, Vec<&str>> = flat
            .iter()
            .map(|node| {
                let edges = node.prerequisites.iter().map(String::as_str).collect();
                (node.id.as_str(), edges)
            })
            .collect();

        let mut cleared = HashSet::new();
        let mut trail = Vec::new();

        // Forest order keeps the reported loop stable
        for node in flat.iter() {
            if find_prerequisite_loop(node.id.as_str(), &prerequisites, &mut cleared, &mut trail) {
                return Some(trail.into_iter().map(ToString::to_string).collect());
            }
        }

        None
    }
}
