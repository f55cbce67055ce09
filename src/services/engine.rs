//! The journey engine: one constructed service object owning every piece of
//! progression state.
//!
//! Collaborators build an engine from a store and settings, pass it around
//! explicitly, and read snapshots back after each mutation. There is no
//! global instance.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Access, Award, Config, LearningNode, LevelTable, NodeProgress, NodeState, RewardsConfig,
    StageId, Trophy, XpGain, XpSource,
};
use crate::domain::ports::ProgressStore;

use super::node_progress::NodeProgressBook;
use super::outcome::{PersistenceNotice, Transition};
use super::progression_ledger::ProgressionLedger;
use super::stage_machine::StageMachine;
use super::unlock_resolver::{FlatForest, OutlineSummary, UnlockResolver};

/// Settings the engine needs from configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub access: Access,
    pub levels: LevelTable,
    pub rewards: RewardsConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            access: Access::Standard,
            levels: LevelTable::default(),
            rewards: RewardsConfig::default(),
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> DomainResult<Self> {
        Ok(Self {
            access: config.access.access(),
            levels: config.progression.level_table()?,
            rewards: config.progression.rewards,
        })
    }
}

/// Everything that happened when a stage was completed.
#[derive(Debug, Clone, Serialize)]
pub struct StageCompletion {
    pub stage: StageId,
    /// Already-held trophies come back with `is_new == false`
    pub trophy: Award,
    pub xp: Option<XpGain>,
    pub medals: Vec<Trophy>,
}

/// Everything that happened when a node was completed.
#[derive(Debug, Clone, Serialize)]
pub struct NodeCompletion {
    pub node_id: String,
    pub applied: bool,
    pub xp: Option<XpGain>,
    /// Nodes that became available because of this completion
    pub newly_unlocked: Vec<String>,
}

/// Derived view of one outline.
#[derive(Debug, Clone, Serialize)]
pub struct OutlineView {
    pub outline_id: String,
    pub nodes: Vec<(String, NodeState)>,
    pub next: Option<String>,
    pub summary: OutlineSummary,
}

pub struct JourneyEngine<S: ProgressStore> {
    store: Arc<S>,
    stages: StageMachine<S>,
    ledger: ProgressionLedger<S>,
    outlines: HashMap<String, NodeProgressBook<S>>,
    resolver: UnlockResolver,
}

impl<S: ProgressStore> JourneyEngine<S> {
    /// Load every record from `store`; missing or unreadable records start
    /// from defaults.
    pub fn load(store: Arc<S>, settings: EngineSettings) -> Self {
        let stages = StageMachine::load(Arc::clone(&store), settings.access);
        let ledger = ProgressionLedger::load(Arc::clone(&store), settings.levels, settings.rewards);
        Self {
            store,
            stages,
            ledger,
            outlines: HashMap::new(),
            resolver: UnlockResolver::new(),
        }
    }

    pub fn stages(&self) -> &StageMachine<S> {
        &self.stages
    }

    pub fn stages_mut(&mut self) -> &mut StageMachine<S> {
        &mut self.stages
    }

    pub fn ledger(&self) -> &ProgressionLedger<S> {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ProgressionLedger<S> {
        &mut self.ledger
    }

    pub fn resolver(&self) -> &UnlockResolver {
        &self.resolver
    }

    pub fn set_access(&mut self, access: Access) {
        self.stages.set_access(access);
    }

    /// Progress book for `outline_id`, loaded on first use.
    pub fn outline(&mut self, outline_id: &str) -> DomainResult<&mut NodeProgressBook<S>> {
        match self.outlines.entry(outline_id.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let book = NodeProgressBook::load(Arc::clone(&self.store), outline_id)?;
                Ok(entry.insert(book))
            }
        }
    }

    /// Complete the current stage, then award its trophy, the stage XP bonus
    /// and any medals that became due.
    ///
    /// The XP bonus follows the trophy: it is granted only when the stage
    /// trophy is newly issued, so repeat completions pay nothing.
    pub fn complete_stage(&mut self) -> StageCompletion {
        let stage = self.stages.current_stage();
        self.stages.complete_current_stage();

        let trophy = self.ledger.award_trophy(stage);
        let xp = trophy
            .is_new
            .then(|| self.ledger.add_xp_for(XpSource::Stage));
        let medals = self.ledger.check_for_medals();
        info!(%stage, new_trophy = trophy.is_new, medals = medals.len(), "stage rewards settled");

        StageCompletion {
            stage,
            trophy,
            xp,
            medals,
        }
    }

    /// Complete a node of `forest` and grant node XP on its first completion.
    ///
    /// Locked nodes are rejected like any other guard. A node id that is not
    /// part of `forest` is a caller error.
    pub fn complete_node(
        &mut self,
        outline_id: &str,
        forest: &[LearningNode],
        node_id: &str,
    ) -> DomainResult<NodeCompletion> {
        if !FlatForest::new(forest).contains(node_id) {
            return Err(DomainError::NodeNotFound(node_id.to_string()));
        }

        let resolver = self.resolver.clone();
        let book = self.outline(outline_id)?;
        let before = resolver.compute_unlocked(forest, book.progress());
        if !before.contains(node_id) {
            return Ok(NodeCompletion {
                node_id: node_id.to_string(),
                applied: false,
                xp: None,
                newly_unlocked: Vec::new(),
            });
        }

        let transition = book.complete(node_id);
        let after = resolver.compute_unlocked(forest, book.progress());
        let newly_unlocked = FlatForest::new(forest)
            .iter()
            .filter(|node| after.contains(&node.id) && !before.contains(&node.id))
            .map(|node| node.id.clone())
            .collect();

        let xp = transition
            .is_applied()
            .then(|| self.ledger.add_xp_for(XpSource::Node));

        Ok(NodeCompletion {
            node_id: node_id.to_string(),
            applied: transition.is_applied(),
            xp,
            newly_unlocked,
        })
    }

    /// Record a visit. Locked nodes can be visited.
    pub fn visit_node(
        &mut self,
        outline_id: &str,
        forest: &[LearningNode],
        node_id: &str,
    ) -> DomainResult<NodeProgress> {
        if !FlatForest::new(forest).contains(node_id) {
            return Err(DomainError::NodeNotFound(node_id.to_string()));
        }
        Ok(self.outline(outline_id)?.visit(node_id))
    }

    /// Start a node if it is unlocked.
    pub fn start_node(
        &mut self,
        outline_id: &str,
        forest: &[LearningNode],
        node_id: &str,
    ) -> DomainResult<Transition> {
        if !FlatForest::new(forest).contains(node_id) {
            return Err(DomainError::NodeNotFound(node_id.to_string()));
        }
        let resolver = self.resolver.clone();
        let book = self.outline(outline_id)?;
        if !resolver.compute_unlocked(forest, book.progress()).contains(node_id) {
            return Ok(Transition::Rejected);
        }
        Ok(book.start(node_id))
    }

    /// Statuses, recommendation and summary for an outline.
    pub fn outline_view(
        &mut self,
        outline_id: &str,
        forest: &[LearningNode],
    ) -> DomainResult<OutlineView> {
        let resolver = self.resolver.clone();
        let book = self.outline(outline_id)?;
        let progress = book.progress();
        let unlocked = resolver.compute_unlocked(forest, progress);

        Ok(OutlineView {
            outline_id: outline_id.to_string(),
            nodes: resolver.node_states(forest, progress),
            next: resolver.recommend_next(forest, progress, &unlocked),
            summary: resolver.summarize(forest, progress),
        })
    }

    pub fn reset_journey(&mut self) -> Transition {
        self.stages.reset_journey()
    }

    /// Collect pending persistence failures from every component.
    pub fn drain_notices(&mut self) -> Vec<PersistenceNotice> {
        let mut notices: Vec<PersistenceNotice> = self
            .stages
            .take_notice()
            .into_iter()
            .chain(self.ledger.take_notice())
            .collect();
        notices.extend(self.outlines.values_mut().filter_map(NodeProgressBook::take_notice));
        notices
    }
}
