//! XP, level and trophy ledger service.
//!
//! Every grant is additive and every award is idempotent by trophy id, so the
//! same UI event delivered twice can never double-count.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::models::{
    default_medals, Award, LedgerState, Level, LevelTable, MedalRule, Rarity, RewardsConfig,
    StageId, Trophy, XpGain, XpProgress, XpSource,
};
use crate::domain::ports::{recover, ProgressStore};

use super::outcome::PersistenceNotice;

const RECORD: &str = "ledger";

pub struct ProgressionLedger<S: ProgressStore> {
    store: Arc<S>,
    state: LedgerState,
    levels: LevelTable,
    rewards: RewardsConfig,
    medals: Vec<MedalRule>,
    unsaved: Option<PersistenceNotice>,
}

impl<S: ProgressStore> ProgressionLedger<S> {
    /// Load the ledger from `store`, falling back to zero XP and no trophies.
    pub fn load(store: Arc<S>, levels: LevelTable, rewards: RewardsConfig) -> Self {
        let state = recover(RECORD, store.load_ledger());
        debug!(
            xp = state.current_xp,
            trophies = state.trophies.len(),
            "ledger loaded"
        );
        Self {
            store,
            state,
            levels,
            rewards,
            medals: default_medals(),
            unsaved: None,
        }
    }

    /// Replace the medal rules.
    pub fn with_medals(mut self, medals: Vec<MedalRule>) -> Self {
        self.medals = medals;
        self
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn rewards(&self) -> &RewardsConfig {
        &self.rewards
    }

    pub fn current_xp(&self) -> u64 {
        self.state.current_xp
    }

    pub fn trophies(&self) -> &[Trophy] {
        &self.state.trophies
    }

    pub fn trophy_count(&self) -> usize {
        self.state.trophies.len()
    }

    /// Always derived from the current XP.
    pub fn current_level_index(&self) -> usize {
        self.levels.level_index(self.state.current_xp)
    }

    pub fn current_level(&self) -> Level {
        self.levels.level(self.state.current_xp)
    }

    pub fn xp_progress(&self) -> XpProgress {
        self.levels.progress(self.state.current_xp)
    }

    /// Add XP. A zero amount is ignored and nothing is written.
    pub fn add_xp(&mut self, amount: u64) -> XpGain {
        if amount == 0 {
            let level = self.current_level_index();
            return XpGain {
                amount: 0,
                total_xp: self.state.current_xp,
                leveled_up: false,
                previous_level: level,
                new_level: level,
            };
        }

        let gain = self.state.add_xp(amount, &self.levels);
        if gain.leveled_up {
            info!(
                amount,
                total = gain.total_xp,
                from = gain.previous_level,
                to = gain.new_level,
                "level up"
            );
        } else {
            debug!(amount, total = gain.total_xp, "xp added");
        }
        self.persist();
        gain
    }

    /// Add the configured amount for `source`.
    pub fn add_xp_for(&mut self, source: XpSource) -> XpGain {
        let amount = self.rewards.amount_for(source);
        debug!(source = source.as_str(), amount, "xp reward");
        self.add_xp(amount)
    }

    /// Award the trophy for `stage`, or return the one already held.
    pub fn award_trophy(&mut self, stage: StageId) -> Award {
        self.award(Trophy::for_stage(stage))
    }

    /// Award a learning-unit trophy, keyed by unit id.
    pub fn award_unit_trophy(&mut self, unit_id: &str, title: &str, rarity: Rarity) -> Award {
        self.award(Trophy::for_unit(unit_id, title, rarity))
    }

    /// Issue every medal whose condition now holds and that is not yet held.
    ///
    /// Returns only the newly issued medals.
    pub fn check_for_medals(&mut self) -> Vec<Trophy> {
        let earned: Vec<Trophy> = self
            .medals
            .iter()
            .filter(|rule| !self.state.has_trophy(rule.id) && rule.condition.is_met(&self.state))
            .map(MedalRule::to_trophy)
            .collect();

        if earned.is_empty() {
            return earned;
        }

        for medal in &earned {
            info!(medal = %medal.id, "medal awarded");
            self.state.award(medal.clone());
        }
        self.persist();
        earned
    }

    fn award(&mut self, trophy: Trophy) -> Award {
        let award = self.state.award(trophy);
        if award.is_new {
            info!(trophy = %award.trophy.id, "trophy awarded");
            self.persist();
        } else {
            debug!(trophy = %award.trophy.id, "trophy already held");
        }
        award
    }

    pub fn take_notice(&mut self) -> Option<PersistenceNotice> {
        self.unsaved.take()
    }

    fn persist(&mut self) {
        match self.store.save_ledger(&self.state) {
            Ok(()) => self.unsaved = None,
            Err(error) => {
                warn!(record = RECORD, %error, "ledger not saved; keeping in-memory state");
                self.unsaved = Some(PersistenceNotice {
                    record: RECORD.to_string(),
                    error,
                });
            }
        }
    }
}
