//! XP, level and trophy model.
//!
//! The ledger only ever grows: XP is a monotonic counter and trophies are
//! appended once per id. The level is never stored; it is read off the
//! [`LevelTable`] from the current XP every time it is needed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::stage::StageId;

/// Default cumulative-XP cutoffs, one per level.
pub const DEFAULT_XP_THRESHOLDS: [u64; 6] = [0, 50, 150, 300, 500, 800];

/// Default level names, lowest first.
pub const DEFAULT_LEVEL_NAMES: [&str; 6] = [
    "Newcomer",
    "Explorer",
    "Contributor",
    "Navigator",
    "Trailblazer",
    "Luminary",
];

/// A resolved level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Level {
    pub index: usize,
    pub name: String,
    /// XP at which this level starts
    pub threshold: u64,
}

/// Ordered level names paired with their XP thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTable {
    names: Vec<String>,
    thresholds: Vec<u64>,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            names: DEFAULT_LEVEL_NAMES.iter().map(ToString::to_string).collect(),
            thresholds: DEFAULT_XP_THRESHOLDS.to_vec(),
        }
    }
}

impl LevelTable {
    /// Build a table. Thresholds must start at 0, be strictly ascending and
    /// pair one-to-one with the names.
    pub fn new(names: Vec<String>, thresholds: Vec<u64>) -> DomainResult<Self> {
        if names.is_empty() {
            return Err(DomainError::InvalidLevelTable(
                "at least one level is required".to_string(),
            ));
        }
        if names.len() != thresholds.len() {
            return Err(DomainError::InvalidLevelTable(format!(
                "{} level names but {} thresholds",
                names.len(),
                thresholds.len()
            )));
        }
        if thresholds[0] != 0 {
            return Err(DomainError::InvalidLevelTable(
                "first threshold must be 0".to_string(),
            ));
        }
        if thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(DomainError::InvalidLevelTable(
                "thresholds must be strictly ascending".to_string(),
            ));
        }
        Ok(Self { names, thresholds })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn thresholds(&self) -> &[u64] {
        &self.thresholds
    }

    pub fn max_index(&self) -> usize {
        self.len() - 1
    }

    /// Index of the highest level whose threshold `xp` has reached.
    pub fn level_index(&self, xp: u64) -> usize {
        self.thresholds
            .partition_point(|&threshold| threshold <= xp)
            .saturating_sub(1)
    }

    pub fn level(&self, xp: u64) -> Level {
        let index = self.level_index(xp);
        Level {
            index,
            name: self.names[index].clone(),
            threshold: self.thresholds[index],
        }
    }

    /// Progress through the level `xp` falls in.
    ///
    /// At the final level there is no next threshold: `current` and `max` are
    /// both the XP earned past the last threshold and the percentage is 100.
    pub fn progress(&self, xp: u64) -> XpProgress {
        let index = self.level_index(xp);
        let floor = self.thresholds[index];
        let current = xp - floor;

        match self.thresholds.get(index + 1) {
            Some(&ceiling) => {
                let max = ceiling - floor;
                let percentage = (current.saturating_mul(100) / max).min(100);
                XpProgress {
                    current,
                    max,
                    percentage: u8::try_from(percentage).unwrap_or(100),
                    maxed: false,
                }
            }
            None => XpProgress {
                current,
                max: current,
                percentage: 100,
                maxed: true,
            },
        }
    }
}

/// Position inside the current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XpProgress {
    /// XP earned since the current level's threshold
    pub current: u64,
    /// Span to the next threshold (equal to `current` at the final level)
    pub max: u64,
    /// Whole percent through the span, within 0..=100
    pub percentage: u8,
    pub maxed: bool,
}

/// Result of an XP grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XpGain {
    pub amount: u64,
    pub total_xp: u64,
    pub leveled_up: bool,
    pub previous_level: usize,
    pub new_level: usize,
}

/// Where XP came from. Amounts are configured per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpSource {
    Quiz,
    Task,
    Curiosity,
    Node,
    Stage,
}

impl XpSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Task => "task",
            Self::Curiosity => "curiosity",
            Self::Node => "node",
            Self::Stage => "stage",
        }
    }
}

impl std::str::FromStr for XpSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quiz" => Ok(Self::Quiz),
            "task" => Ok(Self::Task),
            "curiosity" => Ok(Self::Curiosity),
            "node" => Ok(Self::Node),
            "stage" => Ok(Self::Stage),
            other => Err(DomainError::UnknownXpSource(other.to_string())),
        }
    }
}

/// Rarity of a unit trophy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rarity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "common" => Ok(Self::Common),
            "uncommon" => Ok(Self::Uncommon),
            "rare" => Ok(Self::Rare),
            "epic" => Ok(Self::Epic),
            "legendary" => Ok(Self::Legendary),
            other => Err(DomainError::UnknownRarity(other.to_string())),
        }
    }
}

/// What a trophy was awarded for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrophyKind {
    Stage,
    Unit { unit_id: String, rarity: Rarity },
    Medal,
}

/// An idempotently issued achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trophy {
    /// Source key; at most one trophy per id
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageId>,
    pub kind: TrophyKind,
    pub awarded_at: DateTime<Utc>,
}

impl Trophy {
    pub fn stage_key(stage: StageId) -> String {
        format!("stage-{stage}")
    }

    pub fn unit_key(unit_id: &str) -> String {
        format!("unit-{unit_id}")
    }

    pub fn for_stage(stage: StageId) -> Self {
        Self {
            id: Self::stage_key(stage),
            name: format!("{} Trophy", stage.title()),
            description: format!("Completed stage {stage}: {}", stage.title()),
            stage: Some(stage),
            kind: TrophyKind::Stage,
            awarded_at: Utc::now(),
        }
    }

    pub fn for_unit(unit_id: &str, title: &str, rarity: Rarity) -> Self {
        Self {
            id: Self::unit_key(unit_id),
            name: title.to_string(),
            description: format!("Mastered learning unit {unit_id}"),
            stage: None,
            kind: TrophyKind::Unit {
                unit_id: unit_id.to_string(),
                rarity,
            },
            awarded_at: Utc::now(),
        }
    }

    pub fn is_medal(&self) -> bool {
        matches!(self.kind, TrophyKind::Medal)
    }

    pub fn is_unit(&self) -> bool {
        matches!(self.kind, TrophyKind::Unit { .. })
    }
}

/// Outcome of a trophy request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Award {
    pub trophy: Trophy,
    /// `false` when the trophy was already held
    pub is_new: bool,
}

/// Persisted ledger state. Level is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    #[serde(default)]
    pub current_xp: u64,
    /// Insertion-ordered, unique by id
    #[serde(default)]
    pub trophies: Vec<Trophy>,
}

impl LedgerState {
    pub fn trophy(&self, id: &str) -> Option<&Trophy> {
        self.trophies.iter().find(|trophy| trophy.id == id)
    }

    pub fn has_trophy(&self, id: &str) -> bool {
        self.trophy(id).is_some()
    }

    /// Add XP and report level movement.
    pub fn add_xp(&mut self, amount: u64, levels: &LevelTable) -> XpGain {
        let previous_level = levels.level_index(self.current_xp);
        self.current_xp = self.current_xp.saturating_add(amount);
        let new_level = levels.level_index(self.current_xp);

        XpGain {
            amount,
            total_xp: self.current_xp,
            leveled_up: new_level > previous_level,
            previous_level,
            new_level,
        }
    }

    /// Append `trophy` unless one with the same id is already held.
    pub fn award(&mut self, trophy: Trophy) -> Award {
        if let Some(existing) = self.trophy(&trophy.id) {
            return Award {
                trophy: existing.clone(),
                is_new: false,
            };
        }
        self.trophies.push(trophy.clone());
        Award {
            trophy,
            is_new: true,
        }
    }

    /// Collapse duplicate ids, keeping the first occurrence.
    pub fn dedupe(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.trophies.retain(|trophy| seen.insert(trophy.id.clone()));
    }

    pub fn non_medal_count(&self) -> usize {
        self.trophies.iter().filter(|trophy| !trophy.is_medal()).count()
    }
}

/// Condition for a composite award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedalCondition {
    /// A trophy for every journey stage
    AllStages,
    /// At least this many non-medal trophies
    TrophyCount(usize),
    /// At least this many unit trophies
    UnitTrophyCount(usize),
}

impl MedalCondition {
    pub fn is_met(&self, ledger: &LedgerState) -> bool {
        match *self {
            Self::AllStages => {
                StageId::all().all(|stage| ledger.has_trophy(&Trophy::stage_key(stage)))
            }
            Self::TrophyCount(count) => ledger.non_medal_count() >= count,
            Self::UnitTrophyCount(count) => {
                ledger.trophies.iter().filter(|trophy| trophy.is_unit()).count() >= count
            }
        }
    }
}

/// A composite award definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedalRule {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub condition: MedalCondition,
}

impl MedalRule {
    pub fn to_trophy(&self) -> Trophy {
        Trophy {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            stage: None,
            kind: TrophyKind::Medal,
            awarded_at: Utc::now(),
        }
    }
}

/// Built-in medal rules.
pub fn default_medals() -> Vec<MedalRule> {
    vec![
        MedalRule {
            id: "medal-all-stages",
            name: "Journey Complete",
            description: "Earned a trophy for every stage of the journey",
            condition: MedalCondition::AllStages,
        },
        MedalRule {
            id: "medal-collector-5",
            name: "Collector",
            description: "Collected five trophies",
            condition: MedalCondition::TrophyCount(5),
        },
        MedalRule {
            id: "medal-collector-10",
            name: "Curator",
            description: "Collected ten trophies",
            condition: MedalCondition::TrophyCount(10),
        },
        MedalRule {
            id: "medal-unit-scholar",
            name: "Scholar",
            description: "Mastered three learning units",
            condition: MedalCondition::UnitTrophyCount(3),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_index_at_boundaries() {
        let levels = LevelTable::default();
        assert_eq!(levels.level_index(0), 0);
        assert_eq!(levels.level_index(49), 0);
        assert_eq!(levels.level_index(50), 1);
        assert_eq!(levels.level_index(299), 2);
        assert_eq!(levels.level_index(300), 3);
        assert_eq!(levels.level_index(800), 5);
        assert_eq!(levels.level_index(u64::MAX), 5);
        assert_eq!(levels.level(160).name, "Contributor");
    }

    #[test]
    fn test_level_table_validation() {
        let names = |n: usize| (0..n).map(|i| format!("L{i}")).collect::<Vec<_>>();
        assert!(LevelTable::new(names(3), vec![0, 10, 20]).is_ok());
        assert!(LevelTable::new(names(3), vec![5, 10, 20]).is_err());
        assert!(LevelTable::new(names(3), vec![0, 10, 10]).is_err());
        assert!(LevelTable::new(names(2), vec![0, 10, 20]).is_err());
        assert!(LevelTable::new(Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_progress_within_level() {
        let levels = LevelTable::default();
        let progress = levels.progress(100);
        assert_eq!(progress.current, 50);
        assert_eq!(progress.max, 100);
        assert_eq!(progress.percentage, 50);
        assert!(!progress.maxed);
    }

    #[test]
    fn test_progress_at_final_level() {
        let levels = LevelTable::default();
        let progress = levels.progress(950);
        assert_eq!(progress.current, 150);
        assert_eq!(progress.max, 150);
        assert_eq!(progress.percentage, 100);
        assert!(progress.maxed);
    }

    #[test]
    fn test_add_xp_reports_level_up() {
        let levels = LevelTable::default();
        let mut ledger = LedgerState::default();

        let gain = ledger.add_xp(30, &levels);
        assert!(!gain.leveled_up);

        let gain = ledger.add_xp(30, &levels);
        assert!(gain.leveled_up);
        assert_eq!(gain.previous_level, 0);
        assert_eq!(gain.new_level, 1);
        assert_eq!(gain.total_xp, 60);
    }

    #[test]
    fn test_award_is_idempotent() {
        let mut ledger = LedgerState::default();
        let stage = StageId::new(3).unwrap();

        let first = ledger.award(Trophy::for_stage(stage));
        let second = ledger.award(Trophy::for_stage(stage));

        assert!(first.is_new);
        assert!(!second.is_new);
        assert_eq!(first.trophy, second.trophy);
        assert_eq!(ledger.trophies.len(), 1);
    }

    #[test]
    fn test_medal_conditions() {
        let mut ledger = LedgerState::default();
        assert!(!MedalCondition::AllStages.is_met(&ledger));

        for stage in StageId::all() {
            ledger.award(Trophy::for_stage(stage));
        }
        assert!(MedalCondition::AllStages.is_met(&ledger));
        assert!(MedalCondition::TrophyCount(5).is_met(&ledger));
        assert!(!MedalCondition::TrophyCount(10).is_met(&ledger));
        assert!(!MedalCondition::UnitTrophyCount(1).is_met(&ledger));
    }

    #[test]
    fn test_trophy_kind_serialization() {
        let trophy = Trophy::for_unit("mlu-7", "Security Basics", Rarity::Epic);
        let json = serde_json::to_value(&trophy).unwrap();
        assert_eq!(json["id"], "unit-mlu-7");
        assert_eq!(json["kind"]["type"], "unit");
        assert_eq!(json["kind"]["rarity"], "epic");
        assert!(json.get("stage").is_none());
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let stage = StageId::FIRST;
        let mut ledger = LedgerState {
            current_xp: 0,
            trophies: vec![Trophy::for_stage(stage), Trophy::for_stage(stage)],
        };
        ledger.dedupe();
        assert_eq!(ledger.trophies.len(), 1);
    }
}
