pub mod config;
pub mod ledger;
pub mod node;
pub mod stage;

pub use config::{AccessConfig, Config, LoggingConfig, ProgressionConfig, RewardsConfig, StorageConfig};
pub use ledger::{
    default_medals, Award, LedgerState, Level, LevelTable, MedalCondition, MedalRule, Rarity,
    Trophy, TrophyKind, XpGain, XpProgress, XpSource,
};
pub use node::{
    validate_outline_id, LearningNode, NodeProgress, NodeState, Outline, ProgressMap,
    ProgressStatus,
};
pub use stage::{Access, JourneyState, StageId, StageMeta, ViewMode, STAGE_COUNT};
