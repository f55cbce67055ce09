use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;
use crate::domain::models::ledger::{
    LevelTable, XpSource, DEFAULT_LEVEL_NAMES, DEFAULT_XP_THRESHOLDS,
};
use crate::domain::models::stage::Access;

/// Main configuration structure for the journey engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Where progress records are stored
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Levels and XP rewards
    #[serde(default)]
    pub progression: ProgressionConfig,

    /// Externally supplied privilege
    #[serde(default)]
    pub access: AccessConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    /// Root directory for all profiles
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Profile name; records live under `<data_dir>/<profile>/`
    #[serde(default = "default_profile")]
    pub profile: String,
}

fn default_data_dir() -> String {
    ".journey".to_string()
}

fn default_profile() -> String {
    "default".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            profile: default_profile(),
        }
    }
}

impl StorageConfig {
    pub fn profile_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(&self.profile)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Level table and reward amounts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProgressionConfig {
    /// Cumulative XP at which each level starts
    #[serde(default = "default_xp_thresholds")]
    pub xp_thresholds: Vec<u64>,

    /// Level names, lowest first; one per threshold
    #[serde(default = "default_level_names")]
    pub level_names: Vec<String>,

    /// XP granted per source
    #[serde(default)]
    pub rewards: RewardsConfig,
}

fn default_xp_thresholds() -> Vec<u64> {
    DEFAULT_XP_THRESHOLDS.to_vec()
}

fn default_level_names() -> Vec<String> {
    DEFAULT_LEVEL_NAMES.iter().map(ToString::to_string).collect()
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            xp_thresholds: default_xp_thresholds(),
            level_names: default_level_names(),
            rewards: RewardsConfig::default(),
        }
    }
}

impl ProgressionConfig {
    pub fn level_table(&self) -> DomainResult<LevelTable> {
        LevelTable::new(self.level_names.clone(), self.xp_thresholds.clone())
    }
}

/// XP amounts per reward source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RewardsConfig {
    #[serde(default = "default_quiz_xp")]
    pub quiz: u64,

    #[serde(default = "default_task_xp")]
    pub task: u64,

    #[serde(default = "default_curiosity_xp")]
    pub curiosity: u64,

    /// Granted on the first completion of a learning node
    #[serde(default = "default_node_xp")]
    pub node: u64,

    /// Granted once per completed stage
    #[serde(default = "default_stage_xp")]
    pub stage: u64,
}

const fn default_quiz_xp() -> u64 {
    20
}

const fn default_task_xp() -> u64 {
    15
}

const fn default_curiosity_xp() -> u64 {
    5
}

const fn default_node_xp() -> u64 {
    10
}

const fn default_stage_xp() -> u64 {
    50
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            quiz: default_quiz_xp(),
            task: default_task_xp(),
            curiosity: default_curiosity_xp(),
            node: default_node_xp(),
            stage: default_stage_xp(),
        }
    }
}

impl RewardsConfig {
    pub const fn amount_for(&self, source: XpSource) -> u64 {
        match source {
            XpSource::Quiz => self.quiz,
            XpSource::Task => self.task,
            XpSource::Curiosity => self.curiosity,
            XpSource::Node => self.node,
            XpSource::Stage => self.stage,
        }
    }
}

/// Access configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AccessConfig {
    /// Bypass every progression guard
    #[serde(default)]
    pub elevated: bool,
}

impl AccessConfig {
    pub const fn access(&self) -> Access {
        Access::from_flag(self.elevated)
    }
}
