use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project config, created by `journey init`
pub const PROJECT_CONFIG: &str = ".journey/config.yaml";

/// Optional local overrides
pub const LOCAL_CONFIG: &str = ".journey/local.yaml";

pub const ENV_PREFIX: &str = "JOURNEY_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Storage data_dir cannot be empty")]
    EmptyDataDir,

    #[error("Invalid profile: {0:?}. Use letters, digits, '-' or '_'")]
    InvalidProfile(String),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid level table: {0}")]
    InvalidLevelTable(String),

    #[error("Invalid reward for {0}: must be greater than 0")]
    ZeroReward(&'static str),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .journey/config.yaml
    /// 3. .journey/local.yaml (optional)
    /// 4. Environment variables (JOURNEY_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment(&[Path::new(PROJECT_CONFIG), Path::new(LOCAL_CONFIG)])
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Self::figment(&[path])
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment(files: &[&Path]) -> Figment {
        let figment = files.iter().fold(
            Figment::new().merge(Serialized::defaults(Config::default())),
            |figment, file| figment.merge(Yaml::file(file)),
        );
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.storage.data_dir.trim().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }

        let profile = &config.storage.profile;
        if profile.is_empty()
            || !profile
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::InvalidProfile(profile.clone()));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        config
            .progression
            .level_table()
            .map_err(|e| ConfigError::InvalidLevelTable(e.to_string()))?;

        let rewards = &config.progression.rewards;
        for (name, amount) in [
            ("quiz", rewards.quiz),
            ("task", rewards.task),
            ("curiosity", rewards.curiosity),
            ("node", rewards.node),
            ("stage", rewards.stage),
        ] {
            if amount == 0 {
                return Err(ConfigError::ZeroReward(name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.data_dir, ".journey");
        assert_eq!(config.storage.profile, "default");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.progression.xp_thresholds, vec![0, 50, 150, 300, 500, 800]);
        assert_eq!(config.progression.rewards.stage, 50);
        assert!(!config.access.elevated);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
storage:
  data_dir: /var/lib/journey
  profile: alice
logging:
  level: debug
  format: json
progression:
  xp_thresholds: [0, 100, 250]
  level_names: [Rookie, Regular, Veteran]
  rewards:
    quiz: 30
access:
  elevated: true
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.storage.profile, "alice");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.rotation, "daily");
        assert_eq!(config.progression.level_names.len(), 3);
        assert_eq!(config.progression.rewards.quiz, 30);
        assert_eq!(config.progression.rewards.task, 15);
        assert!(config.access.elevated);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_empty_data_dir() {
        let mut config = Config::default();
        config.storage.data_dir = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDataDir)
        ));
    }

    #[test]
    fn test_validate_profile_with_separator() {
        let mut config = Config::default();
        config.storage.profile = "../other".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(format)) if format == "xml"
        ));
    }

    #[test]
    fn test_validate_invalid_rotation() {
        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRotation(_))
        ));
    }

    #[test]
    fn test_validate_level_table() {
        let mut config = Config::default();
        config.progression.xp_thresholds = vec![0, 100, 100, 200, 300, 400];
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLevelTable(_))
        ));

        let mut config = Config::default();
        config.progression.level_names.pop();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLevelTable(_))
        ));
    }

    #[test]
    fn test_validate_zero_reward() {
        let mut config = Config::default();
        config.progression.rewards.curiosity = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ZeroReward("curiosity"))
        ));
    }

    #[test]
    fn test_hierarchical_merging() {
        let base_file = yaml_file("storage:\n  profile: team\nlogging:\n  level: info\n  format: json\n");
        let override_file = yaml_file("logging:\n  level: debug\n");

        let config: Config = ConfigLoader::figment(&[base_file.path(), override_file.path()])
            .extract()
            .unwrap();

        assert_eq!(config.logging.level, "debug", "Override should win");
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
        assert_eq!(config.storage.profile, "team");
        assert_eq!(config.storage.data_dir, ".journey");
    }

    #[test]
    fn test_env_override() {
        let file = yaml_file("logging:\n  level: info\n");
        temp_env::with_vars(
            [
                ("JOURNEY_LOGGING__LEVEL", Some("trace")),
                ("JOURNEY_ACCESS__ELEVATED", Some("true")),
                ("JOURNEY_PROGRESSION__REWARDS__NODE", Some("25")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).unwrap();
                assert_eq!(config.logging.level, "trace");
                assert!(config.access.elevated);
                assert_eq!(config.progression.rewards.node, 25);
            },
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(ConfigLoader::load_from_file("/nonexistent/journey.yaml").is_err());
    }
}
