//! Shared setup for CLI commands.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::JsonFileStore;
use crate::domain::models::{validate_outline_id, Config, Outline};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{EngineSettings, JourneyEngine, UnlockResolver};

use super::output::action_warning;

/// Load configuration from `--config` or the project hierarchy; `--elevated`
/// forces elevated access on top of whatever the files say.
pub fn load_config(path: Option<&Path>, elevated: bool) -> Result<Config> {
    let mut config = match path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    if elevated {
        config.access.elevated = true;
    }
    Ok(config)
}

/// Engine over the configured profile directory.
pub fn open_engine(config: &Config) -> Result<JourneyEngine<JsonFileStore>> {
    let store = Arc::new(JsonFileStore::new(config.storage.profile_dir()));
    let settings = EngineSettings::from_config(config).context("Invalid progression settings")?;
    Ok(JourneyEngine::load(store, settings))
}

/// Read an outline from a YAML or JSON file, chosen by extension.
pub fn load_outline(path: &Path) -> Result<Outline> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read outline {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let outline: Outline = if is_json {
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid outline JSON in {}", path.display()))?
    } else {
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid outline YAML in {}", path.display()))?
    };

    validate_outline_id(&outline.id)?;
    UnlockResolver::new()
        .validate(&outline.nodes)
        .with_context(|| format!("Outline '{}' is malformed", outline.id))?;
    Ok(outline)
}

/// Report writes that failed during this command. Progress in memory was
/// still updated, so these are warnings rather than errors.
pub fn warn_unsaved(engine: &mut JourneyEngine<JsonFileStore>) {
    for notice in engine.drain_notices() {
        eprintln!("{}", action_warning(&notice.to_string()));
    }
}
