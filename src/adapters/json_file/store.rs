//! JSON file progress store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::{validate_outline_id, JourneyState, LedgerState, ProgressMap};
use crate::domain::ports::ProgressStore;

use super::records::{Envelope, JourneyRecord, LedgerRecord, RECORD_VERSION};

const JOURNEY_FILE: &str = "journey.json";
const LEDGER_FILE: &str = "ledger.json";

/// Stores each record as its own versioned JSON file under a profile
/// directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn node_file(outline_id: &str) -> StoreResult<String> {
        validate_outline_id(outline_id)
            .map_err(|err| StoreError::InvalidRecord(err.to_string()))?;
        Ok(format!("nodes-{outline_id}.json"))
    }

    fn read_record<T: DeserializeOwned>(&self, file: &str) -> StoreResult<Option<T>> {
        let path = self.root.join(file);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::io(path, err)),
        };

        let envelope: Envelope<serde_json::Value> = serde_json::from_str(&text)?;
        if envelope.version != RECORD_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: envelope.version,
                expected: RECORD_VERSION,
            });
        }
        Ok(Some(serde_json::from_value(envelope.data)?))
    }

    fn write_record<T: Serialize>(&self, file: &str, data: T) -> StoreResult<()> {
        let path = self.root.join(file);
        let text = serde_json::to_string_pretty(&Envelope::new(data))?;
        write_text_atomic(&path, &text).map_err(|err| StoreError::io(&path, err))?;
        debug!(path = %path.display(), "record written");
        Ok(())
    }
}

impl ProgressStore for JsonFileStore {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn load_journey(&self) -> StoreResult<Option<JourneyState>> {
        self.read_record::<JourneyRecord>(JOURNEY_FILE)?
            .map(JourneyRecord::into_state)
            .transpose()
    }

    fn save_journey(&self, state: &JourneyState) -> StoreResult<()> {
        self.write_record(JOURNEY_FILE, JourneyRecord::from(state))
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn load_ledger(&self) -> StoreResult<Option<LedgerState>> {
        Ok(self
            .read_record::<LedgerRecord>(LEDGER_FILE)?
            .map(LedgerState::from))
    }

    fn save_ledger(&self, ledger: &LedgerState) -> StoreResult<()> {
        self.write_record(LEDGER_FILE, LedgerRecord::from(ledger))
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn load_node_progress(&self, outline_id: &str) -> StoreResult<Option<ProgressMap>> {
        self.read_record(&Self::node_file(outline_id)?)
    }

    fn save_node_progress(&self, outline_id: &str, progress: &ProgressMap) -> StoreResult<()> {
        self.write_record(&Self::node_file(outline_id)?, progress)
    }
}

/// Write through a sibling temp file and rename it into place.
fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text)?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("record.json");
    path.with_file_name(format!("{file_name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{NodeProgress, ProgressStatus, StageId, Trophy, ViewMode};
    use tempfile::TempDir;

    fn store() -> (TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("profile"));
        (dir, store)
    }

    #[test]
    fn test_missing_records_load_as_none() {
        let (_dir, store) = store();
        assert!(store.load_journey().unwrap().is_none());
        assert!(store.load_ledger().unwrap().is_none());
        assert!(store.load_node_progress("guided").unwrap().is_none());
    }

    #[test]
    fn test_journey_round_trip_creates_directory() {
        let (_dir, store) = store();
        let mut state = JourneyState::default();
        state.completed_stages.insert(StageId::FIRST);
        state.view_mode = ViewMode::PreviewBack;

        store.save_journey(&state).unwrap();
        assert!(store.root().join(JOURNEY_FILE).exists());
        assert!(!store.root().join("journey.json.tmp").exists());
        assert_eq!(store.load_journey().unwrap(), Some(state));
    }

    #[test]
    fn test_ledger_file_has_no_level() {
        let (_dir, store) = store();
        let ledger = LedgerState {
            current_xp: 120,
            trophies: vec![Trophy::for_stage(StageId::FIRST)],
        };
        store.save_ledger(&ledger).unwrap();

        let text = fs::read_to_string(store.root().join(LEDGER_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["data"]["current_xp"], 120);
        assert!(json["data"].get("level").is_none());
        assert_eq!(store.load_ledger().unwrap(), Some(ledger));
    }

    #[test]
    fn test_node_progress_per_outline() {
        let (_dir, store) = store();
        let mut progress = ProgressMap::new();
        let mut record = NodeProgress::new();
        record.transition_to(ProgressStatus::Completed, chrono::Utc::now());
        progress.insert("intro".to_string(), record);

        store.save_node_progress("guided", &progress).unwrap();
        assert_eq!(store.load_node_progress("guided").unwrap(), Some(progress));
        assert!(store.load_node_progress("map-3d").unwrap().is_none());
    }

    #[test]
    fn test_rejects_unsafe_outline_id() {
        let (_dir, store) = store();
        assert!(store.load_node_progress("../escape").is_err());
        assert!(store.save_node_progress("a/b", &ProgressMap::new()).is_err());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let (_dir, store) = store();
        fs::create_dir_all(store.root()).unwrap();
        fs::write(store.root().join(JOURNEY_FILE), "{ not json").unwrap();
        assert!(matches!(
            store.load_journey(),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_unknown_version_is_an_error() {
        let (_dir, store) = store();
        fs::create_dir_all(store.root()).unwrap();
        fs::write(
            store.root().join(LEDGER_FILE),
            r#"{"version": 2, "saved_at": "2024-01-01T00:00:00Z", "data": {"current_xp": 5}}"#,
        )
        .unwrap();
        assert!(matches!(
            store.load_ledger(),
            Err(StoreError::UnsupportedVersion { found: 2, .. })
        ));
    }
}
