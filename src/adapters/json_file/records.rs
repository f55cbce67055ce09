//! On-disk record layouts.
//!
//! Stored records are deliberately decoupled from the domain types: the
//! completed-stage set is written as a sorted list of plain integers and
//! rebuilt into a set on load, and the level is never written at all.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::{JourneyState, LedgerState, StageId, StageMeta, Trophy, ViewMode};

/// Current schema version for every record file.
pub const RECORD_VERSION: u32 = 1;

/// Versioned wrapper around each stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            version: RECORD_VERSION,
            saved_at: Utc::now(),
            data,
        }
    }
}

/// Stored form of [`JourneyState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyRecord {
    pub current_stage: u8,
    pub viewing_stage: u8,
    #[serde(default)]
    pub view_mode: ViewMode,
    /// Order is insignificant
    #[serde(default)]
    pub completed_stages: Vec<u8>,
    #[serde(default)]
    pub stage_data: BTreeMap<u8, StageMeta>,
}

impl From<&JourneyState> for JourneyRecord {
    fn from(state: &JourneyState) -> Self {
        Self {
            current_stage: state.current_stage.get(),
            viewing_stage: state.viewing_stage.get(),
            view_mode: state.view_mode,
            completed_stages: state
                .completed_sorted()
                .into_iter()
                .map(StageId::get)
                .collect(),
            stage_data: state
                .stage_data
                .iter()
                .map(|(stage, meta)| (stage.get(), *meta))
                .collect(),
        }
    }
}

fn stage_field(field: &str, value: u8) -> StoreResult<StageId> {
    StageId::new(value)
        .ok_or_else(|| StoreError::InvalidRecord(format!("{field} {value} is outside 1-8")))
}

impl JourneyRecord {
    /// Rehydrate the domain state.
    ///
    /// Duplicate completed ids collapse into the set; stages missing from
    /// `stage_data` get metadata consistent with the rest of the record.
    pub fn into_state(self) -> StoreResult<JourneyState> {
        let current_stage = stage_field("current_stage", self.current_stage)?;
        let viewing_stage = stage_field("viewing_stage", self.viewing_stage)?;

        let completed_stages = self
            .completed_stages
            .iter()
            .map(|&value| stage_field("completed stage", value))
            .collect::<StoreResult<HashSet<StageId>>>()?;

        let mut stage_data = BTreeMap::new();
        for (value, meta) in self.stage_data {
            stage_data.insert(stage_field("stage_data key", value)?, meta);
        }
        for stage in StageId::all() {
            stage_data.entry(stage).or_insert_with(|| {
                let completed = completed_stages.contains(&stage);
                StageMeta {
                    completed,
                    can_edit: stage == current_stage && !completed,
                }
            });
        }

        Ok(JourneyState {
            current_stage,
            viewing_stage,
            view_mode: self.view_mode,
            completed_stages,
            stage_data,
        })
    }
}

/// Stored form of [`LedgerState`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    #[serde(default)]
    pub current_xp: u64,
    #[serde(default)]
    pub trophies: Vec<Trophy>,
}

impl From<&LedgerState> for LedgerRecord {
    fn from(ledger: &LedgerState) -> Self {
        Self {
            current_xp: ledger.current_xp,
            trophies: ledger.trophies.clone(),
        }
    }
}

impl From<LedgerRecord> for LedgerState {
    fn from(record: LedgerRecord) -> Self {
        let mut ledger = Self {
            current_xp: record.current_xp,
            trophies: record.trophies,
        };
        ledger.dedupe();
        ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Access;

    fn stage(n: u8) -> StageId {
        StageId::new(n).unwrap()
    }

    #[test]
    fn test_completed_set_round_trip() {
        let mut state = JourneyState::default();
        state.completed_stages = [stage(7), stage(2), stage(4)].into_iter().collect();
        state.view_mode = ViewMode::PreviewBack;

        let record = JourneyRecord::from(&state);
        assert_eq!(record.completed_stages, vec![2, 4, 7]);

        let json = serde_json::to_string(&record).unwrap();
        let restored: JourneyRecord = serde_json::from_str(&json).unwrap();
        let restored = restored.into_state().unwrap();

        let expected: HashSet<StageId> = [stage(2), stage(4), stage(7)].into_iter().collect();
        assert_eq!(restored.completed_stages, expected);
        assert_eq!(restored.view_mode, ViewMode::PreviewBack);
        assert_eq!(restored, state);
    }

    #[test]
    fn test_duplicate_and_unordered_ids_collapse() {
        let record = JourneyRecord {
            current_stage: 3,
            viewing_stage: 3,
            view_mode: ViewMode::Current,
            completed_stages: vec![2, 1, 2],
            stage_data: BTreeMap::new(),
        };
        let state = record.into_state().unwrap();
        assert_eq!(state.completed_stages.len(), 2);
        assert!(state.meta(stage(1)).completed);
        assert!(state.meta(stage(3)).can_edit);
        assert!(!state.meta(stage(4)).can_edit);
        assert!(state.can_advance(Access::Standard));
    }

    #[test]
    fn test_out_of_range_stage_is_invalid() {
        let record = JourneyRecord {
            current_stage: 9,
            viewing_stage: 1,
            view_mode: ViewMode::Current,
            completed_stages: Vec::new(),
            stage_data: BTreeMap::new(),
        };
        assert!(matches!(
            record.into_state(),
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_stage_data_keys_serialize_as_strings() {
        let record = JourneyRecord::from(&JourneyState::default());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["stage_data"]["1"]["can_edit"], true);
        assert_eq!(json["view_mode"], "current");
    }

    #[test]
    fn test_ledger_record_dedupes_on_load() {
        let trophy = Trophy::for_stage(stage(1));
        let record = LedgerRecord {
            current_xp: 75,
            trophies: vec![trophy.clone(), trophy],
        };
        let ledger = LedgerState::from(record);
        assert_eq!(ledger.current_xp, 75);
        assert_eq!(ledger.trophies.len(), 1);
    }
}
