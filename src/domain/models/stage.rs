//! Journey stage model.
//!
//! The onboarding journey is a fixed sequence of eight stages. The user works
//! through them in order: `current_stage` is the one that must be finished to
//! progress, `viewing_stage` is the one on screen. The two differ while a
//! completed stage is being reviewed or the next one is being previewed.
//!
//! All guards here are pure functions of the state plus an [`Access`]
//! capability. Transitions return `false` instead of failing when a guard
//! rejects them.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Number of stages in the journey.
pub const STAGE_COUNT: u8 = 8;

/// Identifier of a journey stage, always within `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StageId(u8);

impl StageId {
    pub const FIRST: Self = Self(1);
    pub const LAST: Self = Self(STAGE_COUNT);

    pub const fn new(value: u8) -> Option<Self> {
        if value >= 1 && value <= STAGE_COUNT {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// The stage after this one, or `None` for the last stage.
    pub const fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    /// All stages in journey order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=STAGE_COUNT).map(Self)
    }

    /// Display title used for stage trophies and CLI output.
    pub const fn title(self) -> &'static str {
        match self.0 {
            1 => "Welcome Aboard",
            2 => "Company Culture",
            3 => "Tools & Access",
            4 => "Meet the Team",
            5 => "Product Deep Dive",
            6 => "Ways of Working",
            7 => "First Contribution",
            _ => "Graduation",
        }
    }
}

impl TryFrom<u8> for StageId {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(DomainError::InvalidStage(value))
    }
}

impl From<StageId> for u8 {
    fn from(stage: StageId) -> Self {
        stage.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StageId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| DomainError::InvalidStageInput(s.to_string()))
    }
}

/// Relationship between the displayed stage and the live stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    /// Viewing the stage the user is progressing through
    Current,
    /// Reviewing an earlier, completed stage
    PreviewBack,
    /// Looking ahead at the next stage
    PeekForward,
}

impl Default for ViewMode {
    fn default() -> Self {
        Self::Current
    }
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::PreviewBack => "preview-back",
            Self::PeekForward => "peek-forward",
        }
    }
}

/// Per-stage metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMeta {
    pub completed: bool,
    pub can_edit: bool,
}

/// Elevated-privilege capability consulted by every guard.
///
/// Supplied by the caller; the engine never decides who is elevated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Access {
    #[default]
    Standard,
    /// Bypasses every progression guard
    Elevated,
}

impl Access {
    pub const fn from_flag(elevated: bool) -> Self {
        if elevated {
            Self::Elevated
        } else {
            Self::Standard
        }
    }

    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::Elevated)
    }
}

/// Full state of the stage journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyState {
    /// Stage the user must finish to progress
    pub current_stage: StageId,
    /// Stage currently displayed
    pub viewing_stage: StageId,
    pub view_mode: ViewMode,
    /// Membership only; order carries no meaning
    pub completed_stages: HashSet<StageId>,
    pub stage_data: BTreeMap<StageId, StageMeta>,
}

impl Default for JourneyState {
    fn default() -> Self {
        let stage_data = StageId::all()
            .map(|stage| {
                let meta = StageMeta {
                    completed: false,
                    can_edit: stage == StageId::FIRST,
                };
                (stage, meta)
            })
            .collect();

        Self {
            current_stage: StageId::FIRST,
            viewing_stage: StageId::FIRST,
            view_mode: ViewMode::Current,
            completed_stages: HashSet::new(),
            stage_data,
        }
    }
}

impl JourneyState {
    /// Metadata for a stage; a missing entry reads as the default.
    pub fn meta(&self, stage: StageId) -> StageMeta {
        self.stage_data.get(&stage).copied().unwrap_or_default()
    }

    pub fn is_stage_completed(&self, stage: StageId) -> bool {
        self.completed_stages.contains(&stage)
    }

    /// `StageId` already bounds the current stage to `1..=8`.
    pub fn can_advance(&self, access: Access) -> bool {
        access.is_elevated()
            || (self.view_mode == ViewMode::Current && self.meta(self.current_stage).can_edit)
    }

    pub fn can_go_to(&self, stage: StageId, access: Access) -> bool {
        access.is_elevated() || stage == self.current_stage || self.is_stage_completed(stage)
    }

    pub fn can_preview_back(&self, stage: StageId, access: Access) -> bool {
        access.is_elevated() || (self.is_stage_completed(stage) && stage < self.current_stage)
    }

    pub fn can_peek_next(&self, access: Access) -> bool {
        access.is_elevated()
            || (self.current_stage.next().is_some()
                && self.is_stage_completed(self.current_stage)
                && self.view_mode == ViewMode::Current)
    }

    pub fn is_stage_editable(&self, stage: StageId, access: Access) -> bool {
        access.is_elevated()
            || (self.view_mode == ViewMode::Current
                && self.viewing_stage == stage
                && self.meta(stage).can_edit)
    }

    /// Display `stage`. Returns `false` (and leaves the state alone) when the
    /// guard rejects it.
    pub fn go_to_stage(&mut self, stage: StageId, access: Access) -> bool {
        if !self.can_go_to(stage, access) {
            return false;
        }

        self.viewing_stage = stage;
        self.view_mode = if stage == self.current_stage {
            ViewMode::Current
        } else {
            ViewMode::PreviewBack
        };
        true
    }

    /// Finish the current stage and move to the next one if it exists.
    ///
    /// Unguarded: on the last stage this only re-records the completion.
    /// [`can_advance`](Self::can_advance) is what a UI consults before
    /// offering the action.
    pub fn complete_current_stage(&mut self) {
        let finished = self.current_stage;
        self.completed_stages.insert(finished);
        self.stage_data.insert(
            finished,
            StageMeta {
                completed: true,
                can_edit: false,
            },
        );

        if let Some(next) = finished.next() {
            self.current_stage = next;
            self.stage_data.entry(next).or_default().can_edit = true;
            self.viewing_stage = next;
            self.view_mode = ViewMode::Current;
        }
    }

    /// Look back at a completed stage or peek at the next one.
    ///
    /// Returns the resulting view mode, or `None` when neither is allowed.
    pub fn preview_stage(&mut self, stage: StageId, access: Access) -> Option<ViewMode> {
        let mode = if self.can_preview_back(stage, access) {
            ViewMode::PreviewBack
        } else if self.current_stage.next() == Some(stage) && self.can_peek_next(access) {
            ViewMode::PeekForward
        } else {
            return None;
        };

        self.viewing_stage = stage;
        self.view_mode = mode;
        Some(mode)
    }

    pub fn return_to_current(&mut self) {
        self.viewing_stage = self.current_stage;
        self.view_mode = ViewMode::Current;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Completed stages in ascending order.
    pub fn completed_sorted(&self) -> Vec<StageId> {
        let mut stages: Vec<StageId> = self.completed_stages.iter().copied().collect();
        stages.sort_unstable();
        stages
    }

    pub fn is_journey_complete(&self) -> bool {
        StageId::all().all(|stage| self.is_stage_completed(stage))
    }
}
