pub mod engine;
pub mod node_progress;
pub mod outcome;
pub mod progression_ledger;
pub mod stage_machine;
pub mod unlock_resolver;

pub use engine::{EngineSettings, JourneyEngine, NodeCompletion, OutlineView, StageCompletion};
pub use node_progress::NodeProgressBook;
pub use outcome::{PersistenceNotice, Transition};
pub use progression_ledger::ProgressionLedger;
pub use stage_machine::StageMachine;
pub use unlock_resolver::{FlatForest, ForestReport, OutlineSummary, UnknownPrerequisite, UnlockResolver};
