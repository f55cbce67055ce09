//! Journey - onboarding progression engine
//!
//! Tracks a new hire's path through an eight-stage onboarding journey,
//! resolves which learning nodes are unlocked by their prerequisites, and
//! keeps an XP / level / trophy ledger. All state survives restarts through a
//! pluggable [`ProgressStore`].
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, pure guards and the storage port
//! - **Service Layer** (`services`): stage machine, unlock resolver,
//!   progression ledger, node progress and the [`JourneyEngine`] facade
//! - **Adapters** (`adapters`): JSON-file and in-memory stores
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use journey::{EngineSettings, InMemoryStore, JourneyEngine};
//!
//! let mut engine = JourneyEngine::load(Arc::new(InMemoryStore::new()), EngineSettings::default());
//! let result = engine.complete_stage();
//! assert!(result.trophy.is_new);
//! assert_eq!(engine.ledger().current_xp(), 50);
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::{InMemoryStore, JsonFileStore};
pub use domain::models::{
    Access, Config, JourneyState, LearningNode, LedgerState, LevelTable, NodeState, Outline,
    ProgressStatus, StageId, Trophy, ViewMode, XpSource,
};
pub use domain::ports::{NullProgressStore, ProgressStore};
pub use domain::{DomainError, DomainResult, StoreError, StoreResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    EngineSettings, JourneyEngine, NodeProgressBook, ProgressionLedger, StageMachine, Transition,
    UnlockResolver,
};
