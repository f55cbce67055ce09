//! Port trait definitions (Hexagonal Architecture)
//!
//! - ProgressStore: durable storage for journey, ledger and node progress
//!
//! The services depend only on this trait, so storage can be swapped for
//! tests or ephemeral sessions.

pub mod null_store;
pub mod progress_store;

pub use null_store::NullProgressStore;
pub use progress_store::{recover, ProgressStore};
