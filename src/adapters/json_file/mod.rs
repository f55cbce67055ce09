//! JSON file adapter.
//!
//! One versioned JSON document per record under `<data_dir>/<profile>/`:
//! `journey.json`, `ledger.json` and `nodes-<outline>.json`.

pub mod records;
pub mod store;

pub use records::{Envelope, JourneyRecord, LedgerRecord, RECORD_VERSION};
pub use store::JsonFileStore;
