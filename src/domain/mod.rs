//! Domain layer for the journey progression engine
//!
//! This module contains the core models, their pure guards, and the
//! persistence port.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, StoreError, StoreResult};
