//! Change detection across runs
//!
//! A unit is valid only when its current fingerprint equals the one recorded
//! after the last successful check. Nothing is recorded until the caller
//! commits, so a failed run leaves every checked unit invalid.

pub mod fingerprint;
pub mod store;
pub mod tracker;

pub use fingerprint::{Fingerprint, Fingerprinter};
pub use store::{InvalidationStore, JsonFileStore, MemoryStore};
pub use tracker::{InvalidationResult, InvalidationTracker, VersionedUnit};
