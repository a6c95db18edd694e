use super::{Fingerprint, Fingerprinter, InvalidationStore};
use crate::error::ToolError;
use crate::graph::BuildUnit;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// A unit paired with the fingerprint computed when it was checked
#[derive(Debug, Clone)]
pub struct VersionedUnit {
    pub unit: Arc<dyn BuildUnit>,
    pub fingerprint: Fingerprint,
}

impl VersionedUnit {
    pub fn address(&self) -> &str {
        self.unit.address()
    }
}

/// Exhaustive, disjoint partition of the checked units
#[derive(Debug, Clone, Default)]
pub struct InvalidationResult {
    pub valid: Vec<VersionedUnit>,
    pub invalid: Vec<VersionedUnit>,
}

impl InvalidationResult {
    pub fn is_up_to_date(&self) -> bool {
        self.invalid.is_empty()
    }

    pub fn invalid_units(&self) -> Vec<Arc<dyn BuildUnit>> {
        self.invalid.iter().map(|vu| vu.unit.clone()).collect()
    }

    pub fn valid_addresses(&self) -> Vec<&str> {
        self.valid.iter().map(VersionedUnit::address).collect()
    }

    pub fn invalid_addresses(&self) -> Vec<&str> {
        self.invalid.iter().map(VersionedUnit::address).collect()
    }
}

/// Decides which units are stale relative to the last successful run
pub struct InvalidationTracker {
    store: Box<dyn InvalidationStore>,
    fingerprinter: Fingerprinter,
}

impl InvalidationTracker {
    pub fn new(store: Box<dyn InvalidationStore>, fingerprinter: Fingerprinter) -> Self {
        Self {
            store,
            fingerprinter,
        }
    }

    /// Partition `units` into valid and invalid, preserving input order.
    ///
    /// Units repeated by address are considered once. Has no side effects on
    /// the store.
    ///
    /// # Errors
    ///
    /// Store read failures and unreadable sources are fatal.
    pub fn check(&self, units: &[Arc<dyn BuildUnit>]) -> Result<InvalidationResult, ToolError> {
        let mut result = InvalidationResult::default();
        let mut seen = HashSet::new();

        for unit in units {
            if !seen.insert(unit.address().to_string()) {
                continue;
            }

            let fingerprint = self.fingerprinter.fingerprint(unit.as_ref())?;
            let recorded = self.store.recorded(unit.address())?;
            let versioned = VersionedUnit {
                unit: unit.clone(),
                fingerprint,
            };

            match recorded {
                Some(previous) if previous == versioned.fingerprint => {
                    debug!(target_address = unit.address(), "Unchanged since last check");
                    result.valid.push(versioned);
                }
                Some(previous) => {
                    debug!(
                        target_address = unit.address(),
                        previous = previous.short(),
                        current = versioned.fingerprint.short(),
                        "Fingerprint changed"
                    );
                    result.invalid.push(versioned);
                }
                None => {
                    debug!(target_address = unit.address(), "Never checked successfully");
                    result.invalid.push(versioned);
                }
            }
        }

        info!(
            valid = result.valid.len(),
            invalid = result.invalid.len(),
            "Invalidation check complete"
        );
        Ok(result)
    }

    /// Record the checked fingerprints of `units`.
    ///
    /// Call only after the tool succeeded over exactly these units.
    pub fn commit(&mut self, units: &[VersionedUnit]) -> Result<(), ToolError> {
        if units.is_empty() {
            return Ok(());
        }

        let entries: Vec<(String, Fingerprint)> = units
            .iter()
            .map(|vu| (vu.address().to_string(), vu.fingerprint.clone()))
            .collect();
        self.store.record(&entries)?;

        info!(committed = entries.len(), "Recorded successful check");
        Ok(())
    }

    /// Forget all recorded state so every unit is invalid on the next check
    pub fn invalidate_all(&mut self) -> Result<(), ToolError> {
        self.store.clear()?;
        info!("Invalidated all targets");
        Ok(())
    }
}
