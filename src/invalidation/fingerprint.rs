//! Content fingerprints for build units

use crate::error::ToolError;
use crate::fs::FileSystem;
use crate::graph::BuildUnit;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Bumped whenever the hashed layout changes, invalidating every stored entry
const FINGERPRINT_SCHEMA: u32 = 1;

const MISSING_SOURCE: &[u8] = b"<missing>";

/// Hex-encoded sha256 digest of a unit's inputs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }

    /// 64 lowercase hex digits, as produced by [`Fingerprinter`]
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 64
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes fingerprints from unit structure and source contents
#[derive(Clone)]
pub struct Fingerprinter {
    file_system: Arc<dyn FileSystem>,
    build_root: PathBuf,
    task_fingerprint: String,
}

impl Fingerprinter {
    pub fn new(file_system: Arc<dyn FileSystem>, build_root: PathBuf) -> Self {
        Self {
            file_system,
            build_root,
            task_fingerprint: String::new(),
        }
    }

    /// Mix task options into every fingerprint so option changes invalidate all units
    pub fn with_task_fingerprint(mut self, task_fingerprint: impl Into<String>) -> Self {
        self.task_fingerprint = task_fingerprint.into();
        self
    }

    pub fn fingerprint(&self, unit: &dyn BuildUnit) -> Result<Fingerprint, ToolError> {
        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_SCHEMA.to_le_bytes());
        update_field(&mut hasher, self.task_fingerprint.as_bytes());
        update_field(&mut hasher, unit.address().as_bytes());

        for (key, value) in unit.exclusives() {
            update_field(&mut hasher, key.as_bytes());
            update_field(&mut hasher, value.as_bytes());
        }

        for source in unit.sources() {
            update_field(&mut hasher, source.to_string_lossy().as_bytes());

            let path = self.build_root.join(source);
            if !self.file_system.exists(&path) {
                update_field(&mut hasher, MISSING_SOURCE);
                continue;
            }

            let content = self
                .file_system
                .read(&path)
                .map_err(|e| ToolError::Fingerprint {
                    address: unit.address().to_string(),
                    message: format!("{:#}", e),
                })?;
            update_field(&mut hasher, &content);
        }

        Ok(Fingerprint(hex::encode(hasher.finalize())))
    }
}

/// Length-prefixed so adjacent fields cannot run together
fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
