//! Persistent fingerprint storage

use super::Fingerprint;
use crate::error::StoreError;
use crate::fs::FileSystem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

const STORE_VERSION: u32 = 1;

/// Fingerprints recorded after successful runs, keyed by unit address.
///
/// Implementations serialize their own access; the tracker performs one read
/// pass and at most one write per run.
pub trait InvalidationStore: Send {
    /// Fingerprint recorded by the last successful run, if any
    fn recorded(&self, address: &str) -> Result<Option<Fingerprint>, StoreError>;

    /// Persist fingerprints for units that were just checked successfully
    fn record(&mut self, entries: &[(String, Fingerprint)]) -> Result<(), StoreError>;

    /// Forget every recorded fingerprint
    fn clear(&mut self) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreEntry {
    fingerprint: Fingerprint,
    committed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, StoreEntry>,
}

/// JSON file backed store, loaded once on open
pub struct JsonFileStore {
    file_system: Arc<dyn FileSystem>,
    path: PathBuf,
    entries: BTreeMap<String, StoreEntry>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed, or was written
    /// by an incompatible version. Callers must not proceed on such a store.
    pub fn open(file_system: Arc<dyn FileSystem>, path: PathBuf) -> Result<Self, StoreError> {
        if !file_system.exists(&path) {
            debug!(path = %path.display(), "No invalidation store yet, starting empty");
            return Ok(Self {
                file_system,
                path,
                entries: BTreeMap::new(),
            });
        }

        let raw = file_system
            .read_to_string(&path)
            .map_err(|e| StoreError::Unreadable {
                path: path.clone(),
                message: format!("{:#}", e),
            })?;

        let parsed: StoreFile = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if parsed.version != STORE_VERSION {
            return Err(StoreError::VersionMismatch {
                path,
                found: parsed.version,
                expected: STORE_VERSION,
            });
        }

        if let Some((address, entry)) = parsed
            .entries
            .iter()
            .find(|(_, entry)| !entry.fingerprint.is_well_formed())
        {
            return Err(StoreError::Corrupt {
                path,
                message: format!(
                    "entry {} has malformed fingerprint {:?}",
                    address,
                    entry.fingerprint.as_str()
                ),
            });
        }

        debug!(
            path = %path.display(),
            entries = parsed.entries.len(),
            "Loaded invalidation store"
        );

        Ok(Self {
            file_system,
            path,
            entries: parsed.entries,
        })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let file = StoreFile {
            version: STORE_VERSION,
            entries: self.entries.clone(),
        };
        let json = serde_json::to_vec_pretty(&file).map_err(|e| StoreError::WriteFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        self.file_system
            .write(&self.path, &json)
            .map_err(|e| StoreError::WriteFailed {
                path: self.path.clone(),
                message: format!("{:#}", e),
            })
    }
}

impl InvalidationStore for JsonFileStore {
    fn recorded(&self, address: &str) -> Result<Option<Fingerprint>, StoreError> {
        Ok(self
            .entries
            .get(address)
            .map(|entry| entry.fingerprint.clone()))
    }

    fn record(&mut self, entries: &[(String, Fingerprint)]) -> Result<(), StoreError> {
        let committed_at = Utc::now();
        for (address, fingerprint) in entries {
            self.entries.insert(
                address.clone(),
                StoreEntry {
                    fingerprint: fingerprint.clone(),
                    committed_at,
                },
            );
        }
        self.persist()
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.file_system
            .remove_file(&self.path)
            .map_err(|e| StoreError::WriteFailed {
                path: self.path.clone(),
                message: format!("{:#}", e),
            })
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Fingerprint>,
    unreadable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose reads always fail, for exercising fail-fast paths
    pub fn unreadable() -> Self {
        Self {
            entries: HashMap::new(),
            unreadable: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl InvalidationStore for MemoryStore {
    fn recorded(&self, address: &str) -> Result<Option<Fingerprint>, StoreError> {
        if self.unreadable {
            return Err(StoreError::Unreadable {
                path: PathBuf::from("<memory>"),
                message: "store marked unreadable".to_string(),
            });
        }
        Ok(self.entries.get(address).cloned())
    }

    fn record(&mut self, entries: &[(String, Fingerprint)]) -> Result<(), StoreError> {
        for (address, fingerprint) in entries {
            self.entries.insert(address.clone(), fingerprint.clone());
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn store_path() -> PathBuf {
        PathBuf::from("/mock/.stylegate/invalidation.json")
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let fs = Arc::new(MockFileSystem::new());
        let store = JsonFileStore::open(fs, store_path()).unwrap();
        assert_eq!(store.recorded("src:lib").unwrap(), None);
    }

    fn fingerprint(fill: char) -> Fingerprint {
        Fingerprint::from_hex(fill.to_string().repeat(64))
    }

    #[test]
    fn test_record_persists_across_open() {
        let fs = Arc::new(MockFileSystem::new());
        let mut store = JsonFileStore::open(fs.clone(), store_path()).unwrap();
        store
            .record(&[("src:lib".to_string(), fingerprint('a'))])
            .unwrap();

        let reopened = JsonFileStore::open(fs.clone(), store_path()).unwrap();
        assert_eq!(reopened.recorded("src:lib").unwrap(), Some(fingerprint('a')));

        let raw: serde_json::Value =
            serde_json::from_str(&fs.contents(store_path()).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert!(raw["entries"]["src:lib"]["committed_at"].is_string());
    }

    #[test]
    fn test_malformed_fingerprint_is_corrupt() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file(
            store_path(),
            r#"{"version": 1, "entries": {"src:lib": {"fingerprint": "aéééééé", "committed_at": "2026-01-01T00:00:00Z"}}}"#,
        );

        match JsonFileStore::open(fs, store_path()) {
            Err(StoreError::Corrupt { message, .. }) => assert!(message.contains("src:lib")),
            Err(other) => panic!("Expected Corrupt error, got {:?}", other),
            Ok(_) => panic!("Expected Corrupt error"),
        }
    }

    #[test]
    fn test_corrupt_file_fails_fast() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file(store_path(), "{ not json");

        match JsonFileStore::open(fs, store_path()) {
            Err(StoreError::Corrupt { path, .. }) => assert_eq!(path, store_path()),
            Err(other) => panic!("Expected Corrupt error, got {:?}", other),
            Ok(_) => panic!("Expected Corrupt error"),
        }
    }

    #[test]
    fn test_unreadable_file_fails_fast() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file(store_path(), "{}");
        fs.make_unreadable(store_path());

        assert!(matches!(
            JsonFileStore::open(fs, store_path()),
            Err(StoreError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_version_mismatch_fails_fast() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file(store_path(), r#"{"version": 99, "entries": {}}"#);

        assert!(matches!(
            JsonFileStore::open(fs, store_path()),
            Err(StoreError::VersionMismatch {
                found: 99,
                expected: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_clear_removes_file() {
        let fs = Arc::new(MockFileSystem::new());
        let mut store = JsonFileStore::open(fs.clone(), store_path()).unwrap();
        store
            .record(&[("src:lib".to_string(), fingerprint('b'))])
            .unwrap();
        assert!(fs.contents(store_path()).is_some());

        store.clear().unwrap();
        assert!(fs.contents(store_path()).is_none());
        assert_eq!(store.recorded("src:lib").unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store
            .record(&[("a".to_string(), Fingerprint::from_hex("1"))])
            .unwrap();
        assert_eq!(store.len(), 1);
        assert!(MemoryStore::unreadable().recorded("a").is_err());
    }
}
