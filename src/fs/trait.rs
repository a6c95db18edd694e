//! FileSystem trait definition

use anyhow::Result;
use std::path::Path;

/// Abstraction over the file operations a checkstyle run performs, for testability
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Read file contents as raw bytes
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace the file at `path` with `contents`, creating parent directories.
    ///
    /// Readers never observe a partially written file.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Remove a file; removing a missing file is not an error
    fn remove_file(&self, path: &Path) -> Result<()>;
}
