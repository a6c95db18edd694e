use super::FileSystem;
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).context(format!("Failed to read file {:?}", path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory {:?}", parent))?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = Path::new(&tmp);

        fs::write(tmp, contents).context(format!("Failed to write file {:?}", tmp))?;
        fs::rename(tmp, path).context(format!("Failed to move {:?} into place", path))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context(format!("Failed to remove file {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents_and_replaces() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        let path = temp.path().join("a/b/checkstyle.properties");

        fs.write(&path, b"first").unwrap();
        fs.write(&path, b"second").unwrap();

        assert!(fs.exists(&path));
        assert_eq!(fs.read_to_string(&path).unwrap(), "second");
        assert!(!temp.path().join("a/b/checkstyle.properties.tmp").exists());
    }

    #[test]
    fn test_read_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();

        assert!(!fs.exists(&temp.path().join("nope")));
        assert!(fs.read(&temp.path().join("nope")).is_err());
    }

    #[test]
    fn test_remove_file_tolerates_missing() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        let path = temp.path().join("store.json");

        fs.write(&path, b"{}").unwrap();
        fs.remove_file(&path).unwrap();
        assert!(!fs.exists(&path));
        fs.remove_file(&path).unwrap();
    }
}
