//! Build graph collaborator
//!
//! Targets are owned by the build graph; a checkstyle run only reads them
//! through the [`BuildUnit`] capability.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

pub mod registry;
pub mod target;

pub use registry::TargetRegistry;
pub use target::Target;

/// Capability set a checkable build target exposes
pub trait BuildUnit: Send + Sync + fmt::Debug {
    /// Stable identity, e.g. `src/java/com/acme:lib`
    fn address(&self) -> &str;

    /// Declared sources relative to the build root, in declaration order
    fn sources(&self) -> &[std::path::PathBuf];

    /// Synthetic targets are generated by the build itself and never checked
    fn is_synthetic(&self) -> bool;

    /// Exclusive-group declarations (`foo = "a"`)
    fn exclusives(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Whether any declared source has the given extension (without the dot)
    fn has_sources(&self, extension: &str) -> bool {
        self.sources()
            .iter()
            .any(|source| has_extension(source, extension))
    }
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == extension)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("src/A.java"), "java"));
        assert!(!has_extension(Path::new("src/A.scala"), "java"));
        assert!(!has_extension(Path::new("src/java"), "java"));
        assert!(!has_extension(Path::new("src/A.JAVA"), "java"));
    }

    #[test]
    fn test_has_sources() {
        let target = Target::new(
            "src/java/acme:lib",
            vec![PathBuf::from("README.md"), PathBuf::from("src/A.java")],
        );
        assert!(target.has_sources("java"));
        assert!(!target.has_sources("scala"));
    }
}
