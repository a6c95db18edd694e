//! Generated `checkstyle.properties`

use crate::error::ToolError;
use crate::fs::FileSystem;
use std::collections::BTreeMap;
use std::path::Path;

pub const PROPERTIES_FILE_NAME: &str = "checkstyle.properties";

/// Render one `key=value` line per property, in key order
pub fn render_properties(properties: &BTreeMap<String, String>) -> String {
    properties
        .iter()
        .map(|(key, value)| format!("{}={}\n", key, value))
        .collect()
}

/// Overwrite `path` with the rendered properties
pub fn write_properties(
    file_system: &dyn FileSystem,
    path: &Path,
    properties: &BTreeMap<String, String>,
) -> Result<(), ToolError> {
    file_system
        .write(path, render_properties(properties).as_bytes())
        .map_err(|e| ToolError::Io {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    #[test]
    fn test_render_sorted_lines() {
        let mut properties = BTreeMap::new();
        properties.insert("suppressions".to_string(), "build/supp.xml".to_string());
        properties.insert("basedir".to_string(), "/repo".to_string());

        assert_eq!(
            render_properties(&properties),
            "basedir=/repo\nsuppressions=build/supp.xml\n"
        );
    }

    #[test]
    fn test_write_overwrites() {
        let fs = MockFileSystem::new();
        let path = Path::new("/mock/.stylegate/checkstyle.properties");
        fs.add_file(path, "stale=1\n");

        let mut properties = BTreeMap::new();
        properties.insert("fresh".to_string(), "2".to_string());
        write_properties(&fs, path, &properties).unwrap();

        assert_eq!(fs.contents(path).as_deref(), Some("fresh=2\n"));
    }
}
