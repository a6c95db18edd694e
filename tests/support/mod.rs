//! Shared helpers for integration tests

use std::fs;
use std::path::{Path, PathBuf};

#[allow(dead_code)]
pub fn get_stylegate_binary() -> PathBuf {
    let mut path = std::env::current_exe().expect("Failed to get current executable path");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.join("stylegate")
}

/// Manifest with two independent Java targets, one exclusive group and the checkstyle tool
#[allow(dead_code)]
pub const TWO_TARGET_MANIFEST: &str = r#"
[[target]]
address = "src/java/a:a"
sources = ["src/java/a/A.java"]

[[target]]
address = "src/java/b:b"
sources = ["src/java/b/B.java"]

[[target]]
address = "src/resources:res"
sources = ["src/resources/app.properties"]

[[group]]
classpath = [
    { conf = "default", path = "3rdparty/guava.jar" },
    { conf = "test", path = "3rdparty/junit.jar" },
]

[[tool]]
address = "//:checkstyle"
jars = ["3rdparty/checkstyle.jar"]
"#;

/// Lay out a build root with the two-target manifest and its sources
#[allow(dead_code)]
pub fn create_build_root(root: &Path) {
    write(root, "BUILD.toml", TWO_TARGET_MANIFEST);
    write(root, "src/java/a/A.java", "package a;\nclass A {}\n");
    write(root, "src/java/b/B.java", "package b;\nclass B {}\n");
    write(root, "src/resources/app.properties", "name=app\n");
    write(root, "checkstyle.xml", "<module name=\"Checker\"/>\n");
}

#[allow(dead_code)]
pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, content).expect("Failed to write file");
}
