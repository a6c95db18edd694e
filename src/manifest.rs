//! Build manifest: the targets, exclusive groups and tool jars of a build root
//!
//! ```toml
//! [[target]]
//! address = "src/java/com/acme:lib"
//! sources = ["src/java/com/acme/Lib.java"]
//! exclusives = { foo = "a" }
//!
//! [[group]]
//! exclusives = { foo = "a" }
//! classpath = [{ conf = "default", path = "3rdparty/guava.jar" }]
//!
//! [[tool]]
//! address = "//:checkstyle"
//! jars = ["3rdparty/checkstyle-5.7.jar"]
//! ```

use crate::classpath::{ClasspathEntry, ExclusiveGroupKey, ExclusivesMapping, JarProducts};
use crate::config::ConfigError;
use crate::error::ToolError;
use crate::graph::{Target, TargetRegistry};
use crate::products::{Products, EXCLUSIVES_GROUPS, JAR_PRODUCTS};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_MANIFEST_FILE: &str = "BUILD.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct GroupSpec {
    #[serde(default)]
    pub exclusives: BTreeMap<String, String>,
    #[serde(default)]
    pub classpath: Vec<ClasspathEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolSpec {
    pub address: String,
    pub jars: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildManifest {
    #[serde(default, rename = "target")]
    pub targets: Vec<Target>,
    #[serde(default, rename = "group")]
    pub groups: Vec<GroupSpec>,
    #[serde(default, rename = "tool")]
    pub tools: Vec<ToolSpec>,
}

impl BuildManifest {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::from_toml(&raw).map_err(|e| match e {
            ConfigError::ParseError { error, .. } => ConfigError::ParseError {
                field: path.display().to_string(),
                error,
            },
            other => other,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let manifest: Self = toml::from_str(raw).map_err(|e| ConfigError::ParseError {
            field: "manifest".to_string(),
            error: e.to_string(),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Exclusive declarations must render to unambiguous group keys
    pub fn validate(&self) -> Result<(), ConfigError> {
        for target in &self.targets {
            ExclusiveGroupKey::check_exclusives(&target.exclusives).map_err(|e| {
                ConfigError::ValidationFailed(format!("target {}: {}", target.address, e))
            })?;
        }
        for group in &self.groups {
            ExclusiveGroupKey::check_exclusives(&group.exclusives)
                .map_err(|e| ConfigError::ValidationFailed(format!("group: {}", e)))?;
        }
        Ok(())
    }

    pub fn registry(&self) -> Result<TargetRegistry, ToolError> {
        let mut registry = TargetRegistry::new();
        for target in &self.targets {
            registry.register(Arc::new(target.clone()))?;
        }
        Ok(registry)
    }

    /// Group classpaths; a group listed twice has its entries concatenated
    pub fn exclusives_mapping(&self) -> ExclusivesMapping {
        let mut merged: BTreeMap<ExclusiveGroupKey, Vec<ClasspathEntry>> = BTreeMap::new();
        for group in &self.groups {
            merged
                .entry(ExclusiveGroupKey::from_exclusives(&group.exclusives))
                .or_default()
                .extend(group.classpath.iter().cloned());
        }

        let mut mapping = ExclusivesMapping::new();
        for (key, entries) in merged {
            mapping.set_base_classpath_for_group(key, entries);
        }
        mapping
    }

    pub fn jar_products(&self) -> JarProducts {
        let mut jars = JarProducts::new();
        for tool in &self.tools {
            jars.add_jars(tool.address.clone(), tool.jars.clone());
        }
        jars
    }

    /// Publish the products a checkstyle round consumes
    pub fn populate(&self, products: &mut Products) {
        products.safe_create_data(EXCLUSIVES_GROUPS, self.exclusives_mapping());
        products.safe_create_data(JAR_PRODUCTS, self.jar_products());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::GroupPartition;
    use crate::graph::BuildUnit;

    const MANIFEST: &str = r#"
        [[target]]
        address = "src/java/acme:lib"
        sources = ["src/java/acme/Lib.java"]
        exclusives = { foo = "a" }

        [[target]]
        address = "gen:thrift"
        sources = ["gen/T.java"]
        synthetic = true

        [[group]]
        exclusives = { foo = "a" }
        classpath = [{ conf = "default", path = "guava.jar" }]

        [[group]]
        exclusives = { foo = "a" }
        classpath = [{ configuration = "test", path = "junit.jar" }]

        [[group]]
        classpath = []

        [[tool]]
        address = "//:checkstyle"
        jars = ["checkstyle.jar"]
    "#;

    #[test]
    fn test_parse_manifest() {
        let manifest = BuildManifest::from_toml(MANIFEST).unwrap();
        assert_eq!(manifest.targets.len(), 2);
        assert_eq!(manifest.groups.len(), 3);
        assert_eq!(manifest.tools.len(), 1);

        let registry = manifest.registry().unwrap();
        let lib = registry.get("src/java/acme:lib").unwrap();
        assert_eq!(lib.exclusives().get("foo").map(String::as_str), Some("a"));
        assert!(registry.get("gen:thrift").unwrap().is_synthetic());
    }

    #[test]
    fn test_groups_merge_by_key() {
        let manifest = BuildManifest::from_toml(MANIFEST).unwrap();
        let mapping = manifest.exclusives_mapping();

        let foo_a = mapping
            .classpath_for_group(&ExclusiveGroupKey::new("foo=a"))
            .unwrap();
        assert_eq!(foo_a.len(), 2);
        assert_eq!(foo_a[1].conf, "test");
        assert!(mapping
            .classpath_for_group(&ExclusiveGroupKey::default())
            .is_some());
    }

    #[test]
    fn test_populate_products() {
        let manifest = BuildManifest::from_toml(MANIFEST).unwrap();
        let mut products = Products::new();
        manifest.populate(&mut products);

        let jars = products.get_data::<JarProducts>(JAR_PRODUCTS).unwrap();
        assert_eq!(
            jars.jars_for("//:checkstyle"),
            Some(&[PathBuf::from("checkstyle.jar")][..])
        );
        assert!(products
            .get_data::<ExclusivesMapping>(EXCLUSIVES_GROUPS)
            .is_ok());
    }

    #[test]
    fn test_ambiguous_exclusives_rejected() {
        let target = r#"
            [[target]]
            address = "src:lib"
            exclusives = { a = "1,b=2" }
        "#;
        match BuildManifest::from_toml(target) {
            Err(ConfigError::ValidationFailed(message)) => assert!(message.contains("src:lib")),
            other => panic!("Expected ValidationFailed, got {:?}", other),
        }

        let group = "[[group]]\nexclusives = { \"a=b\" = \"1\" }\n";
        assert!(matches!(
            BuildManifest::from_toml(group),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(matches!(
            BuildManifest::from_toml("[[targets]]\naddress = \"x\""),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
