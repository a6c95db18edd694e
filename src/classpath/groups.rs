//! Exclusive-group partitioning of the dependency classpath

use crate::graph::BuildUnit;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

/// Identifies one partition of the dependency classpath.
///
/// Rendered as sorted `key=value` pairs joined by `,`; units without
/// exclusives share the empty key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExclusiveGroupKey(String);

impl ExclusiveGroupKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn from_exclusives(exclusives: &BTreeMap<String, String>) -> Self {
        let rendered = exclusives
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",");
        Self(rendered)
    }

    /// Names and values must not contain the `,` and `=` separators, or two
    /// different declarations could render to the same key.
    pub fn check_exclusives(exclusives: &BTreeMap<String, String>) -> Result<(), String> {
        for (name, value) in exclusives {
            if name.is_empty() || name.contains([',', '=']) {
                return Err(format!("invalid exclusive name {:?}", name));
            }
            if value.contains([',', '=']) {
                return Err(format!(
                    "invalid value {:?} for exclusive {}: ',' and '=' are reserved",
                    value, name
                ));
            }
        }
        Ok(())
    }

    pub fn for_unit(unit: &dyn BuildUnit) -> Self {
        Self::from_exclusives(&unit.exclusives())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .split(',')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
    }

    /// Keys conflict when they bind the same exclusive to different values
    pub fn is_compatible_with(&self, other: &ExclusiveGroupKey) -> bool {
        let mine: HashMap<&str, &str> = self.pairs().collect();
        other
            .pairs()
            .all(|(k, v)| mine.get(k).map_or(true, |mv| *mv == v))
    }
}

impl fmt::Display for ExclusiveGroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<none>")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// One resolved dependency jar, tagged with the ivy configuration it came from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClasspathEntry {
    #[serde(alias = "configuration")]
    pub conf: String,
    pub path: PathBuf,
}

impl ClasspathEntry {
    pub fn new(conf: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            conf: conf.into(),
            path: path.into(),
        }
    }
}

/// Group-partition product: maps units to group keys and keys to classpaths
pub trait GroupPartition: Send + Sync {
    fn group_key_for(&self, unit: &dyn BuildUnit) -> ExclusiveGroupKey;

    fn classpath_for_group(&self, key: &ExclusiveGroupKey) -> Option<&[ClasspathEntry]>;
}

#[derive(Debug, Clone, Default)]
pub struct ExclusivesMapping {
    classpaths: BTreeMap<ExclusiveGroupKey, Vec<ClasspathEntry>>,
}

impl ExclusivesMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the classpath bound to `key`
    pub fn set_base_classpath_for_group(
        &mut self,
        key: ExclusiveGroupKey,
        entries: Vec<ClasspathEntry>,
    ) {
        self.classpaths.insert(key, entries);
    }
}

impl GroupPartition for ExclusivesMapping {
    fn group_key_for(&self, unit: &dyn BuildUnit) -> ExclusiveGroupKey {
        ExclusiveGroupKey::for_unit(unit)
    }

    fn classpath_for_group(&self, key: &ExclusiveGroupKey) -> Option<&[ClasspathEntry]> {
        self.classpaths.get(key).map(Vec::as_slice)
    }
}
