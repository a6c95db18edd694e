//! Concrete build target

use super::BuildUnit;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A target declared in the build manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Target {
    pub address: String,

    #[serde(default)]
    pub sources: Vec<PathBuf>,

    #[serde(default)]
    pub synthetic: bool,

    #[serde(default)]
    pub exclusives: BTreeMap<String, String>,
}

impl Target {
    pub fn new(address: impl Into<String>, sources: Vec<PathBuf>) -> Self {
        Self {
            address: address.into(),
            sources,
            synthetic: false,
            exclusives: BTreeMap::new(),
        }
    }

    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    pub fn with_exclusive(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.exclusives.insert(key.into(), value.into());
        self
    }
}

impl BuildUnit for Target {
    fn address(&self) -> &str {
        &self.address
    }

    fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    fn exclusives(&self) -> BTreeMap<String, String> {
        self.exclusives.clone()
    }
}
