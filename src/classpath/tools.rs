//! Bootstrap classpath for JVM tools

use crate::error::ToolError;
use std::collections::HashMap;
use std::path::PathBuf;

/// Capability to materialize a registered tool's own runtime classpath
pub trait ToolClasspathProvider: Send + Sync {
    fn tool_classpath(&self, key: &str) -> Result<Vec<PathBuf>, ToolError>;
}

/// Jars produced for build targets, keyed by target address
#[derive(Debug, Clone, Default)]
pub struct JarProducts {
    jars: HashMap<String, Vec<PathBuf>>,
}

impl JarProducts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_jars(&mut self, address: impl Into<String>, jars: Vec<PathBuf>) {
        self.jars.entry(address.into()).or_default().extend(jars);
    }

    pub fn jars_for(&self, address: &str) -> Option<&[PathBuf]> {
        self.jars.get(address).map(Vec::as_slice)
    }
}

/// Tool keys bound to the bootstrap targets that provide them
#[derive(Debug, Clone, Default)]
pub struct BootstrapTools {
    tools: HashMap<String, Vec<String>>,
    jars: JarProducts,
}

impl BootstrapTools {
    pub fn new(jars: JarProducts) -> Self {
        Self {
            tools: HashMap::new(),
            jars,
        }
    }

    pub fn register_tool(&mut self, key: impl Into<String>, targets: Vec<String>) {
        self.tools.insert(key.into(), targets);
    }
}

impl ToolClasspathProvider for BootstrapTools {
    /// Jars of every bootstrap target, in target order
    fn tool_classpath(&self, key: &str) -> Result<Vec<PathBuf>, ToolError> {
        let targets = self
            .tools
            .get(key)
            .ok_or_else(|| ToolError::configuration(format!("No tool registered for {}", key)))?;

        let mut classpath = Vec::new();
        for address in targets {
            let jars = self
                .jars
                .jars_for(address)
                .filter(|jars| !jars.is_empty())
                .ok_or_else(|| {
                    ToolError::configuration(format!(
                        "Bootstrap target {} for tool {} produced no jars",
                        address, key
                    ))
                })?;
            classpath.extend(jars.iter().cloned());
        }
        Ok(classpath)
    }
}
