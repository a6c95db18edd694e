//! Configuration management for stylegate
//!
//! Settings are resolved once at startup, in increasing precedence: built-in
//! defaults, the TOML config file, `STYLEGATE_*` environment variables, and
//! finally command-line flags applied by the CLI. The resulting value is handed
//! to each component; nothing looks configuration up later.
//!
//! # Environment Variables
//!
//! - `STYLEGATE_SKIP`: Skip checkstyle entirely (true|false) - default: "false"
//! - `STYLEGATE_CONFIGURATION`: Path to the checkstyle XML configuration - **required**
//! - `STYLEGATE_CONFS`: Comma-separated ivy configurations to put on the classpath - default: "default"
//! - `STYLEGATE_WORKDIR`: Directory for the invalidation store and generated files - default: ".stylegate"
//! - `STYLEGATE_MAX_COMMAND_LENGTH`: Upper bound on one command line in bytes - default: "32768"
//! - `STYLEGATE_JAVA`: Java binary - default: "java"
//! - `STYLEGATE_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```toml
//! configuration = "build-support/checkstyle/coding_style.xml"
//! confs = ["default"]
//! bootstrap_tools = ["//:checkstyle"]
//!
//! [properties]
//! "checkstyle.suppression.files" = "build-support/checkstyle/suppressions.xml"
//! ```

use crate::batch::DEFAULT_MAX_COMMAND_LENGTH;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "stylegate.toml";
const DEFAULT_CONF: &str = "default";
const DEFAULT_BOOTSTRAP_TOOL: &str = "//:checkstyle";
const DEFAULT_WORKDIR: &str = ".stylegate";
const DEFAULT_JAVA: &str = "java";
const DEFAULT_LOG_LEVEL: &str = "info";
const MIN_COMMAND_LENGTH: usize = 256;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No checkstyle configuration file set. Use --configuration, STYLEGATE_CONFIGURATION or `configuration` in stylegate.toml")]
    MissingConfiguration,

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error("Failed to read {path:?}: {error}")]
    ReadFailed { path: PathBuf, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylegateConfig {
    /// Bypass checkstyle entirely
    pub skip: bool,

    /// Checkstyle XML configuration file
    pub configuration: Option<PathBuf>,

    /// Written to `checkstyle.properties` and passed with `-p` when non-empty
    pub properties: BTreeMap<String, String>,

    /// Ivy configurations whose jars go on the tool classpath
    pub confs: BTreeSet<String>,

    /// Addresses of the targets providing checkstyle itself
    pub bootstrap_tools: Vec<String>,

    pub max_command_length: usize,

    /// Holds the invalidation store and generated properties
    pub workdir: PathBuf,

    pub java: PathBuf,

    pub jvm_options: Vec<String>,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for StylegateConfig {
    fn default() -> Self {
        Self {
            skip: false,
            configuration: None,
            properties: BTreeMap::new(),
            confs: BTreeSet::from([DEFAULT_CONF.to_string()]),
            bootstrap_tools: vec![DEFAULT_BOOTSTRAP_TOOL.to_string()],
            max_command_length: DEFAULT_MAX_COMMAND_LENGTH,
            workdir: PathBuf::from(DEFAULT_WORKDIR),
            java: PathBuf::from(DEFAULT_JAVA),
            jvm_options: Vec::new(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl StylegateConfig {
    /// Defaults, then `path` (or `stylegate.toml` under `build_root` if present),
    /// then environment overrides
    pub fn load(build_root: &Path, path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = build_root.join(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
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
        toml::from_str(raw).map_err(|e| ConfigError::ParseError {
            field: "config".to_string(),
            error: e.to_string(),
        })
    }

    /// Apply `STYLEGATE_*` overrides
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(v) = env::var("STYLEGATE_SKIP") {
            self.skip = v.parse::<bool>().map_err(|e| ConfigError::ParseError {
                field: "STYLEGATE_SKIP".to_string(),
                error: e.to_string(),
            })?;
        }

        if let Ok(v) = env::var("STYLEGATE_CONFIGURATION") {
            self.configuration = Some(PathBuf::from(v));
        }

        if let Ok(v) = env::var("STYLEGATE_CONFS") {
            self.confs = v
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(v) = env::var("STYLEGATE_WORKDIR") {
            self.workdir = PathBuf::from(v);
        }

        if let Ok(v) = env::var("STYLEGATE_MAX_COMMAND_LENGTH") {
            self.max_command_length =
                v.parse::<usize>().map_err(|e| ConfigError::ParseError {
                    field: "STYLEGATE_MAX_COMMAND_LENGTH".to_string(),
                    error: e.to_string(),
                })?;
        }

        if let Ok(v) = env::var("STYLEGATE_JAVA") {
            self.java = PathBuf::from(v);
        }

        if let Ok(v) = env::var("STYLEGATE_LOG_LEVEL") {
            self.log_level = v.to_lowercase();
        }

        Ok(())
    }

    /// Validates the configuration
    ///
    /// A skipped run only needs a valid log level; everything else is checked
    /// when checkstyle will actually run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if self.skip {
            return Ok(());
        }

        let configuration = self
            .configuration
            .as_ref()
            .ok_or(ConfigError::MissingConfiguration)?;
        let rendered = configuration.to_string_lossy();
        if rendered.trim().is_empty() {
            return Err(ConfigError::MissingConfiguration);
        }
        if rendered.contains('\0') {
            return Err(ConfigError::ValidationFailed(
                "Configuration path contains a NUL byte".to_string(),
            ));
        }

        if self.max_command_length < MIN_COMMAND_LENGTH {
            return Err(ConfigError::ValidationFailed(format!(
                "Max command length must be at least {} bytes",
                MIN_COMMAND_LENGTH
            )));
        }

        if self.confs.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one ivy configuration must be allowed".to_string(),
            ));
        }

        if self.bootstrap_tools.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one bootstrap tool target is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Options that change checkstyle's verdict; folded into every unit fingerprint
    pub fn task_fingerprint(&self) -> String {
        let mut parts = vec![format!(
            "configuration={}",
            self.configuration
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )];
        parts.extend(
            self.properties
                .iter()
                .map(|(k, v)| format!("property:{}={}", k, v)),
        );
        parts.extend(self.confs.iter().map(|c| format!("conf={}", c)));
        parts.extend(self.bootstrap_tools.iter().map(|t| format!("tool={}", t)));
        parts.join("\n")
    }

    /// Workdir resolved against the build root
    pub fn workdir_in(&self, build_root: &Path) -> PathBuf {
        build_root.join(&self.workdir)
    }
}

impl fmt::Display for StylegateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stylegate Configuration:")?;
        writeln!(f, "  Skip: {}", self.skip)?;
        match &self.configuration {
            Some(path) => writeln!(f, "  Configuration: {}", path.display())?,
            None => writeln!(f, "  Configuration: <unset>")?,
        }
        writeln!(f, "  Properties: {}", self.properties.len())?;
        writeln!(
            f,
            "  Confs: {}",
            self.confs.iter().cloned().collect::<Vec<_>>().join(", ")
        )?;
        writeln!(f, "  Bootstrap Tools: {}", self.bootstrap_tools.join(", "))?;
        writeln!(f, "  Max Command Length: {} bytes", self.max_command_length)?;
        writeln!(f, "  Workdir: {}", self.workdir.display())?;
        writeln!(f, "  Java: {}", self.java.display())?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
