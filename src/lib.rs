//! stylegate - incremental checkstyle for Java build targets
//!
//! Runs checkstyle only over the targets whose fingerprint changed since their
//! last clean run, with the classpath of the targets' exclusive group and the
//! source list split across as many invocations as the OS command-line limit
//! requires.
//!
//! # Core Concepts
//!
//! - **Invalidation**: [`InvalidationTracker`] partitions targets into valid and
//!   invalid against a persistent store; targets are committed only after the
//!   tool passes
//! - **Classpath**: [`ClasspathResolver`] puts the tool's bootstrap jars first,
//!   then the jars of one exclusive group filtered by ivy configuration
//! - **Batching**: [`ArgumentBatcher`] packs source paths greedily under a
//!   command-line limit and reports the first non-zero exit code
//! - **Orchestration**: [`Checkstyle`] ties the three together
//!
//! # Example Usage
//!
//! ```ignore
//! use stylegate::{BuildManifest, Checkstyle, Products, StylegateConfig};
//!
//! let manifest = BuildManifest::load(Path::new("BUILD.toml"))?;
//! let mut products = Products::new();
//! manifest.populate(&mut products);
//!
//! let mut task = Checkstyle::open(config, build_root, fs, tools, runner)?;
//! task.prepare(&mut products);
//! let outcome = task.execute(&manifest.registry()?, &products)?;
//! ```

pub mod batch;
pub mod classpath;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod graph;
pub mod invalidation;
pub mod manifest;
pub mod orchestrator;
pub mod process;
pub mod products;
pub mod properties;

pub use batch::ArgumentBatcher;
pub use classpath::{
    BootstrapTools, ClasspathEntry, ClasspathResolver, ExclusiveGroupKey, ExclusivesMapping,
    GroupPartition, JarProducts, ToolClasspathProvider,
};
pub use config::{ConfigError, StylegateConfig};
pub use error::{StoreError, ToolError};
pub use graph::{BuildUnit, Target, TargetRegistry};
pub use invalidation::{
    Fingerprint, Fingerprinter, InvalidationResult, InvalidationStore, InvalidationTracker,
    JsonFileStore, MemoryStore, VersionedUnit,
};
pub use manifest::BuildManifest;
pub use orchestrator::{Checkstyle, RunOutcome, RunPhase};
pub use process::{JavaInvocation, JavaRunner, ProcessRunner, ScriptedRunner};
pub use products::Products;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
