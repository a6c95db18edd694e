//! Classpath assembly for the checkstyle JVM
//!
//! The final classpath is the tool's own bootstrap jars followed by the
//! project dependencies of one exclusive group.

pub mod groups;
pub mod resolver;
pub mod tools;

pub use groups::{ClasspathEntry, ExclusiveGroupKey, ExclusivesMapping, GroupPartition};
pub use resolver::ClasspathResolver;
pub use tools::{BootstrapTools, JarProducts, ToolClasspathProvider};
