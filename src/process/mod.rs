//! Launching the external JVM tool

mod java;
mod mock;

pub use java::JavaRunner;
pub use mock::ScriptedRunner;

use crate::error::ToolError;
use std::path::PathBuf;

/// One JVM tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaInvocation {
    pub classpath: Vec<PathBuf>,
    pub main: String,
    pub args: Vec<String>,
    /// Label used in logs for this unit of work
    pub workunit_name: String,
}

impl JavaInvocation {
    /// Classpath joined with the platform separator
    pub fn joined_classpath(&self) -> String {
        join_classpath(&self.classpath)
    }
}

pub fn join_classpath(classpath: &[PathBuf]) -> String {
    let separator = if cfg!(windows) { ";" } else { ":" };
    classpath
        .iter()
        .map(|p| p.to_string_lossy())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Executes a JVM program and reports its exit code.
///
/// Any timeout policy belongs to implementations; callers block until the
/// process exits.
pub trait ProcessRunner: Send + Sync {
    /// # Errors
    ///
    /// `ToolError::Launch` when the program cannot be started. A program that
    /// runs and fails is `Ok` with its non-zero code.
    fn run_java(&self, invocation: &JavaInvocation) -> Result<i32, ToolError>;

    /// Command-line bytes taken before any per-invocation argument, i.e. the
    /// program name and JVM options
    fn launcher_overhead(&self) -> usize {
        0
    }
}
