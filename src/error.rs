//! Error taxonomy for a checkstyle run
//!
//! Lower layers fail fast with a specific variant. The argument batcher never
//! turns a non-zero exit code into an error; only the orchestrator converts the
//! aggregate non-zero code into [`ToolError::ToolExecution`].

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the persistent invalidation store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read invalidation store {path:?}: {message}")]
    Unreadable { path: PathBuf, message: String },

    #[error("Invalidation store {path:?} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("Invalidation store {path:?} has version {found}, expected {expected}")]
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("Failed to write invalidation store {path:?}: {message}")]
    WriteFailed { path: PathBuf, message: String },
}

/// Errors surfaced by the orchestrator and its collaborators
#[derive(Debug, Error)]
pub enum ToolError {
    /// Pipeline or option misconfiguration; never retried
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    InvalidationStore(#[from] StoreError),

    #[error("Failed to fingerprint {address}: {message}")]
    Fingerprint { address: String, message: String },

    /// The tool ran and reported failure
    #[error("{tool}: java {main} ... exited non-zero ({code})")]
    ToolExecution {
        tool: String,
        main: String,
        code: i32,
    },

    /// The process runner could not start the tool at all
    #[error("Failed to launch {program}: {message}")]
    Launch { program: String, message: String },

    #[error("I/O error on {path:?}: {message}")]
    Io { path: PathBuf, message: String },
}

impl ToolError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ToolError::Configuration(message.into())
    }

    /// Exit code reported by the tool, if this is a tool failure
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ToolError::ToolExecution { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_execution_message_names_tool_and_code() {
        let err = ToolError::ToolExecution {
            tool: "checkstyle".to_string(),
            main: "com.puppycrawl.tools.checkstyle.Main".to_string(),
            code: 2,
        };
        let message = err.to_string();
        assert!(message.contains("checkstyle"));
        assert!(message.contains("com.puppycrawl.tools.checkstyle.Main"));
        assert!(message.contains("(2)"));
        assert_eq!(err.exit_code(), Some(2));
    }

    #[test]
    fn test_store_error_converts() {
        let err: ToolError = StoreError::Corrupt {
            path: PathBuf::from("/tmp/store.json"),
            message: "expected value".to_string(),
        }
        .into();
        assert!(matches!(err, ToolError::InvalidationStore(_)));
        assert_eq!(err.exit_code(), None);
    }
}
