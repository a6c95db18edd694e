use super::{JavaInvocation, ProcessRunner};
use crate::batch::arg_len;
use crate::error::ToolError;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, info};

/// Runs tools with a local `java` binary, streaming their output to ours
#[derive(Debug, Clone)]
pub struct JavaRunner {
    java: PathBuf,
    jvm_options: Vec<String>,
    working_dir: PathBuf,
}

impl JavaRunner {
    pub fn new(java: PathBuf, working_dir: PathBuf) -> Self {
        Self {
            java,
            jvm_options: Vec::new(),
            working_dir,
        }
    }

    pub fn with_jvm_options(mut self, jvm_options: Vec<String>) -> Self {
        self.jvm_options = jvm_options;
        self
    }

    fn command(&self, invocation: &JavaInvocation) -> Command {
        let mut command = Command::new(&self.java);
        command
            .args(&self.jvm_options)
            .arg("-cp")
            .arg(invocation.joined_classpath())
            .arg(&invocation.main)
            .args(&invocation.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null());
        command
    }
}

impl ProcessRunner for JavaRunner {
    fn run_java(&self, invocation: &JavaInvocation) -> Result<i32, ToolError> {
        let start = Instant::now();
        debug!(
            workunit = %invocation.workunit_name,
            main = %invocation.main,
            args = invocation.args.len(),
            "Launching java"
        );

        let status = self
            .command(invocation)
            .status()
            .map_err(|e| ToolError::Launch {
                program: self.java.display().to_string(),
                message: e.to_string(),
            })?;

        // Killed by a signal: no code, report a generic failure
        let code = status.code().unwrap_or(-1);
        info!(
            workunit = %invocation.workunit_name,
            code,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "java exited"
        );
        Ok(code)
    }

    fn launcher_overhead(&self) -> usize {
        arg_len(&self.java.to_string_lossy())
            + self.jvm_options.iter().map(|o| arg_len(o)).sum::<usize>()
    }
}
