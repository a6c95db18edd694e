use super::{JavaInvocation, ProcessRunner};
use crate::error::ToolError;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Returns scripted exit codes and records every invocation
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    codes: Mutex<VecDeque<i32>>,
    invocations: Mutex<Vec<JavaInvocation>>,
    overhead: usize,
}

impl ScriptedRunner {
    /// Exit codes returned in order; zero once the script runs out
    pub fn new(codes: Vec<i32>) -> Self {
        Self {
            codes: Mutex::new(codes.into()),
            invocations: Mutex::new(Vec::new()),
            overhead: 0,
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_launcher_overhead(mut self, overhead: usize) -> Self {
        self.overhead = overhead;
        self
    }

    pub fn invocations(&self) -> Vec<JavaInvocation> {
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run_java(&self, invocation: &JavaInvocation) -> Result<i32, ToolError> {
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(invocation.clone());
        Ok(self
            .codes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(0))
    }

    fn launcher_overhead(&self) -> usize {
        self.overhead
    }
}
