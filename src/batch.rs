//! Splitting long argument lists across several tool invocations
//!
//! Tools like checkstyle take their inputs on the command line and accept no
//! argument files, so a large change set can exceed the OS limit on command
//! length. The batcher keeps every invocation under a caller-supplied bound.

use tracing::{debug, warn};

/// Default bound on a single command line, in bytes
pub const DEFAULT_MAX_COMMAND_LENGTH: usize = 32_768;

/// Bytes an argument occupies on the command line, including its separator
pub fn arg_len(arg: &str) -> usize {
    arg.len() + 1
}

#[derive(Debug, Clone, Copy)]
pub struct ArgumentBatcher {
    max_command_length: usize,
    fixed_overhead: usize,
}

impl ArgumentBatcher {
    pub fn new(max_command_length: usize) -> Self {
        Self {
            max_command_length,
            fixed_overhead: 0,
        }
    }

    /// Length already taken by the program, classpath and fixed arguments
    pub fn with_fixed_overhead(mut self, fixed_overhead: usize) -> Self {
        self.fixed_overhead = fixed_overhead;
        self
    }

    /// Greedy split into the fewest contiguous batches that fit.
    ///
    /// An item too long to fit even alone gets a batch of its own.
    pub fn batches<'a, S: AsRef<str>>(&self, items: &'a [S]) -> Vec<&'a [S]> {
        let mut batches = Vec::new();
        let mut start = 0;
        let mut length = self.fixed_overhead;

        for (idx, item) in items.iter().enumerate() {
            let item_len = arg_len(item.as_ref());
            if idx > start && length + item_len > self.max_command_length {
                batches.push(&items[start..idx]);
                start = idx;
                length = self.fixed_overhead;
            }
            length += item_len;
        }

        if start < items.len() {
            batches.push(&items[start..]);
        }
        batches
    }

    /// Invoke once per batch, in order, and aggregate exit codes.
    ///
    /// Every batch runs even after a failure so one run reports all findings.
    /// Returns the first non-zero code, or zero. Only errors from `invoke`
    /// itself (e.g. the process could not be launched) abort the loop.
    pub fn execute<S, F, E>(&self, items: &[S], mut invoke: F) -> Result<i32, E>
    where
        S: AsRef<str>,
        F: FnMut(&[S]) -> Result<i32, E>,
    {
        let batches = self.batches(items);
        let total = batches.len();
        let mut result = 0;

        for (idx, batch) in batches.into_iter().enumerate() {
            debug!(batch = idx + 1, total, items = batch.len(), "Invoking batch");

            let code = invoke(batch)?;
            if code != 0 {
                warn!(batch = idx + 1, total, code, "Batch exited non-zero");
                if result == 0 {
                    result = code;
                }
            }
        }

        Ok(result)
    }
}

impl Default for ArgumentBatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COMMAND_LENGTH)
    }
}
