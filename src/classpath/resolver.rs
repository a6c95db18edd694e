use super::{ExclusiveGroupKey, GroupPartition};
use crate::error::ToolError;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::debug;

/// Merges the tool's bootstrap classpath with one group's dependency jars
pub struct ClasspathResolver<'a> {
    groups: &'a dyn GroupPartition,
}

impl<'a> ClasspathResolver<'a> {
    pub fn new(groups: &'a dyn GroupPartition) -> Self {
        Self { groups }
    }

    /// Bootstrap entries first, then the group's entries whose configuration is
    /// allowed, both in original order. Duplicates pass through untouched.
    ///
    /// # Errors
    ///
    /// `ToolError::Configuration` when no classpath is bound to `key`.
    pub fn resolve(
        &self,
        bootstrap: &[PathBuf],
        key: &ExclusiveGroupKey,
        allowed_configurations: &BTreeSet<String>,
    ) -> Result<Vec<PathBuf>, ToolError> {
        let partition = self.groups.classpath_for_group(key).ok_or_else(|| {
            ToolError::configuration(format!(
                "No classpath bound to exclusive group {}; was the group product produced?",
                key
            ))
        })?;

        let mut classpath = bootstrap.to_vec();
        classpath.extend(
            partition
                .iter()
                .filter(|entry| allowed_configurations.contains(&entry.conf))
                .map(|entry| entry.path.clone()),
        );

        debug!(
            group = %key,
            bootstrap = bootstrap.len(),
            dependencies = classpath.len() - bootstrap.len(),
            "Resolved classpath"
        );
        Ok(classpath)
    }
}
