//! Incremental checkstyle run
//!
//! One synchronous pass per run:
//!
//! ```text
//! Idle -> Filtering -> CheckingInvalidation -> Skipped
//!                                           -> CollectingSources -> NoWork
//!                                              -> ResolvingClasspath -> Invoking
//!                                                 -> Committing -> Done   (exit 0)
//!                                                 -> Done + ToolExecution (exit != 0)
//! ```
//!
//! Invalidation state is committed only after every batch succeeded, so a
//! failed run re-checks the same targets next time.

use crate::batch::{arg_len, ArgumentBatcher};
use crate::classpath::{
    ClasspathResolver, ExclusiveGroupKey, ExclusivesMapping, GroupPartition, ToolClasspathProvider,
};
use crate::config::StylegateConfig;
use crate::error::ToolError;
use crate::fs::FileSystem;
use crate::graph::{has_extension, BuildUnit, TargetRegistry};
use crate::invalidation::{Fingerprinter, InvalidationResult, InvalidationTracker, JsonFileStore};
use crate::process::{join_classpath, JavaInvocation, ProcessRunner};
use crate::products::{Products, EXCLUSIVES_GROUPS, JAR_PRODUCTS};
use crate::properties::{write_properties, PROPERTIES_FILE_NAME};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const CHECKSTYLE_MAIN: &str = "com.puppycrawl.tools.checkstyle.Main";
pub const CHECKSTYLE_BOOTSTRAP_KEY: &str = "checkstyle";
pub const JAVA_SOURCE_EXTENSION: &str = "java";
pub const INVALIDATION_STORE_FILE: &str = "invalidation.json";
const TOOL_NAME: &str = "checkstyle";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Filtering,
    CheckingInvalidation,
    CollectingSources,
    ResolvingClasspath,
    Invoking,
    Committing,
    Done,
}

/// How a run that did not fail ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// `skip` is set; nothing was examined
    Disabled,
    /// Every checkable target is unchanged since its last successful check
    Skipped { checked_targets: usize },
    /// Invalid targets exist but declare no Java sources to check
    NoWork { invalid_targets: usize },
    /// Checkstyle passed and the invalid targets were committed
    Success {
        committed: Vec<String>,
        sources: usize,
        batches: usize,
    },
}

/// Runs checkstyle over the Java targets that changed since their last clean check
pub struct Checkstyle {
    config: StylegateConfig,
    build_root: PathBuf,
    file_system: Arc<dyn FileSystem>,
    tracker: InvalidationTracker,
    tools: Arc<dyn ToolClasspathProvider>,
    runner: Arc<dyn ProcessRunner>,
    phase: RunPhase,
}

impl Checkstyle {
    pub fn new(
        config: StylegateConfig,
        build_root: PathBuf,
        file_system: Arc<dyn FileSystem>,
        tracker: InvalidationTracker,
        tools: Arc<dyn ToolClasspathProvider>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            config,
            build_root,
            file_system,
            tracker,
            tools,
            runner,
            phase: RunPhase::Idle,
        }
    }

    /// Build a task backed by the JSON invalidation store in the configured workdir
    ///
    /// # Errors
    ///
    /// Fails when an existing store cannot be read or parsed.
    pub fn open(
        config: StylegateConfig,
        build_root: PathBuf,
        file_system: Arc<dyn FileSystem>,
        tools: Arc<dyn ToolClasspathProvider>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Result<Self, ToolError> {
        let store_path = config.workdir_in(&build_root).join(INVALIDATION_STORE_FILE);
        let store = JsonFileStore::open(file_system.clone(), store_path)?;
        let fingerprinter = Fingerprinter::new(file_system.clone(), build_root.clone())
            .with_task_fingerprint(format!(
                "main={}\n{}",
                CHECKSTYLE_MAIN,
                config.task_fingerprint()
            ));
        let tracker = InvalidationTracker::new(Box::new(store), fingerprinter);

        Ok(Self::new(config, build_root, file_system, tracker, tools, runner))
    }

    /// Phase the most recent run reached
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Declare the products this task consumes
    pub fn prepare(&self, products: &mut Products) {
        products.require_data(JAR_PRODUCTS);
        products.require_data(EXCLUSIVES_GROUPS);
    }

    /// Targets that carry Java sources and were written by hand
    pub fn is_checked(unit: &dyn BuildUnit) -> bool {
        unit.has_sources(JAVA_SOURCE_EXTENSION) && !unit.is_synthetic()
    }

    /// Run over every checkable target in `registry`, using the published group product
    pub fn execute(
        &mut self,
        registry: &TargetRegistry,
        products: &Products,
    ) -> Result<RunOutcome, ToolError> {
        let missing = products.missing_requirements();
        if !missing.is_empty() {
            return Err(ToolError::configuration(format!(
                "Required products were never produced: {}",
                missing.join(", ")
            )));
        }

        let groups = products.get_data::<ExclusivesMapping>(EXCLUSIVES_GROUPS)?;
        let targets = registry.targets(Self::is_checked);
        self.run(&targets, groups.as_ref())
    }

    /// Check the stale subset of `candidates`
    ///
    /// # Errors
    ///
    /// `ToolError::ToolExecution` when checkstyle reports violations; nothing is
    /// committed in that case. Store, classpath and launch failures propagate.
    pub fn run(
        &mut self,
        candidates: &[Arc<dyn BuildUnit>],
        groups: &dyn GroupPartition,
    ) -> Result<RunOutcome, ToolError> {
        self.phase = RunPhase::Idle;
        if self.config.skip {
            info!("Skipping checkstyle");
            return Ok(RunOutcome::Disabled);
        }

        let start = Instant::now();
        self.enter(RunPhase::Filtering);
        let targets: Vec<Arc<dyn BuildUnit>> = candidates
            .iter()
            .filter(|unit| Self::is_checked(unit.as_ref()))
            .cloned()
            .collect();
        debug!(candidates = candidates.len(), checkable = targets.len(), "Filtered targets");

        self.enter(RunPhase::CheckingInvalidation);
        let invalidation = self.tracker.check(&targets)?;
        if invalidation.is_up_to_date() {
            self.enter(RunPhase::Done);
            info!(targets = targets.len(), "All targets up to date");
            return Ok(RunOutcome::Skipped {
                checked_targets: targets.len(),
            });
        }

        self.enter(RunPhase::CollectingSources);
        let invalid_units = invalidation.invalid_units();
        let sources = Self::calculate_sources(&invalid_units);
        if sources.is_empty() {
            self.enter(RunPhase::Done);
            info!(invalid = invalid_units.len(), "Invalid targets have no Java sources");
            return Ok(RunOutcome::NoWork {
                invalid_targets: invalid_units.len(),
            });
        }

        self.enter(RunPhase::ResolvingClasspath);
        let classpath = self.resolve_classpath(&invalid_units, groups)?;
        let args = self.fixed_args()?;

        self.enter(RunPhase::Invoking);
        let (code, batches) = self.invoke(classpath, args, &sources)?;
        if code != 0 {
            self.enter(RunPhase::Done);
            warn!(code, "checkstyle reported failures; not recording targets");
            return Err(ToolError::ToolExecution {
                tool: TOOL_NAME.to_string(),
                main: CHECKSTYLE_MAIN.to_string(),
                code,
            });
        }

        self.enter(RunPhase::Committing);
        self.tracker.commit(&invalidation.invalid)?;
        self.enter(RunPhase::Done);

        let committed: Vec<String> = invalidation
            .invalid_addresses()
            .into_iter()
            .map(String::from)
            .collect();
        info!(
            targets = committed.len(),
            sources = sources.len(),
            batches,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "checkstyle passed"
        );
        Ok(RunOutcome::Success {
            committed,
            sources: sources.len(),
            batches,
        })
    }

    /// Invalidation check only: no tool invocation, no commit
    pub fn status(
        &self,
        candidates: &[Arc<dyn BuildUnit>],
    ) -> Result<InvalidationResult, ToolError> {
        let targets: Vec<Arc<dyn BuildUnit>> = candidates
            .iter()
            .filter(|unit| Self::is_checked(unit.as_ref()))
            .cloned()
            .collect();
        self.tracker.check(&targets)
    }

    /// Forget all recorded checks
    pub fn clean(&mut self) -> Result<(), ToolError> {
        self.tracker.invalidate_all()
    }

    /// Java sources of `targets`, deduplicated and sorted
    pub fn calculate_sources(targets: &[Arc<dyn BuildUnit>]) -> Vec<String> {
        let sources: BTreeSet<String> = targets
            .iter()
            .flat_map(|target| target.sources().iter())
            .filter(|source| has_extension(source, JAVA_SOURCE_EXTENSION))
            .map(|source| source.to_string_lossy().into_owned())
            .collect();
        sources.into_iter().collect()
    }

    fn enter(&mut self, phase: RunPhase) {
        debug!(from = ?self.phase, to = ?phase, "checkstyle phase");
        self.phase = phase;
    }

    /// Bootstrap jars plus the dependency classpath of the first invalid target's group.
    ///
    /// Targets from other groups are checked against that same classpath; a
    /// conflicting group is logged, not split into its own invocation.
    fn resolve_classpath(
        &self,
        invalid_units: &[Arc<dyn BuildUnit>],
        groups: &dyn GroupPartition,
    ) -> Result<Vec<PathBuf>, ToolError> {
        let first = invalid_units
            .first()
            .ok_or_else(|| ToolError::configuration("No invalid targets to resolve"))?;
        let key = groups.group_key_for(first.as_ref());

        for unit in invalid_units.iter().skip(1) {
            let other: ExclusiveGroupKey = groups.group_key_for(unit.as_ref());
            if !key.is_compatible_with(&other) {
                warn!(
                    group = %key,
                    target_address = unit.address(),
                    target_group = %other,
                    "Target belongs to a conflicting exclusive group; checking it with the classpath of {}",
                    first.address()
                );
            }
        }

        let bootstrap = self.tools.tool_classpath(CHECKSTYLE_BOOTSTRAP_KEY)?;
        ClasspathResolver::new(groups).resolve(&bootstrap, &key, &self.config.confs)
    }

    /// `-c <config> -f plain [-p <properties>]`, writing the properties file if needed
    fn fixed_args(&self) -> Result<Vec<String>, ToolError> {
        let configuration = self
            .config
            .configuration
            .as_ref()
            .ok_or_else(|| ToolError::configuration("No checkstyle configuration file set"))?;

        let mut args = vec![
            "-c".to_string(),
            configuration.to_string_lossy().into_owned(),
            "-f".to_string(),
            "plain".to_string(),
        ];

        if !self.config.properties.is_empty() {
            let properties_file = self
                .config
                .workdir_in(&self.build_root)
                .join(PROPERTIES_FILE_NAME);
            write_properties(
                self.file_system.as_ref(),
                &properties_file,
                &self.config.properties,
            )?;
            args.push("-p".to_string());
            args.push(properties_file.to_string_lossy().into_owned());
        }

        Ok(args)
    }

    /// Returns the aggregate exit code and the number of batches run
    fn invoke(
        &self,
        classpath: Vec<PathBuf>,
        args: Vec<String>,
        sources: &[String],
    ) -> Result<(i32, usize), ToolError> {
        let overhead = self.runner.launcher_overhead()
            + arg_len("-cp")
            + arg_len(&join_classpath(&classpath))
            + arg_len(CHECKSTYLE_MAIN)
            + args.iter().map(|a| arg_len(a)).sum::<usize>();

        let batcher =
            ArgumentBatcher::new(self.config.max_command_length).with_fixed_overhead(overhead);
        let batches = batcher.batches(sources).len();
        info!(sources = sources.len(), batches, "Running checkstyle");

        let runner = self.runner.clone();
        let code = batcher.execute(sources, |batch| {
            let mut invocation_args = args.clone();
            invocation_args.extend(batch.iter().cloned());
            runner.run_java(&JavaInvocation {
                classpath: classpath.clone(),
                main: CHECKSTYLE_MAIN.to_string(),
                args: invocation_args,
                workunit_name: TOOL_NAME.to_string(),
            })
        })?;

        Ok((code, batches))
    }
}
