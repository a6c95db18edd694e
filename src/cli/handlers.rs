//! Subcommand handlers
//!
//! Each handler returns the process exit code: 0 on success, 1 on any error.

use super::commands::{
    CheckArgs, CleanArgs, OutputFormatArg, StatusArgs, TaskArgs, WorkspaceArgs,
};
use crate::classpath::{BootstrapTools, JarProducts};
use crate::config::StylegateConfig;
use crate::error::ToolError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::manifest::{BuildManifest, DEFAULT_MANIFEST_FILE};
use crate::orchestrator::{
    Checkstyle, RunOutcome, CHECKSTYLE_BOOTSTRAP_KEY, INVALIDATION_STORE_FILE,
};
use crate::process::JavaRunner;
use crate::products::{Products, JAR_PRODUCTS};
use anyhow::{Context, Result};
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Build root, validated config and parsed manifest of one invocation
struct Workspace {
    build_root: PathBuf,
    config: StylegateConfig,
    manifest: BuildManifest,
}

impl Workspace {
    fn load(args: &WorkspaceArgs, overrides: impl FnOnce(&mut StylegateConfig)) -> Result<Self> {
        let build_root = match &args.root {
            Some(root) => root.clone(),
            None => env::current_dir().context("Failed to determine current directory")?,
        };

        let mut config = StylegateConfig::load(&build_root, args.config.as_deref())
            .context("Failed to load configuration")?;
        if let Some(workdir) = &args.workdir {
            config.workdir = workdir.clone();
        }
        overrides(&mut config);

        let manifest_path = args
            .manifest
            .clone()
            .unwrap_or_else(|| build_root.join(DEFAULT_MANIFEST_FILE));
        let manifest = BuildManifest::load(&manifest_path)
            .with_context(|| format!("Failed to load manifest {}", manifest_path.display()))?;

        debug!("Configuration: {:?}", config);
        Ok(Self {
            build_root,
            config,
            manifest,
        })
    }

    /// Publish the manifest's products and open the checkstyle task over them
    fn open_task(&self, products: &mut Products) -> Result<Checkstyle> {
        self.manifest.populate(products);

        let jars = products.get_data::<JarProducts>(JAR_PRODUCTS)?;
        let mut tools = BootstrapTools::new(jars.as_ref().clone());
        tools.register_tool(CHECKSTYLE_BOOTSTRAP_KEY, self.config.bootstrap_tools.clone());

        let runner = JavaRunner::new(self.config.java.clone(), self.build_root.clone())
            .with_jvm_options(self.config.jvm_options.clone());

        let task = Checkstyle::open(
            self.config.clone(),
            self.build_root.clone(),
            Arc::new(RealFileSystem::new()),
            Arc::new(tools),
            Arc::new(runner),
        )
        .context("Failed to open invalidation store")?;
        task.prepare(products);
        Ok(task)
    }

    /// Forget all recorded checks; a store that cannot be loaded is deleted outright
    fn clean(&self) -> Result<()> {
        let mut products = Products::new();
        match self.open_task(&mut products) {
            Ok(mut task) => task.clean().context("Failed to clear invalidation store"),
            Err(e) if is_store_error(&e) => {
                let path = self
                    .config
                    .workdir_in(&self.build_root)
                    .join(INVALIDATION_STORE_FILE);
                warn!("Discarding invalidation store {}: {:#}", path.display(), e);
                RealFileSystem::new()
                    .remove_file(&path)
                    .context("Failed to remove invalidation store")
            }
            Err(e) => Err(e),
        }
    }
}

fn is_store_error(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<ToolError>(),
        Some(ToolError::InvalidationStore(_))
    )
}

pub fn handle_check(args: &CheckArgs, quiet: bool) -> i32 {
    match run_check(args) {
        Ok(outcome) => {
            if !quiet {
                println!("{}", describe_outcome(&outcome));
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn run_check(args: &CheckArgs) -> Result<RunOutcome> {
    let workspace = Workspace::load(&args.workspace, |config| {
        apply_task_flags(config, &args.task);
        if args.skip {
            config.skip = true;
        }
    })?;
    workspace
        .config
        .validate()
        .context("Invalid configuration")?;

    let mut products = Products::new();
    let mut task = workspace.open_task(&mut products)?;
    let registry = workspace.manifest.registry()?;

    Ok(task.execute(&registry, &products)?)
}

/// Flags that change the task fingerprint; `check` and `status` must apply the same set
fn apply_task_flags(config: &mut StylegateConfig, args: &TaskArgs) {
    if let Some(configuration) = &args.configuration {
        config.configuration = Some(configuration.clone());
    }
    if !args.confs.is_empty() {
        config.confs = args.confs.iter().cloned().collect();
    }
    for (key, value) in &args.properties {
        config.properties.insert(key.clone(), value.clone());
    }
    if let Some(max) = args.max_command_length {
        config.max_command_length = max;
    }
    if let Some(java) = &args.java {
        config.java = java.clone();
    }
}

fn describe_outcome(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Disabled => "checkstyle skipped".to_string(),
        RunOutcome::Skipped { checked_targets } => {
            format!("All {} target(s) up to date", checked_targets)
        }
        RunOutcome::NoWork { invalid_targets } => format!(
            "{} changed target(s), no Java sources to check",
            invalid_targets
        ),
        RunOutcome::Success {
            committed,
            sources,
            batches,
        } => format!(
            "checkstyle passed: {} target(s), {} source(s), {} invocation(s)",
            committed.len(),
            sources,
            batches
        ),
    }
}

#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    valid: Vec<&'a str>,
    invalid: Vec<&'a str>,
}

pub fn handle_status(args: &StatusArgs) -> i32 {
    match run_status(args) {
        Ok(report) => {
            println!("{}", report);
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn run_status(args: &StatusArgs) -> Result<String> {
    let workspace =
        Workspace::load(&args.workspace, |config| apply_task_flags(config, &args.task))?;
    let mut products = Products::new();
    let task = workspace.open_task(&mut products)?;
    let registry = workspace.manifest.registry()?;

    let result = task.status(&registry.targets(Checkstyle::is_checked))?;
    let report = StatusReport {
        valid: result.valid_addresses(),
        invalid: result.invalid_addresses(),
    };

    match args.format {
        OutputFormatArg::Json => {
            serde_json::to_string_pretty(&report).context("Failed to serialize status")
        }
        OutputFormatArg::Human => Ok(format_status_human(&report)),
    }
}

fn format_status_human(report: &StatusReport<'_>) -> String {
    let mut out = String::new();
    out.push_str(&format!("Up to date ({}):\n", report.valid.len()));
    for address in &report.valid {
        out.push_str(&format!("  {}\n", address));
    }
    out.push_str(&format!("Needs checking ({}):\n", report.invalid.len()));
    for address in &report.invalid {
        out.push_str(&format!("  {}\n", address));
    }
    out.trim_end().to_string()
}

pub fn handle_clean(args: &CleanArgs, quiet: bool) -> i32 {
    let result = Workspace::load(&args.workspace, |_| {}).and_then(|workspace| workspace.clean());

    match result {
        Ok(()) => {
            if !quiet {
                println!("Cleared recorded checks");
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}
