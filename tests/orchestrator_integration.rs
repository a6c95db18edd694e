//! Incremental checkstyle runs against a real build root on disk
//!
//! Each task instance reopens the JSON invalidation store, so these tests
//! cover state carried between separate runs.

mod support;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stylegate::classpath::{BootstrapTools, JarProducts};
use stylegate::fs::RealFileSystem;
use stylegate::orchestrator::{CHECKSTYLE_BOOTSTRAP_KEY, CHECKSTYLE_MAIN};
use stylegate::products::JAR_PRODUCTS;
use stylegate::{
    BuildManifest, Checkstyle, Products, RunOutcome, ScriptedRunner, StylegateConfig, ToolError,
};
use support::{create_build_root, write};
use tempfile::TempDir;
use yare::parameterized;

struct Run {
    outcome: Result<RunOutcome, ToolError>,
    runner: Arc<ScriptedRunner>,
}

fn config() -> StylegateConfig {
    StylegateConfig {
        configuration: Some(PathBuf::from("checkstyle.xml")),
        ..StylegateConfig::default()
    }
}

fn run_with(root: &Path, config: StylegateConfig, runner: ScriptedRunner) -> Run {
    let manifest = BuildManifest::load(&root.join("BUILD.toml")).unwrap();
    let mut products = Products::new();
    manifest.populate(&mut products);

    let jars = products.get_data::<JarProducts>(JAR_PRODUCTS).unwrap();
    let mut tools = BootstrapTools::new(jars.as_ref().clone());
    tools.register_tool(CHECKSTYLE_BOOTSTRAP_KEY, config.bootstrap_tools.clone());

    let runner = Arc::new(runner);
    let mut task = Checkstyle::open(
        config,
        root.to_path_buf(),
        Arc::new(RealFileSystem::new()),
        Arc::new(tools),
        runner.clone(),
    )
    .unwrap();
    task.prepare(&mut products);

    let registry = manifest.registry().unwrap();
    let outcome = task.execute(&registry, &products);
    Run { outcome, runner }
}

fn run(root: &Path, codes: Vec<i32>) -> Run {
    run_with(root, config(), ScriptedRunner::new(codes))
}

fn source_args(run: &Run) -> Vec<Vec<String>> {
    run.runner
        .invocations()
        .iter()
        .map(|inv| {
            inv.args
                .iter()
                .filter(|a| a.ends_with(".java"))
                .cloned()
                .collect()
        })
        .collect()
}

#[test]
fn test_first_run_checks_all_java_targets() {
    let dir = TempDir::new().unwrap();
    create_build_root(dir.path());

    let first = run(dir.path(), vec![]);
    match first.outcome.unwrap() {
        RunOutcome::Success {
            committed,
            sources,
            batches,
        } => {
            assert_eq!(committed, vec!["src/java/a:a", "src/java/b:b"]);
            assert_eq!(sources, 2);
            assert_eq!(batches, 1);
        }
        other => panic!("Expected Success, got {:?}", other),
    }

    let invocations = first.runner.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].main, CHECKSTYLE_MAIN);
    assert_eq!(
        invocations[0].classpath,
        vec![
            PathBuf::from("3rdparty/checkstyle.jar"),
            PathBuf::from("3rdparty/guava.jar")
        ]
    );
    assert_eq!(&invocations[0].args[..4], &["-c", "checkstyle.xml", "-f", "plain"]);
    assert!(dir.path().join(".stylegate/invalidation.json").is_file());
}

#[test]
fn test_changed_target_only_is_rechecked() {
    let dir = TempDir::new().unwrap();
    create_build_root(dir.path());
    run(dir.path(), vec![]).outcome.unwrap();

    write(dir.path(), "src/java/a/A.java", "package a;\nclass A { int x; }\n");
    let second = run(dir.path(), vec![0]);

    match second.outcome.as_ref().unwrap().clone() {
        RunOutcome::Success { committed, .. } => assert_eq!(committed, vec!["src/java/a:a"]),
        other => panic!("Expected Success, got {:?}", other),
    }
    assert_eq!(source_args(&second), vec![vec!["src/java/a/A.java".to_string()]]);

    let third = run(dir.path(), vec![]);
    assert_eq!(
        third.outcome.unwrap(),
        RunOutcome::Skipped { checked_targets: 2 }
    );
    assert!(third.runner.invocations().is_empty());
}

#[test]
fn test_failed_run_is_retried() {
    let dir = TempDir::new().unwrap();
    create_build_root(dir.path());

    let failed = run(dir.path(), vec![2]);
    match failed.outcome {
        Err(err @ ToolError::ToolExecution { .. }) => {
            assert_eq!(err.exit_code(), Some(2));
            assert!(err.to_string().contains("(2)"));
        }
        other => panic!("Expected ToolExecution, got {:?}", other),
    }
    assert!(!dir.path().join(".stylegate/invalidation.json").exists());

    let retry = run(dir.path(), vec![]);
    assert_eq!(source_args(&retry).concat().len(), 2);
    assert!(matches!(retry.outcome, Ok(RunOutcome::Success { .. })));
}

#[test]
fn test_configuration_change_invalidates_everything() {
    let dir = TempDir::new().unwrap();
    create_build_root(dir.path());
    run(dir.path(), vec![]).outcome.unwrap();

    let mut changed = config();
    changed.properties = BTreeMap::from([("basedir".to_string(), "/src".to_string())]);
    let second = run_with(dir.path(), changed, ScriptedRunner::succeeding());

    match second.outcome.unwrap() {
        RunOutcome::Success { committed, .. } => assert_eq!(committed.len(), 2),
        other => panic!("Expected Success, got {:?}", other),
    }
    let properties =
        fs::read_to_string(dir.path().join(".stylegate/checkstyle.properties")).unwrap();
    assert_eq!(properties, "basedir=/src\n");
}

#[test]
fn test_corrupt_store_is_fatal() {
    let dir = TempDir::new().unwrap();
    create_build_root(dir.path());
    write(dir.path(), ".stylegate/invalidation.json", "{not json");

    let manifest = BuildManifest::load(&dir.path().join("BUILD.toml")).unwrap();
    let result = Checkstyle::open(
        config(),
        dir.path().to_path_buf(),
        Arc::new(RealFileSystem::new()),
        Arc::new(BootstrapTools::new(manifest.jar_products())),
        Arc::new(ScriptedRunner::succeeding()),
    );
    assert!(matches!(result, Err(ToolError::InvalidationStore(_))));
}

#[test]
fn test_missing_bootstrap_jars_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    create_build_root(dir.path());

    let mut config = config();
    config.bootstrap_tools = vec!["//:missing".to_string()];
    let result = run_with(dir.path(), config, ScriptedRunner::succeeding());

    assert!(matches!(result.outcome, Err(ToolError::Configuration(_))));
    assert!(result.runner.invocations().is_empty());
}

#[parameterized(
    roomy = { 32_768, 0, 1 },
    launcher_eats_limit = { 512, 400, 2 },
    tight = { 256, 10_000, 2 },
)]
fn test_batch_count_follows_command_length(max: usize, launcher: usize, expected: usize) {
    let dir = TempDir::new().unwrap();
    create_build_root(dir.path());

    let config = StylegateConfig {
        max_command_length: max,
        ..config()
    };
    let result = run_with(
        dir.path(),
        config,
        ScriptedRunner::succeeding().with_launcher_overhead(launcher),
    );

    match result.outcome.unwrap() {
        RunOutcome::Success { batches, .. } => assert_eq!(batches, expected),
        other => panic!("Expected Success, got {:?}", other),
    }
    assert_eq!(result.runner.invocations().len(), expected);
}
