use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Incremental checkstyle runner for Java build targets
#[derive(Parser, Debug)]
#[command(
    name = "stylegate",
    about = "Incremental checkstyle runner for Java build targets",
    version,
    author,
    long_about = "stylegate runs checkstyle over the Java targets of a build root, \
                  re-checking only the targets whose sources or options changed since \
                  their last clean run. Targets, exclusive groups and tool jars are read \
                  from a BUILD.toml manifest."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run checkstyle over changed targets",
        long_about = "Fingerprints every Java target in the manifest, runs checkstyle over \
                      the sources of the targets that changed, and records them as checked \
                      when checkstyle passes.\n\n\
                      Examples:\n  \
                      stylegate check\n  \
                      stylegate check --root /path/to/repo\n  \
                      stylegate check --configuration build-support/checkstyle.xml"
    )]
    Check(CheckArgs),

    #[command(
        about = "Show which targets would be checked",
        long_about = "Runs the invalidation check only. Nothing is executed and nothing is \
                      recorded.\n\n\
                      Examples:\n  \
                      stylegate status\n  \
                      stylegate status --format json"
    )]
    Status(StatusArgs),

    #[command(about = "Forget every recorded check so the next run checks all targets")]
    Clean(CleanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct WorkspaceArgs {
    #[arg(
        long,
        value_name = "PATH",
        help = "Build root (defaults to current directory)"
    )]
    pub root: Option<PathBuf>,

    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        help = "Config file (defaults to stylegate.toml in the build root)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'm',
        long,
        value_name = "FILE",
        help = "Build manifest (defaults to BUILD.toml in the build root)"
    )]
    pub manifest: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Directory for stylegate state")]
    pub workdir: Option<PathBuf>,
}

/// Options that feed the task fingerprint, shared by `check` and `status` so
/// both see the same targets as up to date
#[derive(Args, Debug, Clone, Default)]
pub struct TaskArgs {
    #[arg(long, value_name = "FILE", help = "Checkstyle XML configuration")]
    pub configuration: Option<PathBuf>,

    #[arg(
        long = "conf",
        value_name = "CONF",
        help = "Ivy configuration to put on the classpath (repeatable)"
    )]
    pub confs: Vec<String>,

    #[arg(
        short = 'D',
        long = "property",
        value_name = "KEY=VALUE",
        value_parser = parse_property,
        help = "Checkstyle property (repeatable)"
    )]
    pub properties: Vec<(String, String)>,

    #[arg(long, value_name = "BYTES", help = "Upper bound on one command line")]
    pub max_command_length: Option<usize>,

    #[arg(long, value_name = "PATH", help = "Java binary")]
    pub java: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[command(flatten)]
    pub task: TaskArgs,

    #[arg(long, help = "Skip checkstyle entirely")]
    pub skip: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[command(flatten)]
    pub task: TaskArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

fn parse_property(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("Invalid property: {}. Expected KEY=VALUE", s)),
    }
}
