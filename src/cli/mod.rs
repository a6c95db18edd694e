pub mod commands;
pub mod handlers;

pub use commands::{CheckArgs, CleanArgs, CliArgs, Commands, OutputFormatArg, StatusArgs};
