use stylegate::cli::commands::{CliArgs, Commands};
use stylegate::cli::handlers::{handle_check, handle_clean, handle_status};
use stylegate::VERSION;

use clap::Parser;
use std::env;
use std::sync::Once;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let args = CliArgs::parse();
    init_logging(&args);

    debug!("stylegate v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Check(check_args) => handle_check(check_args, args.quiet),
        Commands::Status(status_args) => handle_status(status_args),
        Commands::Clean(clean_args) => handle_clean(clean_args, args.quiet),
    };

    std::process::exit(exit_code);
}

/// `--log-level`, then `-v`/`-q`, then `STYLEGATE_LOG_LEVEL`; a set `RUST_LOG` replaces all of them
fn init_logging(args: &CliArgs) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let requested = args.log_level.clone().or_else(|| {
            if args.verbose {
                Some("debug".to_string())
            } else if args.quiet {
                Some("error".to_string())
            } else {
                env::var("STYLEGATE_LOG_LEVEL").ok()
            }
        });
        let level = requested.as_deref().map_or(Level::INFO, resolve_level);

        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!("stylegate={}", level))
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    });
}

fn resolve_level(raw: &str) -> Level {
    raw.parse::<Level>().unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level '{}', using info. Valid levels: trace, debug, info, warn, error",
            raw
        );
        Level::INFO
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level() {
        assert_eq!(resolve_level("debug"), Level::DEBUG);
        assert_eq!(resolve_level("WARN"), Level::WARN);
        assert_eq!(resolve_level("loud"), Level::INFO);
    }
}
