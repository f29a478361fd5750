//! Gantry - Deployment bundle generator for React Router apps

mod cli;
mod exit_codes;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(&cli);
    cli.execute()
}

/// Console logging honors RUST_LOG, defaulting to a level picked from the
/// global flags. A debug-level JSON log under ~/.gantry/logs/ records every
/// run; a missing or unwritable home directory just disables it.
fn init_tracing(cli: &Cli) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(console_filter);

    let Some(log_dir) = log_directory() else {
        tracing_subscriber::registry().with(console_layer).init();
        return None;
    };

    let appender = tracing_appender::rolling::daily(log_dir, "gantry.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(console_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new("debug")),
        )
        .init();
    Some(guard)
}

fn log_directory() -> Option<std::path::PathBuf> {
    let dir = dirs::home_dir()?.join(".gantry").join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}
