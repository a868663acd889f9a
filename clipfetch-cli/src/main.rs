//! Clipfetch CLI - Command-line interface
//!
//! Resolves short-video links to downloadable media URLs.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clipfetch_core::config::ClipfetchConfig;
use clipfetch_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "clipfetch")]
#[command(about = "Resolve short-video links to downloadable media")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Console log level (RUST_LOG overrides)
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn, global = true)]
    log_level: CliLogLevel,

    /// Directory for the per-run debug log
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    /// Per-endpoint deadline in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
}

impl Cli {
    fn config(&self) -> ClipfetchConfig {
        let mut config = ClipfetchConfig::from_env();
        if let Some(millis) = self.timeout_ms {
            config.network.request_timeout = Duration::from_millis(millis);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())?;

    let config = cli.config();
    commands::handle_command(cli.command, config).await
}
