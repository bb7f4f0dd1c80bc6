// shelfsync CLI - headless retail-media ad/sales syncs

mod exit_codes;
mod sync;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "shelfsync")]
#[command(about = "Reconcile retail-media advertising against total sales")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log progress to stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a sync from a TOML config file
    #[command(after_help = "\
Examples:
  shelfsync sync callaway.toml
  shelfsync sync callaway.toml --date 2026-01-15 --lookback 14
  shelfsync sync callaway.toml --since 2026-01-01 --date 2026-01-31 --json
  shelfsync sync callaway.toml --output result.json")]
    Sync {
        /// Path to the sync config file
        config: PathBuf,

        /// Last day of the window (YYYY-MM-DD, default: today in UTC)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Days to look back from --date (default: lookback_days from config)
        #[arg(long, conflicts_with = "since")]
        lookback: Option<u32>,

        /// First day of the window (YYYY-MM-DD); replaces --lookback
        #[arg(long, value_parser = parse_date)]
        since: Option<NaiveDate>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a sync config without running
    #[command(after_help = "\
Examples:
  shelfsync validate callaway.toml")]
    Validate {
        /// Path to the sync config file
        config: PathBuf,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  shelfsync-recon ", env!("CARGO_PKG_VERSION"),
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Sync { config, date, lookback, since, json, output } => {
            let window = sync::WindowArgs { date, lookback, since };
            sync::cmd_sync(config, window, json, output)
        }
        Commands::Validate { config } => sync::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<shelfsync_recon::ReconError> for CliError {
    fn from(err: shelfsync_recon::ReconError) -> Self {
        Self::new(exit_codes::recon_exit_code(&err), err.to_string())
    }
}
