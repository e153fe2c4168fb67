//! Command-line arguments
//!
//! Every scenario option is optional here so that unset flags fall through
//! to the config file and then to the built-in defaults.

use crate::core::styles::palette_to_clap;
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "drainq")]
#[command(about = "Run a producer/consumer drain scenario over a blocking queue")]
#[command(version)]
#[command(after_help = "Values not given on the command line come from the config file, then from the defaults.")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Number of messages to produce [default: 100]
    #[arg(short = 'n', long = "count", value_name = "COUNT")]
    pub count: Option<usize>,

    /// Pause after each produced message [default: 100]
    #[arg(long = "produce-interval-ms", value_name = "MS")]
    pub produce_interval_ms: Option<u64>,

    /// Simulated processing time per consumed message [default: 200]
    #[arg(long = "process-delay-ms", value_name = "MS")]
    pub process_delay_ms: Option<u64>,

    /// Idle time after which the consumer stops [default: 1000]
    #[arg(long = "drain-timeout-ms", value_name = "MS")]
    pub drain_timeout_ms: Option<u64>,

    /// How long to wait for the consumer once the producer is done [default: 10000]
    #[arg(long = "join-timeout-ms", value_name = "MS")]
    pub join_timeout_ms: Option<u64>,

    /// How often a waiting consumer re-checks for cancellation [default: 50]
    #[arg(long = "poll-interval-ms", value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Cancel the consumer if it misses the join timeout
    #[arg(long = "cancel-on-join-timeout", action = ArgAction::SetTrue)]
    pub cancel_on_join_timeout: bool,

    /// Suppress the per-message Produced/Consumed lines
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    pub quiet: bool,

    /// Print the final report as JSON
    #[arg(long = "json", action = ArgAction::SetTrue)]
    pub json: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force coloured output
    #[arg(long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,
}

impl Args {
    /// The clap command with build details in `--version` output
    pub fn command_with_build_info(color_enabled: bool) -> clap::Command {
        Self::command()
            .long_version(format!(
                "{}\nbuilt:         {}\ngit:           {}\nconfig schema: {}",
                env!("CARGO_PKG_VERSION"),
                crate::BUILD_TIME,
                crate::GIT_HASH,
                crate::CONFIG_SCHEMA_VERSION
            ))
            .styles(palette_to_clap(color_enabled))
    }

    /// Parse from an explicit argument list (first item is the program name)
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command_with_build_info(false).try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    /// Parse the process arguments, exiting on `--help`, `--version` or errors
    pub fn parse_from_env(color_enabled: bool) -> Self {
        let matches = Self::command_with_build_info(color_enabled).get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    /// Explicit colour choice from the command line, if any
    pub fn color_choice(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
