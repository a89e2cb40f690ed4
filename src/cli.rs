//! CLI definition and parsing.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - Without --message, newline-delimited JSON messages are read from stdin.

use clap::{Parser, ValueHint};
use std::path::PathBuf;
use std::str::FromStr;

use fsops::{Config, LogLevel};

/// Run a filesystem-action pipeline over JSON messages.
/// CLI flags override config defaults.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Run filesystem action pipelines (move, delete, access, dir, mkdir, zread, ...) over JSON messages"
)]
pub struct Args {
    /// Pipeline XML file. Defaults to $FSOPS_PIPELINE or the per-user config directory.
    #[arg(long, short = 'p', value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub pipeline: Option<PathBuf>,

    /// Process this single JSON message instead of reading stdin.
    #[arg(long, short = 'm', value_name = "JSON")]
    pub message: Option<String>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, value_parser = LogLevel::from_str, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<LogLevel>,

    /// Also write logs to this file (refused if an ancestor is a symlink).
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON.
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Keep passing messages that an access check routed to its error port.
    #[arg(long, help = "Continue the pipeline with messages routed to an error port")]
    pub follow_errors: bool,

    /// Print which pipeline file would be used, then exit.
    #[arg(long, help = "Print the pipeline file location used by fsops and exit")]
    pub print_config: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level
    }

    /// Apply CLI overrides to a Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(p) = &self.pipeline {
            cfg.pipeline_file = Some(p.clone());
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(f) = &self.log_file {
            cfg.log_file = Some(f.clone());
        }
        if self.json {
            cfg.json = true;
        }
        if self.follow_errors {
            cfg.follow_errors = true;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
