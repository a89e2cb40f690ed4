//! Application orchestrator.
//! Merges config and CLI flags, initializes logging, installs the Ctrl-C
//! handler, loads the pipeline and feeds it messages one at a time.

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use fsops::config::PIPELINE_ENV;
use fsops::output as out;
use fsops::{Config, Pipeline, load_pipeline, shutdown};

use crate::cli::Args;
use crate::logging::init_tracing;

const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct Tally {
    processed: usize,
    failed: usize,
}

/// Run the CLI application. Exit code is non-zero when any message failed.
pub fn run(args: Args) -> Result<ExitCode> {
    let mut cfg = Config::default();
    args.apply_overrides(&mut cfg);

    if args.print_config {
        print_config(&cfg);
        return Ok(ExitCode::SUCCESS);
    }

    // Held until the end of `run` so file-log events from an interrupted
    // message are still flushed.
    let guard = init_tracing(cfg.log_level, cfg.log_file.as_deref(), cfg.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;

    ctrlc::set_handler(|| {
        shutdown::request();
        out::print_warn("Received interrupt; finishing the current message...");
    })
    .context("install signal handler")?;

    debug!(?args, "Starting fsops");

    let result = (|| -> Result<Tally> {
        let path = cfg
            .pipeline_file
            .clone()
            .ok_or_else(|| anyhow!("no pipeline file: pass --pipeline or set {PIPELINE_ENV}"))?;
        let pipeline = load_pipeline(&path)?;

        match &args.message {
            Some(raw) => Ok(process_line(&pipeline, raw, cfg.follow_errors, Tally::default())),
            None => process_stdin(&pipeline, cfg.follow_errors),
        }
    })();

    let code = match result {
        Ok(tally) => {
            info!(processed = tally.processed, failed = tally.failed, "Done");
            if tally.failed == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "fsops aborted");
            out::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    };

    drop(guard);
    Ok(code)
}

/// Lines are read on a separate thread so an interrupt is noticed while
/// stdin is idle, not only when the next line arrives.
fn process_stdin(pipeline: &Pipeline, follow_errors: bool) -> Result<Tally> {
    let lines = spawn_stdin_reader()?;
    let mut tally = Tally::default();
    loop {
        if shutdown::is_requested() {
            warn!("Shutdown requested; not reading further messages");
            break;
        }
        match lines.recv_timeout(SHUTDOWN_POLL) {
            Ok(line) => {
                let line = line.context("read message from stdin")?;
                if line.trim().is_empty() {
                    continue;
                }
                tally = process_line(pipeline, &line, follow_errors, tally);
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(tally)
}

fn spawn_stdin_reader() -> Result<Receiver<io::Result<String>>> {
    let (tx, rx) = mpsc::sync_channel(16);
    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("spawn stdin reader")?;
    Ok(rx)
}

fn process_line(pipeline: &Pipeline, raw: &str, follow_errors: bool, mut tally: Tally) -> Tally {
    tally.processed += 1;
    let msg: Value = match serde_json::from_str(raw.trim()) {
        Ok(v) => v,
        Err(e) => {
            out::print_error(&format!("message {} is not valid JSON: {e}", tally.processed));
            tally.failed += 1;
            return tally;
        }
    };

    let report = pipeline.run(msg, follow_errors);
    for failure in &report.failures {
        out::print_error(&out::describe_failure(failure));
    }
    if !report.completed && report.failures.is_empty() {
        out::print_warn(&format!("message {} stopped before the end of the pipeline", tally.processed));
    }
    out::print_message(&report.message);
    if !report.succeeded() {
        tally.failed += 1;
    }
    tally
}

fn print_config(cfg: &Config) {
    if let Ok(p) = std::env::var(PIPELINE_ENV) {
        out::print_info(&format!("Using {PIPELINE_ENV} (explicit):\n  {p}"));
    }
    match &cfg.pipeline_file {
        Some(p) => {
            out::print_info(&format!("Pipeline file:\n  {}", p.display()));
            if !p.exists() {
                out::print_warn("No pipeline file exists there yet.");
            }
        }
        None => out::print_error("Could not determine a default pipeline path."),
    }
}
