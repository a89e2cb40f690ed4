//! User-facing printing for the `fsops` host.
//! Result messages go to stdout as plain JSON lines so they can be piped;
//! everything else goes to stderr, colored only when stderr is a TTY.

use owo_colors::OwoColorize;
use serde_json::Value;

use crate::pipeline::NodeFailure;

fn is_tty() -> bool {
    atty::is(atty::Stream::Stderr)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "info:".cyan().bold(), msg);
    } else {
        eprintln!("info: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {msg}");
    }
}

/// One compact JSON line on stdout.
pub fn print_message(msg: &Value) {
    println!("{msg}");
}

pub fn describe_failure(f: &NodeFailure) -> String {
    format!("node '{}' failed [{}]: {}", f.node_id, f.code, f.message)
}
