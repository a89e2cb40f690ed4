//! Typed error definitions for fsops.
//! One enum covers operand resolution, configuration and filesystem failures;
//! `code()` gives a stable short name for structured logs.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::classify::OpKind;
use crate::fs_ops::helpers::describe_io_error;
use crate::operand::OperandKind;

#[derive(Debug, Error)]
pub enum OpError {
    #[error("no value found for {kind} operand '{selector}'")]
    MissingField { kind: OperandKind, selector: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid value at '{selector}': {reason}")]
    InvalidValue { selector: String, reason: String },

    #[error("{}", describe_io_error(.action, .path, .source))]
    Io {
        op: OpKind,
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "copied '{}' to '{}' but could not remove the source; both copies remain: {source}",
        .src.display(),
        .dest.display()
    )]
    SourceNotRemoved {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("insufficient space for '{}': need {required} bytes, have {available} bytes", .dest.display())]
    InsufficientSpace {
        dest: PathBuf,
        required: u64,
        available: u64,
    },

    #[error("invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to decompress '{}': {source}", .path.display())]
    Decompress {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OpError {
    /// Wrap an io::Error raised by `action` on `path` during operation `op`.
    pub fn io(op: OpKind, action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        OpError::Io {
            op,
            action,
            path: path.into(),
            source,
        }
    }

    /// Stable short identifier for logs and error descriptors.
    pub fn code(&self) -> &'static str {
        match self {
            OpError::MissingField { .. } => "missing_field",
            OpError::InvalidConfig(_) => "invalid_config",
            OpError::InvalidValue { .. } => "invalid_value",
            OpError::Io { .. } => "io",
            OpError::SourceNotRemoved { .. } => "source_not_removed",
            OpError::InsufficientSpace { .. } => "insufficient_space",
            OpError::InvalidPattern { .. } => "invalid_pattern",
            OpError::Decompress { .. } => "decompress",
        }
    }

    /// Underlying OS error, when the failure came from a filesystem call.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            OpError::Io { source, .. }
            | OpError::SourceNotRemoved { source, .. }
            | OpError::Decompress { source, .. } => Some(source),
            _ => None,
        }
    }
}
