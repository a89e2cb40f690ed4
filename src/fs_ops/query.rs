//! Metadata queries: size, type code, symlink target.
//!
//! A list-valued filename yields a list result in input order; any failing
//! element fails the whole query and nothing is written back.

use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::classify::{Disposition, OpKind, classify};
use crate::errors::OpError;
use crate::operand::Operand;
use crate::path::compose;
use crate::platform;
use crate::resolve::{Resolved, ResolutionContext, assign, resolve, resolve_names};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub path: Operand,
    pub filename: Operand,
    /// Where the result (scalar or list) is written.
    pub output: Operand,
}

impl QueryConfig {
    pub fn new(path: Operand, filename: Operand, output: Operand) -> Self {
        Self { path, filename, output }
    }

    pub(crate) fn operands(&self) -> Vec<(&'static str, &Operand)> {
        vec![("path", &self.path), ("filename", &self.filename), ("output", &self.output)]
    }
}

pub fn run_size(cfg: &QueryConfig, ctx: &mut ResolutionContext<'_>) -> Result<(), OpError> {
    query_each(cfg, ctx, OpKind::Size, file_size)
}

pub fn run_type(cfg: &QueryConfig, ctx: &mut ResolutionContext<'_>) -> Result<(), OpError> {
    query_each(cfg, ctx, OpKind::Type, type_code)
}

pub fn run_readlink(cfg: &QueryConfig, ctx: &mut ResolutionContext<'_>) -> Result<(), OpError> {
    query_each(cfg, ctx, OpKind::ReadLink, link_target)
}

fn query_each<F>(cfg: &QueryConfig, ctx: &mut ResolutionContext<'_>, op: OpKind, query: F) -> Result<(), OpError>
where
    F: Fn(&Path) -> Result<Value, OpError>,
{
    let dir = resolve(&cfg.path, ctx)?;
    let result = match resolve_names(&cfg.filename, ctx)? {
        Resolved::Scalar(name) => query(Path::new(&compose(&dir, &name)))?,
        Resolved::List(names) => Value::Array(
            names
                .iter()
                .map(|name| query(Path::new(&compose(&dir, name))))
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };
    debug!(op = op.as_str(), result = %result, "query complete");
    assign(&cfg.output, ctx, result)
}

fn file_size(path: &Path) -> Result<Value, OpError> {
    let meta = fs::metadata(path).map_err(|e| OpError::io(OpKind::Size, "stat", path, e))?;
    Ok(Value::from(meta.len()))
}

/// F regular file, D directory, C character device, S anything else
/// (symlinks are not followed).
fn type_code(path: &Path) -> Result<Value, OpError> {
    let meta = fs::symlink_metadata(path).map_err(|e| OpError::io(OpKind::Type, "lstat", path, e))?;
    let ft = meta.file_type();
    let code = if ft.is_file() {
        "F"
    } else if ft.is_dir() {
        "D"
    } else if platform::is_char_device(&ft) {
        "C"
    } else {
        "S"
    };
    Ok(Value::from(code))
}

fn link_target(path: &Path) -> Result<Value, OpError> {
    match fs::read_link(path) {
        Ok(target) => Ok(Value::from(target.to_string_lossy().into_owned())),
        Err(e) => match classify(OpKind::ReadLink, &e) {
            Disposition::Ignorable => Ok(Value::from("")),
            Disposition::Recoverable | Disposition::Fatal => {
                Err(OpError::io(OpKind::ReadLink, "read symlink", path, e))
            }
        },
    }
}
