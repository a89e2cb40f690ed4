//! Directory creation: a named directory, or a uniquely named temp directory.

use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::classify::{Disposition, OpKind, classify};
use crate::errors::OpError;
use crate::operand::Operand;
use crate::path::compose;
use crate::platform;
use crate::resolve::{ResolutionContext, assign, resolve};

use super::util::parent_dir;

pub const DEFAULT_DIR_MODE: u32 = 0o777;
/// mkdtemp's own mode; applied explicitly on the fallback path as well.
pub const DEFAULT_TEMP_DIR_MODE: u32 = 0o700;
const TEMP_SUFFIX_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MkdirConfig {
    pub path: Operand,
    pub dirname: Operand,
    pub mode: u32,
    /// Optional target for the full composed path.
    pub fullpath: Option<Operand>,
}

impl MkdirConfig {
    pub fn new(path: Operand, dirname: Operand) -> Self {
        Self {
            path,
            dirname,
            mode: DEFAULT_DIR_MODE,
            fullpath: None,
        }
    }

    pub(crate) fn operands(&self) -> Vec<(&'static str, &Operand)> {
        let mut v = vec![("path", &self.path), ("dirname", &self.dirname)];
        if let Some(fp) = &self.fullpath {
            v.push(("fullpath", fp));
        }
        v
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MkTempDirConfig {
    pub path: Operand,
    pub prefix: Operand,
    pub mode: u32,
    /// Always receives the created directory's full path.
    pub output: Operand,
}

impl MkTempDirConfig {
    pub fn new(path: Operand, prefix: Operand, output: Operand) -> Self {
        Self {
            path,
            prefix,
            mode: DEFAULT_TEMP_DIR_MODE,
            output,
        }
    }

    pub(crate) fn operands(&self) -> Vec<(&'static str, &Operand)> {
        vec![("path", &self.path), ("prefix", &self.prefix), ("output", &self.output)]
    }
}

pub fn run_mkdir(cfg: &MkdirConfig, ctx: &mut ResolutionContext<'_>) -> Result<(), OpError> {
    let target = compose(&resolve(&cfg.path, ctx)?, &resolve(&cfg.dirname, ctx)?);
    let path = Path::new(&target);
    match platform::create_dir_with_mode(path, cfg.mode) {
        Ok(()) => info!(path = %path.display(), mode = %format!("{:o}", cfg.mode), "Created directory"),
        Err(e) => match classify(OpKind::Mkdir, &e) {
            Disposition::Ignorable => debug!(path = %path.display(), "Directory already exists"),
            Disposition::Recoverable | Disposition::Fatal => {
                return Err(OpError::io(OpKind::Mkdir, "create directory", path, e));
            }
        },
    }
    if let Some(fullpath) = &cfg.fullpath {
        assign(fullpath, ctx, Value::from(target))?;
    }
    Ok(())
}

pub fn run_mktempdir(cfg: &MkTempDirConfig, ctx: &mut ResolutionContext<'_>) -> Result<(), OpError> {
    let prefix = compose(&resolve(&cfg.path, ctx)?, &resolve(&cfg.prefix, ctx)?);
    let created = make_temp_dir(&prefix)?;
    platform::set_mode(&created, cfg.mode)
        .map_err(|e| OpError::io(OpKind::MkTempDir, "set directory mode", &created, e))?;
    info!(path = %created.display(), "Created temporary directory");
    assign(&cfg.output, ctx, Value::from(created.to_string_lossy().into_owned()))
}

/// mkdtemp where the platform has it; otherwise `tempfile` picks the suffix
/// and retries on collision.
fn make_temp_dir(prefix: &str) -> Result<PathBuf, OpError> {
    match platform::mkdtemp(prefix) {
        Ok(p) => return Ok(p),
        Err(e) if e.kind() == io::ErrorKind::Unsupported => {
            debug!("mkdtemp unavailable; using tempfile builder");
        }
        Err(e) => {
            return Err(OpError::io(OpKind::MkTempDir, "create temporary directory", prefix, e));
        }
    }
    builder_temp_dir(prefix).map_err(|e| OpError::io(OpKind::MkTempDir, "create temporary directory", prefix, e))
}

/// `prefix` is "<dir>/<name-prefix>"; a trailing separator means an empty name prefix.
fn builder_temp_dir(prefix: &str) -> io::Result<PathBuf> {
    let (dir, name) = match prefix.chars().last() {
        Some(c) if std::path::is_separator(c) => (Path::new(prefix), ""),
        _ => {
            let p = Path::new(prefix);
            let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
            (parent_dir(p), name)
        }
    };
    let dir = tempfile::Builder::new()
        .prefix(name)
        .rand_bytes(TEMP_SUFFIX_LEN)
        .tempdir_in(dir)?;
    Ok(dir.keep())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fallback_keeps_prefix_and_directory() {
        let root = tempfile::tempdir().unwrap();
        let prefix = format!("{}/job-", root.path().display());
        let a = builder_temp_dir(&prefix).unwrap();
        let b = builder_temp_dir(&prefix).unwrap();
        assert_ne!(a, b);
        assert!(a.is_dir() && b.is_dir());
        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("job-") && name.len() == "job-".len() + TEMP_SUFFIX_LEN, "{name}");
    }

    #[test]
    fn builder_fallback_with_trailing_separator() {
        let root = tempfile::tempdir().unwrap();
        let prefix = format!("{}{}", root.path().display(), std::path::MAIN_SEPARATOR);
        let made = builder_temp_dir(&prefix).unwrap();
        assert_eq!(made.parent(), Some(root.path()));
        assert_eq!(made.file_name().unwrap().len(), TEMP_SUFFIX_LEN);
    }
}
