//! Delete files or empty directories.
//! unlink first; a directory target retries as rmdir; an absent target is success.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::classify::{Disposition, OpKind, classify};
use crate::errors::OpError;
use crate::operand::Operand;
use crate::path::compose_all;
use crate::resolve::{ResolutionContext, resolve, resolve_names};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfig {
    pub path: Operand,
    /// May resolve to a list; each element is deleted in order.
    pub filename: Operand,
}

impl DeleteConfig {
    pub fn new(path: Operand, filename: Operand) -> Self {
        Self { path, filename }
    }

    pub(crate) fn operands(&self) -> Vec<(&'static str, &Operand)> {
        vec![("path", &self.path), ("filename", &self.filename)]
    }
}

pub fn run_delete(cfg: &DeleteConfig, ctx: &mut ResolutionContext<'_>) -> Result<(), OpError> {
    let dir = resolve(&cfg.path, ctx)?;
    let names = resolve_names(&cfg.filename, ctx)?;
    for target in compose_all(&dir, &names) {
        delete_one(Path::new(&target))?;
    }
    Ok(())
}

fn delete_one(path: &Path) -> Result<(), OpError> {
    let err = match fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "Removed file");
            return Ok(());
        }
        Err(e) => e,
    };
    match classify(OpKind::Delete, &err) {
        Disposition::Ignorable => {
            debug!(path = %path.display(), "Nothing to delete");
            Ok(())
        }
        Disposition::Recoverable => remove_dir(path),
        Disposition::Fatal => Err(OpError::io(OpKind::Delete, "unlink", path, err)),
    }
}

fn remove_dir(path: &Path) -> Result<(), OpError> {
    match fs::remove_dir(path) {
        Ok(()) => {
            info!(path = %path.display(), "Removed directory");
            Ok(())
        }
        Err(e) => match classify(OpKind::RemoveDir, &e) {
            Disposition::Ignorable => Ok(()),
            Disposition::Recoverable | Disposition::Fatal => {
                Err(OpError::io(OpKind::RemoveDir, "remove directory", path, e))
            }
        },
    }
}
