//! Move (or symlink) one file.
//! Attempts an atomic rename; a device-boundary failure hands over to the
//! copy-then-delete fallback. Link mode creates a symlink and has no fallback.

use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::classify::{Disposition, OpKind, classify};
use crate::errors::OpError;
use crate::operand::Operand;
use crate::path::compose;
use crate::resolve::{ResolutionContext, resolve};

use super::backend::MoveBackend;
use super::cross_device::CrossDeviceMove;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveConfig {
    pub source_path: Operand,
    pub source_filename: Operand,
    pub dest_path: Operand,
    pub dest_filename: Operand,
    /// Create a symlink at the destination instead of moving.
    pub link: bool,
    /// When false, failures stay in the outcome but are logged at warn, not error.
    pub report_errors: bool,
}

impl MoveConfig {
    pub fn new(source_path: Operand, source_filename: Operand, dest_path: Operand, dest_filename: Operand) -> Self {
        Self {
            source_path,
            source_filename,
            dest_path,
            dest_filename,
            link: false,
            report_errors: true,
        }
    }

    pub fn linking(mut self) -> Self {
        self.link = true;
        self
    }

    pub(crate) fn operands(&self) -> Vec<(&'static str, &Operand)> {
        vec![
            ("source_path", &self.source_path),
            ("source_filename", &self.source_filename),
            ("dest_path", &self.dest_path),
            ("dest_filename", &self.dest_filename),
        ]
    }
}

pub fn run_move(cfg: &MoveConfig, ctx: &mut ResolutionContext<'_>, backend: &dyn MoveBackend) -> Result<(), OpError> {
    let src = PathBuf::from(compose(
        &resolve(&cfg.source_path, ctx)?,
        &resolve(&cfg.source_filename, ctx)?,
    ));
    let dest = PathBuf::from(compose(
        &resolve(&cfg.dest_path, ctx)?,
        &resolve(&cfg.dest_filename, ctx)?,
    ));
    debug!(src = %src.display(), dest = %dest.display(), link = cfg.link, "move resolved");

    if cfg.link {
        backend
            .symlink(&src, &dest)
            .map_err(|e| OpError::io(OpKind::Link, "create symlink", &dest, e))?;
        info!(target = %src.display(), link = %dest.display(), "Created symlink");
        return Ok(());
    }

    match backend.rename(&src, &dest) {
        Ok(()) => {
            info!(src = %src.display(), dest = %dest.display(), "Renamed file atomically");
            Ok(())
        }
        Err(e) => match classify(OpKind::Move, &e) {
            Disposition::Recoverable => {
                warn!(error = %e, src = %src.display(), dest = %dest.display(), "Rename crossed devices; copying instead");
                CrossDeviceMove::new(&src, &dest, backend).run().map(|_| ())
            }
            Disposition::Ignorable | Disposition::Fatal => Err(OpError::io(OpKind::Move, "rename", &src, e)),
        },
    }
}
