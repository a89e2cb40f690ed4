//! Permission probe. The node routes the message by the result.

use std::path::PathBuf;
use tracing::debug;

use crate::classify::OpKind;
use crate::errors::OpError;
use crate::operand::Operand;
use crate::path::compose;
use crate::platform::{self, AccessMode};
use crate::resolve::{ResolutionContext, resolve};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfig {
    pub path: Operand,
    pub filename: Operand,
    pub read: bool,
    pub write: bool,
}

impl AccessConfig {
    pub fn new(path: Operand, filename: Operand, read: bool, write: bool) -> Self {
        Self {
            path,
            filename,
            read,
            write,
        }
    }

    pub(crate) fn operands(&self) -> Vec<(&'static str, &Operand)> {
        vec![("path", &self.path), ("filename", &self.filename)]
    }
}

pub fn run_access(cfg: &AccessConfig, ctx: &mut ResolutionContext<'_>) -> Result<(), OpError> {
    let target = PathBuf::from(compose(&resolve(&cfg.path, ctx)?, &resolve(&cfg.filename, ctx)?));
    let mode = AccessMode {
        read: cfg.read,
        write: cfg.write,
    };
    platform::check_access(&target, mode).map_err(|e| OpError::io(OpKind::Access, "check access", &target, e))?;
    debug!(path = %target.display(), read = cfg.read, write = cfg.write, "access granted");
    Ok(())
}
