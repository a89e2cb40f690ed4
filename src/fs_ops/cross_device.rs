//! Copy-then-delete move for when rename crosses a device boundary.
//!
//! States: Start -> ProbeAccess -> Copying -> DeletingSource -> Done,
//! with Aborted reachable from any of them.
//!
//! - ProbeAccess: source must be readable+writable, the destination writable,
//!   and the destination device must have room for the source.
//! - Copying: stream into a hidden temp file beside the destination, fsync,
//!   then rename it into place; the temp file is removed on failure. The
//!   destination path therefore never holds a partial file.
//! - DeletingSource: the one step that is not crash-atomic. If it fails the
//!   destination is complete and the source still exists; that duplicate is
//!   reported as `SourceNotRemoved`, never cleaned up behind the caller.

use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use crate::classify::OpKind;
use crate::errors::OpError;
use crate::platform::{self, AccessMode};

use super::backend::MoveBackend;
use super::{io_copy, util};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackState {
    Start,
    ProbeAccess,
    Copying,
    DeletingSource,
    Done,
    Aborted,
}

impl FallbackState {
    pub fn as_str(self) -> &'static str {
        match self {
            FallbackState::Start => "start",
            FallbackState::ProbeAccess => "probe_access",
            FallbackState::Copying => "copying",
            FallbackState::DeletingSource => "deleting_source",
            FallbackState::Done => "done",
            FallbackState::Aborted => "aborted",
        }
    }
}

#[derive(Debug)]
pub struct CrossDeviceMove<'a> {
    src: &'a Path,
    dest: &'a Path,
    backend: &'a dyn MoveBackend,
    state: FallbackState,
}

impl<'a> CrossDeviceMove<'a> {
    pub fn new(src: &'a Path, dest: &'a Path, backend: &'a dyn MoveBackend) -> Self {
        Self {
            src,
            dest,
            backend,
            state: FallbackState::Start,
        }
    }

    pub fn state(&self) -> FallbackState {
        self.state
    }

    /// Drive the machine to Done or Aborted. Returns bytes copied.
    pub fn run(&mut self) -> Result<u64, OpError> {
        self.advance(FallbackState::ProbeAccess);
        if let Err(e) = self.probe() {
            return Err(self.abort(e));
        }

        self.advance(FallbackState::Copying);
        let bytes = match self.copy() {
            Ok(n) => n,
            Err(e) => return Err(self.abort(e)),
        };

        self.advance(FallbackState::DeletingSource);
        if let Err(source) = self.backend.remove_file(self.src) {
            error!(
                src = %self.src.display(),
                dest = %self.dest.display(),
                error = %source,
                "Copied across devices but could not remove source; duplicate remains"
            );
            return Err(self.abort(OpError::SourceNotRemoved {
                src: self.src.to_path_buf(),
                dest: self.dest.to_path_buf(),
                source,
            }));
        }

        self.advance(FallbackState::Done);
        info!(src = %self.src.display(), dest = %self.dest.display(), bytes, "Moved across devices");
        Ok(bytes)
    }

    fn advance(&mut self, next: FallbackState) {
        debug!(from = self.state.as_str(), to = next.as_str(), "cross-device move");
        self.state = next;
    }

    fn abort(&mut self, err: OpError) -> OpError {
        self.advance(FallbackState::Aborted);
        err
    }

    fn probe(&self) -> Result<(), OpError> {
        platform::check_access(self.src, AccessMode::READ_WRITE)
            .map_err(|e| OpError::io(OpKind::Move, "probe source access", self.src, e))?;

        let dest_dir = util::parent_dir(self.dest);
        let writable_target = if self.dest.exists() { self.dest } else { dest_dir };
        platform::check_access(writable_target, AccessMode::WRITE)
            .map_err(|e| OpError::io(OpKind::Move, "probe destination access", writable_target, e))?;

        let required = fs::metadata(self.src)
            .map_err(|e| OpError::io(OpKind::Move, "stat source", self.src, e))?
            .len();
        let available = fs2::available_space(dest_dir)
            .map_err(|e| OpError::io(OpKind::Move, "query free space", dest_dir, e))?;
        if required > available {
            return Err(OpError::InsufficientSpace {
                dest: self.dest.to_path_buf(),
                required,
                available,
            });
        }
        Ok(())
    }

    fn copy(&self) -> Result<u64, OpError> {
        let dest_dir = util::parent_dir(self.dest);
        let tmp = util::unique_temp_path(dest_dir);

        let bytes = match io_copy::copy_streaming(self.src, &tmp) {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&tmp);
                return Err(OpError::io(OpKind::Move, "copy to temporary file", &tmp, e));
            }
        };

        // Same directory, so this rename never crosses a device.
        if let Err(e) = fs::rename(&tmp, self.dest) {
            let _ = fs::remove_file(&tmp);
            return Err(OpError::io(OpKind::Move, "rename temporary file into place", self.dest, e));
        }
        let _ = util::fsync_dir(dest_dir);
        Ok(bytes)
    }
}
