//! The calls a move makes that decide its path through the state machine.
//! `OsBackend` is the real filesystem; tests substitute backends that fail
//! `rename` with a device-boundary error or refuse to remove the source.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::platform;

pub trait MoveBackend: Send + Sync + fmt::Debug {
    fn rename(&self, src: &Path, dest: &Path) -> io::Result<()> {
        fs::rename(src, dest)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    /// Create `link` pointing at `target`.
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        platform::symlink(target, link)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OsBackend;

impl MoveBackend for OsBackend {}
