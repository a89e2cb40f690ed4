//! Windows implementations of platform helpers (best-effort, no ACL awareness).
//!
//! Notes:
//! - Windows lacks POSIX mode semantics; modes are accepted and ignored.
//! - There is no mkdtemp; callers fall back to a random suffix + create_dir.

use std::fs::{self, File, FileType, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use super::AccessMode;

/// Read probe opens the file (directories: metadata only); write probe checks READONLY.
pub fn check_access(path: &Path, mode: AccessMode) -> io::Result<()> {
    let meta = fs::metadata(path)?;
    if mode.read && meta.is_file() {
        File::open(path)?;
    }
    if mode.write && meta.permissions().readonly() {
        return Err(io::Error::from(io::ErrorKind::PermissionDenied));
    }
    Ok(())
}

pub fn create_dir_with_mode(path: &Path, _mode: u32) -> io::Result<()> {
    fs::create_dir(path)
}

pub fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

pub fn mkdtemp(_prefix: &str) -> io::Result<PathBuf> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
}

pub fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    if fs::metadata(target).map(|m| m.is_dir()).unwrap_or(false) {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

pub fn is_char_device(_ft: &FileType) -> bool {
    false
}

/// Open log file for appending (no symlink defense available via std on Windows).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
