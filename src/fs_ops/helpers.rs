//! I/O error message helpers.
//!
//! Builds the human-facing text of `OpError::Io` (and so of every error
//! descriptor attached to a message): action, path, OS message, and a short
//! platform-aware hint keyed on the raw OS code.
//!
//! Usage:
//!   fs::remove_dir(p).map_err(|e| OpError::io(OpKind::RemoveDir, "remove directory", p, e))?;

use std::io;
use std::path::Path;

/// Format "<action> '<path>': <os message>; <hint> [os code: N]".
pub fn describe_io_error(action: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", action, path.display(), e);
    match e.raw_os_error() {
        Some(code) => {
            if let Some(hint) = hint_for_code(code) {
                msg.push_str("; ");
                msg.push_str(hint);
            }
            msg.push_str(&format!(" [os code: {code}]"));
        }
        None => {
            if let Some(hint) = hint_for_kind(e.kind()) {
                msg.push_str("; ");
                msg.push_str(hint);
            }
        }
    }
    msg
}

#[cfg(unix)]
fn hint_for_code(code: i32) -> Option<&'static str> {
    match code {
        libc::EACCES | libc::EPERM => Some("permission denied; check ownership and mode bits."),
        libc::EXDEV => Some("cross-device; atomic rename not possible."),
        libc::ENOENT => Some("path not found; verify it exists."),
        libc::EEXIST => Some("already exists."),
        libc::ENOTEMPTY => Some("directory not empty."),
        libc::ENOTDIR => Some("a path component is not a directory."),
        libc::EISDIR => Some("is a directory."),
        libc::ENOSPC => Some("insufficient space on device."),
        libc::EROFS => Some("read-only filesystem; cannot write here."),
        libc::ELOOP => Some("too many symbolic link levels; possible symlink cycle."),
        libc::ENAMETOOLONG => Some("filename or path too long."),
        libc::EBUSY => Some("resource busy."),
        libc::EMFILE | libc::ENFILE => Some("too many open files."),
        _ => None,
    }
}

#[cfg(windows)]
fn hint_for_code(code: i32) -> Option<&'static str> {
    match code {
        5 => Some("access denied; check permissions."),
        17 => Some("not same device; atomic rename not possible."),
        2 | 3 => Some("path not found; verify it exists."),
        80 | 183 => Some("already exists."),
        145 => Some("directory not empty."),
        112 => Some("insufficient disk space."),
        19 => Some("write protected / read-only media."),
        32 => Some("sharing violation; file is in use."),
        206 => Some("filename or path too long."),
        _ => None,
    }
}

#[cfg(not(any(unix, windows)))]
fn hint_for_code(_code: i32) -> Option<&'static str> {
    None
}

fn hint_for_kind(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and mode bits."),
        io::ErrorKind::NotFound => Some("path not found; verify it exists."),
        io::ErrorKind::AlreadyExists => Some("already exists."),
        io::ErrorKind::InvalidData => Some("data is corrupt or in an unexpected format."),
        _ => None,
    }
}
