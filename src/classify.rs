//! Error classification: which OS failures are expected, which trigger a
//! fallback, and which must be reported.
//!
//! Detection uses raw OS codes (EXDEV, EISDIR, ...) with ErrorKind as a
//! portable backstop, the same way cross-device detection always has.

use std::io;

/// The filesystem action an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Move,
    Link,
    Delete,
    /// Delete's directory-removal retry.
    RemoveDir,
    Access,
    Size,
    Type,
    ReadLink,
    ListDir,
    Mkdir,
    MkTempDir,
    DecompressRead,
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Move => "move",
            OpKind::Link => "link",
            OpKind::Delete => "delete",
            OpKind::RemoveDir => "rmdir",
            OpKind::Access => "access",
            OpKind::Size => "size",
            OpKind::Type => "type",
            OpKind::ReadLink => "readlink",
            OpKind::ListDir => "dir",
            OpKind::Mkdir => "mkdir",
            OpKind::MkTempDir => "mktmpdir",
            OpKind::DecompressRead => "zread",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Expected condition; the operation succeeds without side effect.
    Ignorable,
    /// Triggers the operation's fallback path.
    Recoverable,
    /// Reported to the caller; the operation aborts.
    Fatal,
}

pub fn classify(op: OpKind, err: &io::Error) -> Disposition {
    match op {
        OpKind::Delete if is_not_found(err) => Disposition::Ignorable,
        OpKind::Delete if is_directory_unlink(err) => Disposition::Recoverable,
        OpKind::RemoveDir if is_not_found(err) => Disposition::Ignorable,
        OpKind::Mkdir if is_already_exists(err) => Disposition::Ignorable,
        OpKind::Move if is_cross_device(err) => Disposition::Recoverable,
        // Not a symlink: the caller reports an empty link target.
        OpKind::ReadLink if is_not_symlink(err) => Disposition::Ignorable,
        _ => Disposition::Fatal,
    }
}

fn is_not_found(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotFound
}

fn is_already_exists(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::AlreadyExists
}

pub(crate) fn is_cross_device(e: &io::Error) -> bool {
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        if code == libc::EXDEV {
            return true;
        }
        // ERROR_NOT_SAME_DEVICE
        #[cfg(windows)]
        if code == 17 {
            return true;
        }
    }
    e.kind() == io::ErrorKind::CrossesDevices
}

/// unlink(2) refusing a directory: EISDIR on Linux, EPERM on macOS/BSD,
/// ERROR_ACCESS_DENIED on Windows.
fn is_directory_unlink(e: &io::Error) -> bool {
    match e.raw_os_error() {
        Some(code) => is_directory_unlink_code(code),
        None => e.kind() == io::ErrorKind::IsADirectory,
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn is_directory_unlink_code(code: i32) -> bool {
    code == libc::EISDIR
}

#[cfg(all(unix, not(any(target_os = "linux", target_os = "android"))))]
fn is_directory_unlink_code(code: i32) -> bool {
    code == libc::EISDIR || code == libc::EPERM
}

#[cfg(windows)]
fn is_directory_unlink_code(code: i32) -> bool {
    code == 5
}

#[cfg(not(any(unix, windows)))]
fn is_directory_unlink_code(_code: i32) -> bool {
    false
}

fn is_not_symlink(e: &io::Error) -> bool {
    match e.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::EINVAL,
        // ERROR_NOT_A_REPARSE_POINT
        #[cfg(windows)]
        Some(code) => code == 4390,
        #[cfg(not(any(unix, windows)))]
        Some(_) => false,
        None => e.kind() == io::ErrorKind::InvalidInput,
    }
}
