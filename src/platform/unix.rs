//! Unix implementations of platform helpers.

use std::ffi::{CString, OsString};
use std::fs::{self, DirBuilder, File, FileType, OpenOptions};
use std::io;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::os::unix::fs::{DirBuilderExt, FileTypeExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use super::AccessMode;

fn c_path(bytes: &[u8]) -> io::Result<CString> {
    CString::new(bytes)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains a NUL byte"))
}

/// access(2) against the real uid/gid.
pub fn check_access(path: &Path, mode: AccessMode) -> io::Result<()> {
    let c = c_path(path.as_os_str().as_bytes())?;
    let mut bits = 0;
    if mode.read {
        bits |= libc::R_OK;
    }
    if mode.write {
        bits |= libc::W_OK;
    }
    if bits == 0 {
        bits = libc::F_OK;
    }
    let rc = unsafe { libc::access(c.as_ptr(), bits) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// mkdir with an explicit mode (still subject to the process umask).
pub fn create_dir_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    DirBuilder::new().mode(mode).create(path)
}

pub fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

/// mkdtemp(3): atomically create `<prefix>XXXXXX` with mode 0700.
pub fn mkdtemp(prefix: &str) -> io::Result<PathBuf> {
    let template = c_path(format!("{prefix}XXXXXX").as_bytes())?;
    let mut buf = template.into_bytes_with_nul();
    let rc = unsafe { libc::mkdtemp(buf.as_mut_ptr().cast::<libc::c_char>()) };
    if rc.is_null() {
        return Err(io::Error::last_os_error());
    }
    buf.pop();
    Ok(PathBuf::from(OsString::from_vec(buf)))
}

pub fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

pub fn is_char_device(ft: &FileType) -> bool {
    ft.is_char_device()
}

/// Open log file for appending; 0600 applies only when the file is created.
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn access_probe_existing_and_missing() {
        let dir = tempdir().unwrap();
        let f = dir.path().join("f");
        fs::write(&f, b"x").unwrap();
        assert!(check_access(&f, AccessMode::READ_WRITE).is_ok());
        assert!(check_access(&f, AccessMode::EXISTS).is_ok());
        let err = check_access(&dir.path().join("nope"), AccessMode::EXISTS).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn mkdtemp_creates_unique_dirs() {
        let dir = tempdir().unwrap();
        let prefix = format!("{}/job-", dir.path().display());
        let a = mkdtemp(&prefix).unwrap();
        let b = mkdtemp(&prefix).unwrap();
        assert_ne!(a, b);
        assert!(a.is_dir() && b.is_dir());
        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("job-") && name.len() == "job-".len() + 6);
    }

    #[test]
    fn mkdir_mode_applied() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("m");
        create_dir_with_mode(&p, 0o700).unwrap();
        let mode = fs::metadata(&p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }
}
