//! Platform-specific helpers.
//! Hides OS differences (Unix/Windows) behind a uniform API so the operation
//! modules stay platform-agnostic.

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{
    check_access, create_dir_with_mode, is_char_device, mkdtemp, open_log_file_secure_append,
    set_mode, symlink,
};

#[cfg(not(unix))]
pub use windows::{
    check_access, create_dir_with_mode, is_char_device, mkdtemp, open_log_file_secure_append,
    set_mode, symlink,
};

/// Which permissions an access probe requires. Neither bit set means "exists".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessMode {
    pub read: bool,
    pub write: bool,
}

impl AccessMode {
    pub const EXISTS: AccessMode = AccessMode {
        read: false,
        write: false,
    };
    pub const READ: AccessMode = AccessMode {
        read: true,
        write: false,
    };
    pub const WRITE: AccessMode = AccessMode {
        read: false,
        write: true,
    };
    pub const READ_WRITE: AccessMode = AccessMode {
        read: true,
        write: true,
    };
}
