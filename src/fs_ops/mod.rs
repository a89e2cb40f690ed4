//! Filesystem operations, one module per action.
//! Each `run_*` resolves its operands, performs its primary call and writes
//! results back; routing of the message is decided by `node`.

mod access;
mod backend;
mod cross_device;
mod decompress;
mod delete;
pub mod helpers;
mod io_copy;
mod list_dir;
mod mkdir;
mod move_op;
mod query;
mod util;

pub use access::{AccessConfig, run_access};
pub use backend::{MoveBackend, OsBackend};
pub use cross_device::{CrossDeviceMove, FallbackState};
pub use decompress::{DecompressConfig, FILENAME_FIELD, PAYLOAD_FIELD, run_decompress_read};
pub use delete::{DeleteConfig, run_delete};
pub use helpers::describe_io_error;
pub use list_dir::{ListDirConfig, glob_to_regex, run_list_dir};
pub use mkdir::{
    DEFAULT_DIR_MODE, DEFAULT_TEMP_DIR_MODE, MkTempDirConfig, MkdirConfig, run_mkdir, run_mktempdir,
};
pub use move_op::{MoveConfig, run_move};
pub use query::{QueryConfig, run_readlink, run_size, run_type};
