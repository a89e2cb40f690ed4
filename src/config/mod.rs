//! Runtime configuration and pipeline loading.
//! - `types`: `Config` and `LogLevel`.
//! - `paths`: default pipeline/log locations and symlink checks.
//! - `xml`: pipeline file parsing into nodes and seeded stores.

pub mod paths;
pub mod types;
pub mod xml;

pub use paths::{PIPELINE_ENV, default_log_path, default_pipeline_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use xml::{load_pipeline, parse_pipeline};
