//! Default path helpers and symlink checks.

use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment override for the pipeline file location.
pub const PIPELINE_ENV: &str = "FSOPS_PIPELINE";

/// Pipeline file: `$FSOPS_PIPELINE` if set, else `<config dir>/fsops/pipeline.xml`.
pub fn default_pipeline_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os(PIPELINE_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(p));
    }
    if let Some(mut base) = config_dir() {
        base.push("fsops");
        base.push("pipeline.xml");
        Some(base)
    } else {
        env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(".config").join("fsops").join("pipeline.xml"))
    }
}

/// OS-appropriate default log file path (data dir). Does not create anything.
pub fn default_log_path() -> Option<PathBuf> {
    if let Some(mut base) = data_dir() {
        base.push("fsops");
        base.push("fsops.log");
        Some(base)
    } else {
        env::var("HOME").ok().map(|h| {
            PathBuf::from(h)
                .join(".local")
                .join("share")
                .join("fsops")
                .join("fsops.log")
        })
    }
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        match fs::symlink_metadata(anc) {
            Ok(meta) if meta.file_type().is_symlink() => return Ok(true),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        p = anc.parent();
    }
    Ok(false)
}
