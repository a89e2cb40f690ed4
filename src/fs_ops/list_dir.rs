//! Directory listing filtered by a glob-like pattern.

use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::classify::OpKind;
use crate::errors::OpError;
use crate::operand::Operand;
use crate::resolve::{ResolutionContext, assign, resolve};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDirConfig {
    pub path: Operand,
    /// Glob: `*` matches any run of characters; everything else is literal.
    /// Empty means `*`.
    pub filter: String,
    pub output: Operand,
}

impl ListDirConfig {
    pub fn new(path: Operand, filter: impl Into<String>, output: Operand) -> Self {
        Self {
            path,
            filter: filter.into(),
            output,
        }
    }

    pub(crate) fn operands(&self) -> Vec<(&'static str, &Operand)> {
        vec![("path", &self.path), ("output", &self.output)]
    }
}

/// Anchored regex for a glob: `*` -> `.*`, all other characters escaped.
pub fn glob_to_regex(pattern: &str) -> Result<Regex, OpError> {
    let pattern = if pattern.is_empty() { "*" } else { pattern };
    let mut re = String::with_capacity(pattern.len() * 2 + 2);
    re.push('^');
    let mut literal = [0u8; 4];
    for c in pattern.chars() {
        if c == '*' {
            re.push_str(".*");
        } else {
            re.push_str(&regex::escape(c.encode_utf8(&mut literal)));
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|source| OpError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

pub fn run_list_dir(cfg: &ListDirConfig, ctx: &mut ResolutionContext<'_>) -> Result<(), OpError> {
    let filter = glob_to_regex(&cfg.filter)?;
    let dir = PathBuf::from(resolve(&cfg.path, ctx)?);

    let mut names = Vec::new();
    let entries = fs::read_dir(&dir).map_err(|e| OpError::io(OpKind::ListDir, "read directory", &dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| OpError::io(OpKind::ListDir, "read directory entry", &dir, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    // read_dir order is filesystem-dependent; sort for a stable listing.
    names.sort();
    names.retain(|n| filter.is_match(n));

    debug!(dir = %dir.display(), matched = names.len(), "listed directory");
    assign(&cfg.output, ctx, Value::from(names))
}
