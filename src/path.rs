//! Joining a resolved directory with a resolved name.
//! The single normalization point: every (path, filename) pair goes through `compose`.

use std::path::MAIN_SEPARATOR;

use crate::resolve::Resolved;

/// `dir` + separator + `name`, adding the separator only when `dir` lacks one.
/// An empty `dir` yields `name` unchanged.
pub fn compose(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        return name.to_string();
    }
    let mut out = String::with_capacity(dir.len() + 1 + name.len());
    out.push_str(dir);
    if !ends_with_separator(dir) {
        out.push(MAIN_SEPARATOR);
    }
    out.push_str(name);
    out
}

/// One composed path per resolved name, in input order.
pub fn compose_all(dir: &str, names: &Resolved) -> Vec<String> {
    match names {
        Resolved::Scalar(name) => vec![compose(dir, name)],
        Resolved::List(list) => list.iter().map(|name| compose(dir, name)).collect(),
    }
}

// '/' counts on every platform; Windows accepts both.
fn ends_with_separator(s: &str) -> bool {
    s.ends_with(MAIN_SEPARATOR) || s.ends_with('/')
}
