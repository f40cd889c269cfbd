//! Entry path rules.
//!
//! An entry path like `money/bank` is both the registry key and the
//! relative location of its blob file, so it must be a safe relative
//! filesystem path and must not collide with a directory another entry
//! needs.

use crate::errors::{PassVaultError, Result};

/// Maximum length of an entry path in bytes.
const MAX_PATH_LEN: usize = 256;

/// Validate that `path` is a usable entry path.
///
/// Rules: non-empty, at most 256 bytes, `/`-separated segments that are
/// non-empty and do not start with `.`, no backslashes or control
/// characters, no leading or trailing slash.
pub fn validate(path: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(PassVaultError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        })
    };

    if path.is_empty() {
        return invalid("path cannot be empty");
    }
    if path.len() > MAX_PATH_LEN {
        return invalid("path cannot exceed 256 bytes");
    }
    if path.chars().any(|c| c == '\\' || c.is_control()) {
        return invalid("backslashes and control characters are not allowed");
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return invalid("segments cannot be empty (check for leading, trailing or double '/')");
        }
        if segment.starts_with('.') {
            return invalid("segments cannot start with '.'");
        }
        if segment.trim() != segment {
            return invalid("segments cannot start or end with whitespace");
        }
    }
    Ok(())
}

/// `true` if `ancestor` is a strict directory prefix of `path`
/// (`money` is an ancestor of `money/bank`, `mon` is not).
pub fn is_ancestor(ancestor: &str, path: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// `true` if two entries cannot coexist because one would need the
/// other's file to be a directory.
pub fn conflicts(a: &str, b: &str) -> bool {
    is_ancestor(a, b) || is_ancestor(b, a)
}

/// Split `money/bank` into (`money`, `bank`); top-level entries have an
/// empty group.
pub fn split_group(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}
