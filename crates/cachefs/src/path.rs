//! Key composition shared by both filesystem implementations.
//!
//! Keys are always `/`-separated, whatever the host separator is. Every
//! operation composes its key with [`join_path`] before anything else, so
//! `("a", ["b", "c"])` and `("a/b/c", [])` name the same resource.

use std::path::{MAIN_SEPARATOR_STR, PathBuf};

use object_store::path::Path as ObjectPath;

use crate::error::{Error, Result};

/// Characters that start a wildcard or class in a glob pattern.
const GLOB_META: &[char] = &['*', '?', '[', '{', '<'];

/// Join `segments` onto `base` with `/`.
///
/// With no segments the base is returned untouched. Otherwise slashes at
/// the seams are collapsed and empty parts (including an empty base) are
/// dropped.
pub fn join_path<S: AsRef<str>>(base: &str, segments: &[S]) -> String {
    if segments.is_empty() {
        return base.to_string();
    }

    let mut joined = base.trim_end_matches('/').to_string();
    for segment in segments {
        let segment = segment.as_ref().trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push('/');
        }
        joined.push_str(segment);
    }
    joined
}

/// Map a `/`-separated key onto host separators.
pub fn native_path(key: &str) -> PathBuf {
    PathBuf::from(key.replace('/', MAIN_SEPARATOR_STR))
}

/// Validate a composed key as an object location.
///
/// Leading and trailing slashes are tolerated; empty, `.` and `..`
/// segments are not, since the key also names a file under the cache
/// directory.
pub fn object_location(key: &str) -> Result<ObjectPath> {
    if key.trim_matches('/').is_empty() {
        return Err(Error::invalid_key(key, "empty key"));
    }
    ObjectPath::parse(key).map_err(|e| Error::invalid_key(key, e))
}

/// Split a glob pattern into its literal directory prefix and the rest.
///
/// `daily/2024/*.csv` becomes `("daily/2024", "*.csv")`. A pattern without
/// wildcards is all prefix.
pub fn split_glob(pattern: &str) -> (&str, &str) {
    let Some(first_meta) = pattern.find(GLOB_META) else {
        return (pattern, "");
    };
    match pattern[..first_meta].rfind('/') {
        Some(slash) => (&pattern[..slash], &pattern[slash + 1..]),
        None => ("", pattern),
    }
}
