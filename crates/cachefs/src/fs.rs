use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::Result;

/// Read access to a tree of files, local or remote.
///
/// Every method that takes `segments` first composes its key with
/// [`crate::join_path`], so `get_file("a", &["b"])` and
/// `get_file("a/b", &[])` are the same request.
///
/// Implementations are synchronous: a method returns only once any
/// download it needed has finished.
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    /// A local path that can be opened for reading as soon as this returns.
    /// A missing resource is [`crate::Error::NotFound`] here or, for
    /// implementations that do no I/O, when the path is opened.
    fn get_file(&self, path: &str, segments: &[&str]) -> Result<PathBuf>;

    /// Last modification time. [`crate::Error::NotFound`] if absent.
    fn modified(&self, path: &str, segments: &[&str]) -> Result<DateTime<Utc>>;

    /// Creation time. Implementations may approximate it; see each type.
    fn created(&self, path: &str, segments: &[&str]) -> Result<DateTime<Utc>>;

    /// Sorted names of the direct children of `path`. A directory that
    /// does not exist, or has nothing under it in an object store, is
    /// [`crate::Error::NotFound`]; `""` is the root.
    fn ls(&self, path: &str) -> Result<Vec<String>>;

    /// Sorted paths matching `pattern`. Nothing matching, including an
    /// empty pattern, is an empty list rather than an error.
    fn glob(&self, pattern: &str) -> Result<Vec<String>>;
}
