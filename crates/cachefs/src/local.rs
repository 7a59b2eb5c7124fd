//! Pass-through access to a directory on the host.
//!
//! The disk is its own cache: `get_file` only maps the key to a path.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use wax::Glob;

use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::path::{join_path, native_path, split_glob};

#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    base_dir: PathBuf,
}

impl LocalFileSystem {
    /// Keys resolve relative to `base_dir`. An empty base resolves them
    /// against the working directory.
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.base_dir.join(native_path(key))
    }

    fn metadata(&self, path: &str, segments: &[&str]) -> Result<std::fs::Metadata> {
        let local = self.resolve(&join_path(path, segments));
        std::fs::metadata(&local).map_err(|e| Error::from_io(&local, e))
    }
}

impl FileSystem for LocalFileSystem {
    /// Does not check that the file exists.
    fn get_file(&self, path: &str, segments: &[&str]) -> Result<PathBuf> {
        Ok(self.resolve(&join_path(path, segments)))
    }

    fn modified(&self, path: &str, segments: &[&str]) -> Result<DateTime<Utc>> {
        Ok(to_utc(self.metadata(path, segments)?.modified()?))
    }

    /// Birth time where the platform records one, otherwise the
    /// modification time.
    fn created(&self, path: &str, segments: &[&str]) -> Result<DateTime<Utc>> {
        let md = self.metadata(path, segments)?;
        match md.created() {
            Ok(t) => Ok(to_utc(t)),
            Err(e) if e.kind() == std::io::ErrorKind::Unsupported => Ok(to_utc(md.modified()?)),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn ls(&self, path: &str) -> Result<Vec<String>> {
        let dir = self.resolve(path);
        let entries = std::fs::read_dir(&dir).map_err(|e| Error::from_io(&dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        if pattern.trim_matches('/').is_empty() {
            return Ok(Vec::new());
        }
        let (prefix, rest) = split_glob(pattern);
        let root = self.resolve(prefix);

        if rest.is_empty() {
            return Ok(if root.exists() {
                vec![root.display().to_string()]
            } else {
                Vec::new()
            });
        }
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let glob = Glob::new(rest).map_err(|e| Error::pattern(pattern, e))?;

        let mut matches = Vec::new();
        for entry in glob.walk(&root) {
            let entry = entry.map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
            matches.push(entry.path().display().to_string());
        }
        matches.sort();
        Ok(matches)
    }
}

fn to_utc(t: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_file_joins_without_io() {
        let fs = LocalFileSystem::new("/no/such/base");
        let path = fs.get_file("daily", &["2024-01-01.csv"]).unwrap();
        assert_eq!(path, Path::new("/no/such/base").join("daily").join("2024-01-01.csv"));
        assert_eq!(path, fs.get_file("daily/2024-01-01.csv", &[]).unwrap());
    }

    #[test]
    fn test_modified_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFileSystem::new(dir.path());
        assert!(fs.modified("absent.csv", &[]).unwrap_err().is_not_found());
        assert!(fs.created("absent", &["x.csv"]).unwrap_err().is_not_found());
        assert!(fs.ls("absent").unwrap_err().is_not_found());
    }
}
