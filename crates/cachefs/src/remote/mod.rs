//! Pull-through cache of an object store on local disk.
//!
//! Each remote key `K` is materialized as `cache_dir/K` with a sidecar
//! `cache_dir/K.meta` holding the object's modification time at download.
//! `K` is the full key in the store, including any key prefix the adapter
//! was given, so adapters with different prefixes can share `cache_dir`.
//! Keys whose file name ends in `.meta` would land on another key's
//! sidecar and are rejected as invalid.
//! A cached copy is served only while the object's current modification
//! time is not later than the recorded one, so every `get_file` costs one
//! HEAD request even on a hit. Nothing is evicted, and missing objects are
//! never cached.
//!
//! Concurrent refreshes of the same key, from threads or from processes
//! sharing `cache_dir`, are not coordinated and may interleave their
//! writes. Downloads overwrite the data file in place.

pub mod sidecar;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use object_store::ObjectStore;
use object_store::path::Path as ObjectPath;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Runtime;
use wax::{Glob, Pattern};

use crate::config::{RemoteConfig, build_object_store};
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::path::{join_path, object_location, split_glob};
use diagnostics::*;
use sidecar::Recorded;

/// A [`FileSystem`] over an object store, caching whole objects locally.
///
/// The store is driven by a private current-thread Tokio runtime, so the
/// methods block and must not be called from async code running on
/// another runtime.
#[derive(Debug)]
pub struct RemoteCacheFileSystem {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    cache_dir: PathBuf,
    runtime: Runtime,
}

impl RemoteCacheFileSystem {
    /// Creates `cache_dir` if needed.
    pub fn new<P: Into<PathBuf>>(store: Arc<dyn ObjectStore>, cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.into();
        std::fs::create_dir_all(&cache_dir)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;

        let dir = cache_dir.display().to_string();
        debug!("remote cache opened at {dir}", dir);

        Ok(Self {
            store,
            prefix: String::new(),
            cache_dir,
            runtime,
        })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        Ok(Self::new(build_object_store(config)?, &config.cache_dir)?
            .with_prefix(config.key_prefix()?))
    }

    /// Resolve every key under `prefix` in the store. Keys handed to and
    /// returned by the [`FileSystem`] methods stay relative to it.
    pub fn with_prefix<S: AsRef<str>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.as_ref().trim_matches('/').to_string();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Where `get_file` would place the object, without touching the store.
    pub fn cache_path(&self, path: &str, segments: &[&str]) -> Result<PathBuf> {
        let location = self.cached_location(&join_path(path, segments))?;
        Ok(self.local_path(&location))
    }

    /// The store location of a caller's key.
    fn location(&self, key: &str) -> Result<ObjectPath> {
        let location = object_location(key)?;
        if self.prefix.is_empty() {
            return Ok(location);
        }
        object_location(&join_path(&self.prefix, &[key]))
    }

    /// As [`Self::location`], for keys that get a file under `cache_dir`.
    fn cached_location(&self, key: &str) -> Result<ObjectPath> {
        let location = self.location(key)?;
        if location
            .filename()
            .is_some_and(|name| name.ends_with(sidecar::SUFFIX))
        {
            return Err(Error::invalid_key(key, "name collides with cache sidecar files"));
        }
        Ok(location)
    }

    /// The location listed for `path`; `None` is the root of the store.
    fn dir_location(&self, path: &str) -> Result<Option<ObjectPath>> {
        let path = path.trim_matches('/');
        match (path.is_empty(), self.prefix.is_empty()) {
            (true, true) => Ok(None),
            (true, false) => object_location(&self.prefix).map(Some),
            (false, _) => self.location(path).map(Some),
        }
    }

    /// A store location as the caller's key, without the adapter prefix.
    fn relative_key(&self, location: &ObjectPath) -> String {
        let key = location.to_string();
        if self.prefix.is_empty() {
            return key;
        }
        key.strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .map_or_else(|| key.clone(), str::to_string)
    }

    fn local_path(&self, location: &ObjectPath) -> PathBuf {
        let mut local = self.cache_dir.clone();
        for part in location.parts() {
            let segment: &str = part.as_ref();
            local.push(segment);
        }
        local
    }

    /// Modification time of the object, via HEAD.
    fn head(&self, location: &ObjectPath) -> Result<DateTime<Utc>> {
        self.runtime
            .block_on(self.store.head(location))
            .map(|meta| meta.last_modified)
            .map_err(|e| Error::from_store(location.to_string(), e))
    }

    /// Stream the object into `dest`, replacing its content.
    fn download(&self, location: &ObjectPath, dest: &Path) -> Result<u64> {
        let key = location.to_string();
        self.runtime.block_on(async {
            let result = self
                .store
                .get(location)
                .await
                .map_err(|e| Error::from_store(&key, e))?;

            let mut file = tokio::fs::File::create(dest).await?;
            let mut chunks = result.into_stream();
            let mut written = 0u64;
            while let Some(chunk) = chunks
                .try_next()
                .await
                .map_err(|e| Error::from_store(&key, e))?
            {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok::<_, Error>(written)
        })
    }

    fn is_cache_valid(&self, location: &ObjectPath, meta_path: &Path) -> Result<bool> {
        let remote = self.head(location)?;
        let key = location.to_string();

        match sidecar::read(meta_path)? {
            Recorded::At(cached) => {
                let valid = remote <= cached;
                let remote = sidecar::format_timestamp(remote);
                let cached = sidecar::format_timestamp(cached);
                debug!(
                    "staleness probe {key}: remote {remote} cached {cached} valid {valid}",
                    key,
                    remote,
                    cached,
                    valid
                );
                Ok(valid)
            }
            Recorded::Missing => {
                debug!("no sidecar for {key}", key);
                Ok(false)
            }
            Recorded::Corrupt(content) => {
                let path = meta_path.display().to_string();
                warn!(
                    "unreadable sidecar {path} ({content}), refreshing {key}",
                    path,
                    content,
                    key
                );
                Ok(false)
            }
        }
    }

    fn refresh(&self, location: &ObjectPath, local_path: &Path, meta_path: &Path) -> Result<()> {
        let bytes = self.download(location, local_path)?;
        let modified = self.head(location)?;
        sidecar::write(meta_path, modified)?;

        let key = location.to_string();
        let path = local_path.display().to_string();
        let modified = sidecar::format_timestamp(modified);
        info!(
            "downloaded {key} ({bytes} bytes) to {path}, modified {modified}",
            key,
            bytes,
            path,
            modified
        );
        Ok(())
    }
}

impl FileSystem for RemoteCacheFileSystem {
    fn get_file(&self, path: &str, segments: &[&str]) -> Result<PathBuf> {
        let location = self.cached_location(&join_path(path, segments))?;
        let local_path = self.local_path(&location);
        let meta_path = sidecar::sidecar_path(&local_path);

        if let Some(parent) = local_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if local_path.exists() && self.is_cache_valid(&location, &meta_path)? {
            let key = location.to_string();
            debug!("cache hit {key}", key);
            return Ok(local_path);
        }

        self.refresh(&location, &local_path, &meta_path)?;
        Ok(local_path)
    }

    fn modified(&self, path: &str, segments: &[&str]) -> Result<DateTime<Utc>> {
        self.head(&self.location(&join_path(path, segments))?)
    }

    /// Object stores keep no creation time; this is the modification time.
    fn created(&self, path: &str, segments: &[&str]) -> Result<DateTime<Utc>> {
        self.modified(path, segments)
    }

    fn ls(&self, path: &str) -> Result<Vec<String>> {
        let dir = self.dir_location(path)?;
        let listing = self
            .runtime
            .block_on(self.store.list_with_delimiter(dir.as_ref()))
            .map_err(|e| Error::from_store(path, e))?;

        let mut names: Vec<String> = listing
            .common_prefixes
            .iter()
            .chain(listing.objects.iter().map(|meta| &meta.location))
            .filter_map(|location| location.filename().map(str::to_string))
            .collect();

        // Object stores have no empty directories.
        if names.is_empty() && dir.is_some() {
            return Err(Error::not_found(path));
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let pattern = pattern.trim_start_matches('/');
        if pattern.trim_end_matches('/').is_empty() {
            return Ok(Vec::new());
        }
        let (prefix, rest) = split_glob(pattern);

        // No wildcard: the pattern names at most one object.
        if rest.is_empty() {
            let location = self.location(prefix)?;
            return match self.head(&location) {
                Ok(_) => Ok(vec![self.relative_key(&location)]),
                Err(e) if e.is_not_found() => Ok(Vec::new()),
                Err(e) => Err(e),
            };
        }

        let glob = Glob::new(pattern).map_err(|e| Error::pattern(pattern, e))?;
        let dir = self.dir_location(prefix)?;
        let objects: Vec<_> = self
            .runtime
            .block_on(self.store.list(dir.as_ref()).try_collect())
            .map_err(|e| Error::from_store(pattern, e))?;

        let mut keys: Vec<String> = objects
            .iter()
            .map(|meta| self.relative_key(&meta.location))
            .filter(|key| glob.is_match(key.as_str()))
            .collect();
        keys.sort();
        Ok(keys)
    }
}
