//! Remote cache configuration.
//!
//! ```yaml
//! url: s3://market-data/eod
//! cache_dir: /var/cache/market-data
//! region: us-east-1
//! ```
//!
//! The path part of an `s3://` URL becomes a key prefix (see
//! [`RemoteConfig::key_prefix`]), so keys passed to the filesystem are
//! relative to it. Empty credentials fall back to the usual `AWS_*`
//! environment variables.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use object_store::ObjectStore;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem as LocalStore;
use object_store::memory::InMemory;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// `s3://bucket[/prefix]`, `file:///dir` or `memory://`
    pub url: String,

    /// Local directory holding cached objects and their `.meta` files
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub secret_key: String,

    /// Custom S3 endpoint (MinIO, R2, ...)
    #[serde(default)]
    pub endpoint: String,

    /// Permit plain-http endpoints
    #[serde(default)]
    pub allow_http: bool,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("s3_cache")
}

impl RemoteConfig {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            cache_dir: default_cache_dir(),
            region: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            endpoint: String::new(),
            allow_http: false,
        }
    }

    pub fn with_cache_dir<P: Into<PathBuf>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Key prefix inside the bucket: the path of an `s3://` URL, without
    /// surrounding slashes. Other schemes have none.
    pub fn key_prefix(&self) -> Result<String> {
        let url = parse_url(&self.url)?;
        if url.scheme() != "s3" {
            return Ok(String::new());
        }
        Ok(url.path().trim_matches('/').to_string())
    }
}

/// Load and validate a YAML configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RemoteConfig> {
    let content = std::fs::read_to_string(&path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;
    parse_config(&content)
}

pub fn parse_config(yaml: &str) -> Result<RemoteConfig> {
    let config: RemoteConfig = serde_yaml_ng::from_str(yaml)
        .map_err(|e| Error::Config(format!("Failed to parse YAML configuration: {}", e)))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &RemoteConfig) -> Result<()> {
    if config.cache_dir.as_os_str().is_empty() {
        return Err(Error::Config("cache_dir cannot be empty".to_string()));
    }
    let url = parse_url(&config.url)?;
    if url.scheme() == "s3" && url.host_str().unwrap_or("").is_empty() {
        return Err(Error::Config(format!("missing bucket in {}", config.url)));
    }
    if config.access_key.is_empty() != config.secret_key.is_empty() {
        return Err(Error::Config(
            "access_key and secret_key must be given together".to_string(),
        ));
    }
    Ok(())
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::Config(format!("invalid url '{}': {}", url, e)))
}

/// Build the store named by `config.url`.
///
/// For `s3://` this is the whole bucket; the key prefix is applied by
/// [`crate::RemoteCacheFileSystem`] so that it also shapes the cache layout.
pub fn build_object_store(config: &RemoteConfig) -> Result<Arc<dyn ObjectStore>> {
    validate_config(config)?;
    let url = parse_url(&config.url)?;

    match url.scheme() {
        "s3" => {
            let bucket = url.host_str().unwrap_or("");
            let mut builder = AmazonS3Builder::from_env()
                .with_bucket_name(bucket)
                .with_allow_http(config.allow_http);

            if !config.region.is_empty() {
                builder = builder.with_region(&config.region);
            }
            if !config.access_key.is_empty() {
                builder = builder
                    .with_access_key_id(&config.access_key)
                    .with_secret_access_key(&config.secret_key);
            }
            if !config.endpoint.is_empty() {
                builder = builder.with_endpoint(&config.endpoint);
            }

            let store = builder
                .build()
                .map_err(|e| Error::Config(format!("Failed to build S3 store: {}", e)))?;
            Ok(Arc::new(store))
        }
        "file" => {
            let store = LocalStore::new_with_prefix(url.path())
                .map_err(|e| Error::Config(format!("Failed to build local store: {}", e)))?;
            Ok(Arc::new(store))
        }
        "memory" => Ok(Arc::new(InMemory::new())),
        other => Err(Error::Config(format!("unsupported scheme '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_defaults() {
        let config = parse_config("url: s3://market-data/eod\n").unwrap();
        assert_eq!(config.url, "s3://market-data/eod");
        assert_eq!(config.cache_dir, PathBuf::from("s3_cache"));
        assert!(config.region.is_empty());
        assert!(!config.allow_http);
    }

    #[test]
    fn test_parse_config_full() {
        let config = parse_config(
            "url: s3://bucket\ncache_dir: /tmp/cache\nregion: eu-west-1\nendpoint: http://localhost:9000\nallow_http: true\naccess_key: a\nsecret_key: b\n",
        )
        .unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(config.region, "eu-west-1");
        assert!(config.allow_http);
    }

    #[test]
    fn test_validate_rejects() {
        assert!(matches!(
            parse_config("url: not a url\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_config("url: s3://bucket\naccess_key: only-half\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_config("url: s3://bucket\ncache_dir: ''\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_build_unsupported_scheme() {
        let config = RemoteConfig::new("ftp://example.com/data");
        assert!(matches!(build_object_store(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_build_memory_and_file() {
        assert!(build_object_store(&RemoteConfig::new("memory://")).is_ok());

        let dir = tempfile::tempdir().unwrap();
        let url = format!("file://{}", dir.path().display());
        assert!(build_object_store(&RemoteConfig::new(url)).is_ok());
    }

    #[test]
    fn test_key_prefix() {
        assert_eq!(
            RemoteConfig::new("s3://market-data/eod/daily/").key_prefix().unwrap(),
            "eod/daily"
        );
        assert_eq!(RemoteConfig::new("s3://market-data").key_prefix().unwrap(), "");
        assert_eq!(RemoteConfig::new("memory://").key_prefix().unwrap(), "");
        assert!(RemoteConfig::new("not a url").key_prefix().is_err());
    }

    #[test]
    fn test_build_s3_bucket() {
        let mut config = RemoteConfig::new("s3://market-data/eod/daily");
        config.region = "us-east-1".to_string();
        config.access_key = "key".to_string();
        config.secret_key = "secret".to_string();
        assert!(build_object_store(&config).is_ok());
    }
}
