use std::path::Path;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by every [`crate::FileSystem`] implementation.
///
/// `NotFound` is the only kind callers are expected to recover from.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote key or local path does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any object store failure other than a missing object.
    #[error("Object store error: {0}")]
    Transport(#[source] object_store::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key '{key}': {message}")]
    InvalidKey { key: String, message: String },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to start blocking runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl Error {
    pub fn not_found<S: AsRef<str>>(what: S) -> Self {
        Error::NotFound(what.as_ref().to_string())
    }

    pub fn invalid_key<S: AsRef<str>, M: ToString>(key: S, message: M) -> Self {
        Error::InvalidKey {
            key: key.as_ref().to_string(),
            message: message.to_string(),
        }
    }

    pub fn pattern<S: AsRef<str>, M: ToString>(pattern: S, message: M) -> Self {
        Error::Pattern {
            pattern: pattern.as_ref().to_string(),
            message: message.to_string(),
        }
    }

    /// Translate a store error for `key`, folding every flavor of
    /// missing object into [`Error::NotFound`].
    pub fn from_store<S: AsRef<str>>(key: S, err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { .. } => Error::not_found(key),
            other => Error::Transport(other),
        }
    }

    /// Translate a local I/O error for `path`, keeping `NotFound` distinct.
    pub fn from_io<P: AsRef<Path>>(path: P, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::not_found(path.as_ref().display().to_string())
        } else {
            Error::Io(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
