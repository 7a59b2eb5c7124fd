//! A small filesystem abstraction with two implementations:
//!
//! - [`LocalFileSystem`] maps keys onto a host directory.
//! - [`RemoteCacheFileSystem`] mirrors objects from an object store into a
//!   local cache directory, re-downloading whenever the remote object's
//!   modification time moves past the one recorded at the last download.
//!
//! Both compose keys the same way (see [`join_path`]) and report missing
//! resources as [`Error::NotFound`].

mod config;
mod error;
mod fs;
mod local;
mod path;
mod remote;

pub use config::{RemoteConfig, build_object_store, load_config, parse_config, validate_config};
pub use error::{Error, Result};
pub use fs::FileSystem;
pub use local::LocalFileSystem;
pub use path::{join_path, native_path, object_location, split_glob};
pub use remote::RemoteCacheFileSystem;
pub use remote::sidecar::{format_timestamp, parse_timestamp, sidecar_path};
