//! Date-indexed CSV streams.
//!
//! A [`DataStream`] turns calendar days into file keys, fetches them through
//! any [`cachefs::FileSystem`] and returns Arrow record batches. Pair it with
//! [`cachefs::RemoteCacheFileSystem`] to read daily exports from a bucket
//! through a local cache, or with [`cachefs::LocalFileSystem`] for files
//! already on disk.

mod error;
mod options;
mod stream;
mod table;

pub use error::{Error, Result};
pub use options::{CsvOptions, StreamConfig};
pub use stream::DataStream;
pub use table::{concat_tables, empty_table, read_csv};
