use std::fs::File;
use std::sync::Arc;

use arrow_array::RecordBatch;
use cachefs::FileSystem;
use chrono::NaiveDate;
use diagnostics::*;

use crate::error::{Error, Result};
use crate::options::{CsvOptions, StreamConfig};
use crate::table::{concat_tables, empty_table, read_csv};

/// One CSV file per calendar day, named
/// `{base_folder}/{prefix}{YYYY-MM-DD}{suffix}.csv`, read through a
/// [`FileSystem`].
///
/// Days without a file are expected: they read as an empty table and are
/// skipped when several days are combined.
#[derive(Debug, Clone)]
pub struct DataStream {
    name: String,
    base_folder: String,
    prefix: String,
    suffix: String,
    csv: CsvOptions,
    file_system: Arc<dyn FileSystem>,
}

impl DataStream {
    pub fn new<N, B>(name: N, base_folder: B, file_system: Arc<dyn FileSystem>) -> Self
    where
        N: Into<String>,
        B: Into<String>,
    {
        Self {
            name: name.into(),
            base_folder: base_folder.into(),
            prefix: String::new(),
            suffix: String::new(),
            csv: CsvOptions::default(),
            file_system,
        }
    }

    pub fn from_config(config: &StreamConfig, file_system: Arc<dyn FileSystem>) -> Self {
        Self {
            name: config.name.clone(),
            base_folder: config.base_folder.clone(),
            prefix: config.prefix.clone(),
            suffix: config.suffix.clone(),
            csv: config.csv.clone(),
            file_system,
        }
    }

    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_csv_options(mut self, csv: CsvOptions) -> Self {
        self.csv = csv;
        self
    }

    /// A label; it plays no part in locating files.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{}{}{}.csv", self.prefix, date.format("%Y-%m-%d"), self.suffix)
    }

    /// The table for `date`, or an empty table when it has no file.
    pub fn get_data_for_date(&self, date: NaiveDate) -> Result<RecordBatch> {
        Ok(self.load(date)?.unwrap_or_else(empty_table))
    }

    /// Every day from `start` through `end` inclusive, concatenated.
    pub fn get_data_for_range(&self, start: NaiveDate, end: NaiveDate) -> Result<RecordBatch> {
        self.get_data_for_dates(days_between(start, end))
    }

    /// The given days concatenated in order, skipping days without a file.
    pub fn get_data_for_dates<I>(&self, dates: I) -> Result<RecordBatch>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut tables = Vec::new();
        for date in dates {
            if let Some(table) = self.load(date)? {
                tables.push(table);
            }
        }
        concat_tables(&tables)
    }

    fn load(&self, date: NaiveDate) -> Result<Option<RecordBatch>> {
        let file_name = self.file_name(date);

        let local = match self.file_system.get_file(&self.base_folder, &[file_name.as_str()]) {
            Ok(local) => local,
            Err(e) if e.is_not_found() => return Ok(self.skip(&file_name)),
            Err(e) => return Err(Error::FileSystem(e)),
        };

        // The local adapter hands back paths without checking them.
        let file = match File::open(&local) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(self.skip(&file_name)),
            Err(e) => return Err(Error::Io(e)),
        };

        let table = read_csv(file, &self.csv)?;
        let stream = self.name.as_str();
        let rows = table.num_rows();
        debug!("{stream}: loaded {rows} rows from {file_name}", stream, rows, file_name);
        Ok(Some(table))
    }

    fn skip(&self, file_name: &str) -> Option<RecordBatch> {
        let stream = self.name.as_str();
        debug!("{stream}: no file {file_name}", stream, file_name);
        None
    }
}

fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}
