use arrow_csv::reader::Format;
use serde::{Deserialize, Serialize};

/// How the daily CSV files are parsed.
///
/// Defaults match `arrow_csv`: comma separated, header row, `"` quotes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CsvOptions {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    #[serde(default = "default_has_header")]
    pub has_header: bool,

    #[serde(default = "default_quote")]
    pub quote: char,

    pub escape: Option<char>,

    /// Rows per decoded batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Rows sampled per file for schema inference
    #[serde(default = "default_schema_infer_max_records")]
    pub schema_infer_max_records: usize,
}

fn default_delimiter() -> char {
    ','
}
fn default_has_header() -> bool {
    true
}
fn default_quote() -> char {
    '"'
}
fn default_batch_size() -> usize {
    8192
}
fn default_schema_infer_max_records() -> usize {
    1000
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            has_header: default_has_header(),
            quote: default_quote(),
            escape: None,
            batch_size: default_batch_size(),
            schema_infer_max_records: default_schema_infer_max_records(),
        }
    }
}

impl CsvOptions {
    pub(crate) fn format(&self) -> Format {
        let mut format = Format::default()
            .with_delimiter(self.delimiter as u8)
            .with_header(self.has_header)
            .with_quote(self.quote as u8);

        if let Some(escape) = self.escape {
            format = format.with_escape(escape as u8);
        }
        format
    }
}

/// Serializable description of a [`crate::DataStream`].
///
/// ```yaml
/// name: eod-prices
/// base_folder: eod
/// prefix: EOD_Prices_
/// csv:
///   delimiter: ";"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StreamConfig {
    pub name: String,

    pub base_folder: String,

    #[serde(default)]
    pub prefix: String,

    #[serde(default)]
    pub suffix: String,

    #[serde(default)]
    pub csv: CsvOptions,
}
