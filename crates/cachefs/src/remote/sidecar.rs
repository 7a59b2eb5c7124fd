//! The `.meta` file stored next to each cached object.
//!
//! Its only content is the remote modification time recorded at the last
//! successful download, as decimal seconds since the Unix epoch with
//! nanosecond precision (`1735900000.123456789`). Any plain decimal form
//! is accepted when reading.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Appended to a cached file's name to form its sidecar.
pub(crate) const SUFFIX: &str = ".meta";

/// What the sidecar says about a cached file.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Recorded {
    /// No sidecar: the data file was never completely refreshed.
    Missing,
    /// The sidecar exists but cannot be read as a timestamp.
    Corrupt(String),
    At(DateTime<Utc>),
}

/// `local_path` with `.meta` appended to the full file name.
pub fn sidecar_path<P: AsRef<Path>>(local_path: P) -> PathBuf {
    let mut name = OsString::from(local_path.as_ref().as_os_str());
    name.push(SUFFIX);
    PathBuf::from(name)
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    let secs = ts.timestamp();
    let nanos = ts.timestamp_subsec_nanos();
    if secs < 0 && nanos > 0 {
        format!("-{}.{:09}", -(secs + 1), NANOS_PER_SEC - nanos)
    } else {
        format!("{}.{:09}", secs, nanos)
    }
}

pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let secs: i64 = whole.parse().ok()?;
    let nanos: u32 = if frac.is_empty() {
        0
    } else {
        let mut padded: String = frac.chars().take(9).collect();
        while padded.len() < 9 {
            padded.push('0');
        }
        padded.parse().ok()?
    };

    if negative && nanos > 0 {
        DateTime::from_timestamp(-secs - 1, NANOS_PER_SEC - nanos)
    } else if negative {
        DateTime::from_timestamp(-secs, 0)
    } else {
        DateTime::from_timestamp(secs, nanos)
    }
}

pub(crate) fn read(path: &Path) -> Result<Recorded> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Recorded::Missing),
        Err(e) => return Err(Error::Io(e)),
    };
    Ok(match parse_timestamp(&text) {
        Some(ts) => Recorded::At(ts),
        None => Recorded::Corrupt(text),
    })
}

/// Overwrites any previous content.
pub(crate) fn write(path: &Path, ts: DateTime<Utc>) -> Result<()> {
    std::fs::write(path, format_timestamp(ts))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64, nanos: u32) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, nanos).unwrap()
    }

    #[test]
    fn test_sidecar_path_appends() {
        assert_eq!(
            sidecar_path("/cache/daily/2024-01-01.csv"),
            PathBuf::from("/cache/daily/2024-01-01.csv.meta")
        );
    }

    #[test]
    fn test_format_keeps_nanoseconds() {
        assert_eq!(format_timestamp(ts(1735900000, 123456789)), "1735900000.123456789");
        assert_eq!(format_timestamp(ts(1735900000, 0)), "1735900000.000000000");
        assert_eq!(format_timestamp(ts(-2, 500_000_000)), "-1.500000000");
    }

    #[test]
    fn test_parse_accepts_plain_decimals() {
        assert_eq!(parse_timestamp("1735900000"), Some(ts(1735900000, 0)));
        assert_eq!(parse_timestamp("1735900000.0\n"), Some(ts(1735900000, 0)));
        assert_eq!(parse_timestamp("1735900000.5"), Some(ts(1735900000, 500_000_000)));
        assert_eq!(
            parse_timestamp("1735900000.1234567891"),
            Some(ts(1735900000, 123456789))
        );
        assert_eq!(parse_timestamp("-1.5"), Some(ts(-2, 500_000_000)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("1.2.3"), None);
        assert_eq!(parse_timestamp(".5"), None);
        assert_eq!(parse_timestamp("1e9"), None);
    }

    #[test]
    fn test_format_parse_agree() {
        for value in [ts(0, 0), ts(1735900000, 1), ts(-7, 999_999_999)] {
            assert_eq!(parse_timestamp(&format_timestamp(value)), Some(value));
        }
    }

    #[test]
    fn test_read_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let meta = dir.path().join("x.csv.meta");
        assert_eq!(read(&meta).unwrap(), Recorded::Missing);

        std::fs::write(&meta, "not a time").unwrap();
        assert_eq!(read(&meta).unwrap(), Recorded::Corrupt("not a time".to_string()));

        write(&meta, ts(1704153600, 250)).unwrap();
        assert_eq!(read(&meta).unwrap(), Recorded::At(ts(1704153600, 250)));
    }
}
