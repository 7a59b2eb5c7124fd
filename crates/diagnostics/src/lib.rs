//! Logging setup shared by the cachefs workspace.
//!
//! Events are emitted with `emit` and written to stderr by `emit_term`.
//! The `CACHEFS_LOG` environment variable selects the threshold:
//!
//! - `off` (default): nothing is written
//! - `error`, `warn`, `info`: progressively more
//! - `debug`: every cache probe, hit and refresh

use std::sync::Once;

// Re-exported so the macros below resolve through `$crate`.
pub use emit;

/// Environment variable read by [`init_diagnostics`].
pub const LOG_ENV: &str = "CACHEFS_LOG";

static INIT: Once = Once::new();

/// Parse a `CACHEFS_LOG` value. `Ok(None)` means logging is off.
pub fn parse_threshold(value: &str) -> Result<Option<emit::Level>, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => Ok(None),
        "error" => Ok(Some(emit::Level::Error)),
        "warn" => Ok(Some(emit::Level::Warn)),
        "info" => Ok(Some(emit::Level::Info)),
        "debug" => Ok(Some(emit::Level::Debug)),
        other => Err(format!("unknown {} value '{}'", LOG_ENV, other)),
    }
}

/// Install the stderr emitter once per process.
///
/// Later calls are no-ops, so libraries and tests may call it freely.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_default();

        let (level, complaint) = match parse_threshold(&value) {
            Ok(None) => return,
            Ok(Some(level)) => (level, None),
            Err(msg) => (emit::Level::Info, Some(msg)),
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if let Some(complaint) = complaint {
            report_fallback(&complaint);
        }

        // The runtime must outlive every emitting thread.
        std::mem::forget(rt);
    });
}

fn report_fallback(complaint: &str) {
    emit::warn!("{complaint}, falling back to info", complaint);
}

pub use init_diagnostics as init;

/// Routine operations: downloads, opened streams.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Per-call detail: cache probes, hits, skipped dates.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Recoverable oddities, such as a sidecar that had to be rewritten.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("off"), Ok(None));
        assert_eq!(parse_threshold(""), Ok(None));
        assert_eq!(parse_threshold("DEBUG"), Ok(Some(emit::Level::Debug)));
        assert_eq!(parse_threshold(" warn "), Ok(Some(emit::Level::Warn)));
        assert!(parse_threshold("verbose").is_err());
    }

    #[test]
    fn test_report_fallback() {
        let complaint = parse_threshold("verbose").unwrap_err();
        assert!(complaint.contains(LOG_ENV));
        report_fallback(&complaint);
    }

    #[test]
    fn test_init_is_idempotent() {
        init_diagnostics();
        init();
    }

    #[test]
    fn test_macros_expand() {
        let key = "daily/2024-01-02.csv";
        debug!("probe {key}", key);
        info!("downloaded {key} ({bytes} bytes)", key, bytes: 42);
        warn!("sidecar rewritten for {key}", key);
        error!("store failure for {key}", key);
    }
}
