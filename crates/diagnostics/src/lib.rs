// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Diagnostics for the csvq workspace
//!
//! Structured logging to stderr, configured once per process.
//!
//! Usage:
//! - Set CSVQ_LOG=off (default) - no logs
//! - Set CSVQ_LOG=info - per-file load summaries
//! - Set CSVQ_LOG=debug - every generated statement and the rewritten query

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable that selects the minimum log level
pub const LOG_ENV: &str = "CSVQ_LOG";

static INIT: Once = Once::new();

/// A parsed `CSVQ_LOG` value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogSetting {
    Off,
    Level(emit::Level),
    /// Not a recognized value; treated as `info`
    Unknown,
}

/// Parse a `CSVQ_LOG` value, case-insensitively.
pub fn parse_level(value: &str) -> LogSetting {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => LogSetting::Off,
        "debug" => LogSetting::Level(emit::Level::Debug),
        "info" => LogSetting::Level(emit::Level::Info),
        "warn" => LogSetting::Level(emit::Level::Warn),
        "error" => LogSetting::Level(emit::Level::Error),
        _ => LogSetting::Unknown,
    }
}

/// Initialize diagnostics based on the CSVQ_LOG environment variable
///
/// Safe to call more than once; only the first call has any effect.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());

        let (level, unknown) = match parse_level(&value) {
            LogSetting::Off => return,
            LogSetting::Level(level) => (level, false),
            LogSetting::Unknown => (emit::Level::Info, true),
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if unknown {
            emit::warn!("Unknown {var} value {value}, using info", var: LOG_ENV, value: value.as_str());
        }

        // The runtime must outlive every emitting thread.
        std::mem::forget(rt);
    });
}

/// Log basic operations
///
/// Examples: "Loaded 2 rows into people", "Streamed 10 rows"
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics
///
/// Examples: "SQL: CREATE TABLE ...", "Flushed batch of 200 rows"
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log conditions that don't stop the run but deserve attention
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log the failure that is about to terminate the run
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;
