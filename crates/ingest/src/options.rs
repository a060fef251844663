// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Run configuration
//!
//! Resolved once at startup and read-only afterwards.

use crate::{Error, Result};

/// Number of value tuples per bulk insert statement
pub const BATCH_SIZE: usize = 200;

/// Options that shape how files become tables
///
/// | option | default |
/// |---|---|
/// | `delimiter` | `,` |
/// | `keep_extension` | `false` |
/// | `has_header` | `true` |
/// | `batch_size` | [`BATCH_SIZE`] |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramOptions {
    /// Field delimiter, always a single ASCII character
    pub delimiter: u8,

    /// Keep the file extension as part of the table name
    pub keep_extension: bool,

    /// Treat the first row of each file as column names
    pub has_header: bool,

    /// Value tuples per insert statement, at least 1
    pub batch_size: usize,
}

fn default_delimiter() -> u8 {
    b','
}
fn default_keep_extension() -> bool {
    false
}
fn default_has_header() -> bool {
    true
}
fn default_batch_size() -> usize {
    BATCH_SIZE
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            keep_extension: default_keep_extension(),
            has_header: default_has_header(),
            batch_size: default_batch_size(),
        }
    }
}

impl ProgramOptions {
    /// Validate raw command-line values into options.
    pub fn new(
        delimiter: &str,
        keep_extension: bool,
        has_header: bool,
        batch_size: usize,
    ) -> Result<Self> {
        Ok(Self {
            delimiter: parse_delimiter(delimiter)?,
            keep_extension,
            has_header,
            batch_size: check_batch_size(batch_size)?,
        })
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_keep_extension(mut self, keep_extension: bool) -> Self {
        self.keep_extension = keep_extension;
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        self.batch_size = check_batch_size(batch_size)?;
        Ok(self)
    }
}

/// The delimiter must be exactly one code point, and that code point must be
/// ASCII because the reader splits on bytes.
fn parse_delimiter(value: &str) -> Result<u8> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(Error::InvalidDelimiter(value.to_string())),
    }
}

fn check_batch_size(batch_size: usize) -> Result<usize> {
    if batch_size == 0 {
        return Err(Error::InvalidBatchSize(batch_size));
    }
    Ok(batch_size)
}
