// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Delimited text reader
//!
//! Reads a whole file into rows of strings. Row 0 is returned like any other
//! row; whether it is a header is the loader's decision.
//!
//! Quoting follows the usual rules: a quoted field may contain the delimiter,
//! line breaks and doubled quotes. Malformed quoting (an unterminated quoted
//! field, text after a closing quote, a bare quote inside an unquoted field) is
//! rejected rather than read leniently.

use crate::{Error, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// One row of field values, in file order
pub type Row = Vec<String>;

/// Rows of a delimited file, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    rows: Vec<Row>,
}

impl ParsedTable {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse delimited text from any reader.
pub fn parse_reader<R: Read>(reader: R, delimiter: u8) -> std::result::Result<ParsedTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(QuoteValidator::new(reader, delimiter));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(ParsedTable::new(rows))
}

/// Read and parse the file at `path`.
///
/// The file is closed before this returns, whether parsing succeeded or not.
pub fn read_table<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<ParsedTable> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let file = File::open(path).map_err(|e| Error::malformed_input(&display, e.into()))?;
    parse_reader(file, delimiter).map_err(|e| Error::malformed_input(display, e))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote seen inside a quoted field: either a closing or an escaped one
    QuoteInQuoted,
}

/// Passes bytes through unchanged while checking quote syntax, failing the
/// read with `InvalidData` at the first violation.
struct QuoteValidator<R> {
    inner: R,
    delimiter: u8,
    state: QuoteState,
    line: u64,
}

impl<R: Read> QuoteValidator<R> {
    fn new(inner: R, delimiter: u8) -> Self {
        Self {
            inner,
            delimiter,
            state: QuoteState::FieldStart,
            line: 1,
        }
    }

    fn invalid(&self, msg: &str) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, format!("line {}: {}", self.line, msg))
    }

    fn observe(&mut self, byte: u8) -> io::Result<()> {
        let is_break = byte == b'\n' || byte == b'\r';
        let ends_field = is_break || byte == self.delimiter;

        self.state = match self.state {
            QuoteState::FieldStart | QuoteState::Unquoted if ends_field => QuoteState::FieldStart,
            QuoteState::FieldStart if byte == b'"' => QuoteState::Quoted,
            QuoteState::FieldStart => QuoteState::Unquoted,
            QuoteState::Unquoted if byte == b'"' => {
                return Err(self.invalid("bare \" in non-quoted field"));
            }
            QuoteState::Unquoted => QuoteState::Unquoted,
            QuoteState::Quoted if byte == b'"' => QuoteState::QuoteInQuoted,
            QuoteState::Quoted => QuoteState::Quoted,
            QuoteState::QuoteInQuoted if byte == b'"' => QuoteState::Quoted,
            QuoteState::QuoteInQuoted if ends_field => QuoteState::FieldStart,
            QuoteState::QuoteInQuoted => {
                return Err(self.invalid("extraneous character after closing quote"));
            }
        };

        if byte == b'\n' {
            self.line += 1;
        }
        Ok(())
    }
}

impl<R: Read> Read for QuoteValidator<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 && !buf.is_empty() && self.state == QuoteState::Quoted {
            return Err(self.invalid("unterminated quoted field"));
        }
        for &byte in &buf[..n] {
            self.observe(byte)?;
        }
        Ok(n)
    }
}
