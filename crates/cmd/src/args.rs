// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line arguments
//!
//! Flags are accepted both as `--db x` and in the single-dash spelling
//! `-db x` / `-db=x`. [`normalize_args`] rewrites the single-dash forms of
//! the known multi-letter flags before clap sees them.

use clap::{ArgAction, Parser};
use clap::builder::BoolishValueParser;
use ingest::engine::MEMORY_STORE;
use ingest::{BATCH_SIZE, DEFAULT_QUERY};

/// Long flags that may also be written with a single dash
const LONG_FLAGS: &[&str] = &["q", "db", "dl", "ke", "he", "batch-size"];

/// Query delimited text files with SQL.
///
/// Files named in the query as `{{ file.csv }}` are loaded into tables of an
/// embedded database before the query runs. Each result row is printed on
/// its own line, values separated by tabs.
#[derive(Parser, Debug, Clone)]
#[command(name = "csvq", version, long_about = None)]
pub struct Cli {
    /// The query to run over the files. Omit to print the database version
    #[arg(short = 'q', long = "q", value_name = "QUERY", default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Database file to create or reuse. Omit for an in-memory database
    #[arg(long = "db", value_name = "PATH", default_value = MEMORY_STORE)]
    pub database: String,

    /// Field delimiter, a single character (`\t` or `tab` for a tab)
    #[arg(long = "dl", value_name = "CHAR", default_value = ",")]
    pub delimiter: String,

    /// Keep the file extension as part of the table name. A bare flag means true
    #[arg(long = "ke", value_name = "BOOL", default_value = "false", action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub keep_extension: bool,

    /// Treat the first row of each file as column names. A bare flag means true
    #[arg(long = "he", value_name = "BOOL", default_value = "true", action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub has_header: bool,

    /// Rows per insert statement
    #[arg(long = "batch-size", value_name = "N", default_value_t = BATCH_SIZE)]
    pub batch_size: usize,

    /// Additional files to load
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,
}

impl Cli {
    /// Parse from raw process arguments, normalizing single-dash flags first.
    pub fn parse_normalized<I, S>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::try_parse_from(normalize_args(args))
    }

    /// The delimiter with the `\t` and `tab` spellings expanded.
    pub fn delimiter(&self) -> &str {
        match self.delimiter.as_str() {
            "\\t" | "tab" => "\t",
            other => other,
        }
    }
}

/// Rewrite `-db`, `-dl=;` and friends as `--db`, `--dl=;`.
///
/// The program name, unknown flags, values and everything after `--` pass
/// through unchanged. `-q` is a real short flag and is left alone unless
/// written `-q=...`.
pub fn normalize_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out = Vec::new();
    let mut done = false;

    for (i, arg) in args.into_iter().map(Into::into).enumerate() {
        if i == 0 || done {
            out.push(arg);
            continue;
        }
        if arg == "--" {
            done = true;
            out.push(arg);
            continue;
        }

        let rewrite = match arg.strip_prefix('-') {
            Some(rest) if !rest.starts_with('-') => {
                let name = rest.split('=').next().unwrap_or_default();
                LONG_FLAGS.contains(&name) && (name.len() > 1 || rest.contains('='))
            }
            _ => false,
        };

        if rewrite {
            out.push(format!("-{arg}"));
        } else {
            out.push(arg);
        }
    }
    out
}
