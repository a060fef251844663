// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use diagnostics::*;
use ingest::{ProgramOptions, RunSummary, Store};
use std::io::Write;

use crate::args::Cli;

/// Load the files named by `cli`, run its query and write each result row
/// to `out` as one tab-separated line.
pub fn query_command<W: Write>(cli: &Cli, out: &mut W) -> Result<RunSummary> {
    let options = ProgramOptions::new(
        cli.delimiter(),
        cli.keep_extension,
        cli.has_header,
        cli.batch_size,
    )
    .context("invalid options")?;
    let store = Store::parse(&cli.database);

    let target = store.to_string();
    debug!("Running query against {store}", store: target.as_str());

    let summary = ingest::run(&cli.query, &cli.files, store, &options, |row| {
        writeln!(out, "{}", row.to_line())
    })?;
    out.flush().context("failed to flush output")?;

    Ok(summary)
}
