// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use cmd::{Cli, query_command};
use diagnostics::*;
use std::io::{self, BufWriter};
use std::process::ExitCode;

#[allow(clippy::print_stderr)]
fn main() -> ExitCode {
    diagnostics::init();

    let args = std::env::args_os().map(|a| a.to_string_lossy().into_owned());
    let cli = match Cli::parse_normalized(args) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match query_command(&cli, &mut out) {
        Ok(summary) => {
            debug!("Done: {files} files, {rows} rows", files: summary.loads.len(), rows: summary.rows);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let message = format!("{err:#}");
            error!("csvq failed: {message}", message: message.as_str());
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}
