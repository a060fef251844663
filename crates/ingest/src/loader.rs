// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Table creation and batched inserts
//!
//! A parsed file becomes one `CREATE TABLE IF NOT EXISTS` with every column
//! declared `TEXT`, followed by `INSERT` statements carrying at most
//! `batch_size` value tuples each. Values are bound as parameters.
//!
//! Rows are not width-checked against the column list. A short or long row
//! produces a tuple of its own width and the engine's arity error is returned.

use crate::parser::{ParsedTable, Row, read_table};
use crate::table_name::{quote_ident, resolve};
use crate::{Engine, Error, ProgramOptions, Result};
use diagnostics::*;
use std::path::Path;

/// What a load did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub table: String,
    pub columns: Vec<String>,
    /// Data rows inserted, header excluded
    pub rows: usize,
    /// Insert statements issued
    pub statements: usize,
}

/// Column names for a table whose first row is `first`.
///
/// With a header the row itself names the columns, otherwise they are
/// `Column1..ColumnN` for the width of the row. An empty header cell takes
/// the `ColumnN` name of its position.
pub fn column_names(first: &Row, has_header: bool) -> Vec<String> {
    first
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if has_header && !name.is_empty() {
                name.clone()
            } else {
                format!("Column{}", i + 1)
            }
        })
        .collect()
}

pub fn create_table_sql(table: &str, columns: &[String]) -> String {
    let defs = columns
        .iter()
        .map(|c| format!("{} TEXT", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {} ({});", quote_ident(table), defs)
}

/// An insert with one `(?, ...)` tuple per row, each as wide as its row.
pub fn insert_sql(table: &str, rows: &[Row]) -> String {
    let tuples = rows
        .iter()
        .map(|row| format!("({})", vec!["?"; row.len()].join(", ")))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} VALUES {};", quote_ident(table), tuples)
}

/// Create `table` from `parsed` and insert its data rows.
///
/// Schema creation is idempotent, insertion is not: loading the same rows
/// twice appends them twice. An empty file creates nothing.
pub fn load<E: Engine + ?Sized>(
    engine: &mut E,
    table: &str,
    parsed: ParsedTable,
    options: &ProgramOptions,
) -> Result<LoadReport> {
    let mut rows = parsed.into_rows();
    if rows.is_empty() {
        warn!("No rows to load for {table}", table: table);
        return Ok(LoadReport {
            table: table.to_string(),
            columns: Vec::new(),
            rows: 0,
            statements: 0,
        });
    }

    let columns = column_names(&rows[0], options.has_header);
    if options.has_header {
        rows.remove(0);
    }

    let create = create_table_sql(table, &columns);
    debug!("SQL: {sql}", sql: create.as_str());
    engine.execute(&create, &[]).map_err(|source| Error::Schema {
        table: table.to_string(),
        source,
    })?;

    let mut statements = 0;
    for batch in rows.chunks(options.batch_size.max(1)) {
        let sql = insert_sql(table, batch);
        let params: Vec<&str> = batch.iter().flatten().map(String::as_str).collect();
        let count = batch.len();
        debug!("Inserting {count} rows into {table}", count: count, table: table);

        engine.execute(&sql, &params).map_err(|source| Error::Statement {
            table: table.to_string(),
            source,
        })?;
        statements += 1;
    }

    let count = rows.len();
    info!("Loaded {count} rows into {table} with {statements} insert statements",
          count: count, table: table, statements: statements);

    Ok(LoadReport {
        table: table.to_string(),
        columns,
        rows: count,
        statements,
    })
}

/// Parse the file at `path`, derive its table name and load it.
pub fn load_file<E: Engine + ?Sized>(
    engine: &mut E,
    path: &str,
    options: &ProgramOptions,
) -> Result<LoadReport> {
    let parsed = read_table(Path::new(path), options.delimiter)?;
    let table = resolve(path, options.keep_extension);
    debug!("Loading {path} as {table}", path: path, table: table.as_str());
    load(engine, &table, parsed, options)
}
