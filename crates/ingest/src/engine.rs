// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! SQL engine seam
//!
//! The pipeline only needs two things from a database: run a statement with
//! string parameters, and run a query while walking its rows. [`Engine`]
//! captures that; [`DuckDbEngine`] is the production implementation.

use crate::EngineError;
use duckdb::arrow::record_batch::RecordBatch;
use duckdb::arrow::util::display::{ArrayFormatter, FormatOptions};
use duckdb::{Connection, params_from_iter};
use std::fmt;
use std::path::PathBuf;

/// Rendering used for SQL NULL in result rows
pub const NULL_TEXT: &str = "NULL";

/// Marker selecting an ephemeral in-memory store
pub const MEMORY_STORE: &str = ":memory:";

/// One result row as `(column, value)` pairs in engine column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRow {
    columns: Vec<(String, String)>,
}

impl ResultRow {
    pub fn new(columns: Vec<(String, String)>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[(String, String)] {
        &self.columns
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(_, v)| v.as_str())
    }

    /// Value of the first column called `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Values joined by tabs, no header, no trailing separator
    pub fn to_line(&self) -> String {
        self.values().collect::<Vec<_>>().join("\t")
    }
}

/// An SQL-executing service
pub trait Engine {
    /// Prepare and execute a single statement, binding `params` to its
    /// positional placeholders. Returns the number of affected rows.
    fn execute(&mut self, sql: &str, params: &[&str]) -> Result<usize, EngineError>;

    /// Run `sql` and hand every result row to `on_row`, in engine order.
    /// An error from `on_row` stops iteration and is returned as-is.
    fn query(
        &mut self,
        sql: &str,
        on_row: &mut dyn FnMut(&ResultRow) -> Result<(), EngineError>,
    ) -> Result<(), EngineError>;
}

/// Where the DuckDB database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Store {
    Memory,
    File(PathBuf),
}

impl Store {
    /// `:memory:` (or nothing) selects an in-memory store, anything else is a
    /// database file path.
    pub fn parse(value: &str) -> Self {
        if value.is_empty() || value == MEMORY_STORE {
            Store::Memory
        } else {
            Store::File(PathBuf::from(value))
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Store::Memory => write!(f, "{}", MEMORY_STORE),
            Store::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// [`Engine`] over a single DuckDB connection
///
/// The connection closes when the engine is dropped.
pub struct DuckDbEngine {
    conn: Connection,
    store: Store,
}

impl DuckDbEngine {
    pub fn open(store: Store) -> crate::Result<Self> {
        let conn = match &store {
            Store::Memory => Connection::open_in_memory(),
            Store::File(path) => Connection::open(path),
        }
        .map_err(|e| crate::Error::Engine {
            store: store.to_string(),
            source: Box::new(e),
        })?;
        Ok(Self { conn, store })
    }

    pub fn open_in_memory() -> crate::Result<Self> {
        Self::open(Store::Memory)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

impl fmt::Debug for DuckDbEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuckDbEngine")
            .field("store", &self.store)
            .finish()
    }
}

impl Engine for DuckDbEngine {
    fn execute(&mut self, sql: &str, params: &[&str]) -> Result<usize, EngineError> {
        let mut stmt = self.conn.prepare(sql)?;
        Ok(stmt.execute(params_from_iter(params.iter()))?)
    }

    fn query(
        &mut self,
        sql: &str,
        on_row: &mut dyn FnMut(&ResultRow) -> Result<(), EngineError>,
    ) -> Result<(), EngineError> {
        let mut stmt = self.conn.prepare(sql)?;
        for batch in stmt.query_arrow([])? {
            for row in render_batch(&batch)? {
                on_row(&row)?;
            }
        }
        Ok(())
    }
}

/// Render every cell of a record batch as text.
fn render_batch(batch: &RecordBatch) -> Result<Vec<ResultRow>, EngineError> {
    let options = FormatOptions::default().with_null(NULL_TEXT);
    let schema = batch.schema();

    let formatters = batch
        .columns()
        .iter()
        .map(|column| ArrayFormatter::try_new(column.as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()?;

    let rows = (0..batch.num_rows())
        .map(|row| {
            ResultRow::new(
                schema
                    .fields()
                    .iter()
                    .zip(&formatters)
                    .map(|(field, formatter)| {
                        (field.name().to_string(), formatter.value(row).to_string())
                    })
                    .collect(),
            )
        })
        .collect();
    Ok(rows)
}
