// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Ingest - query delimited text files with SQL
//!
//! Files named in a query as `{{ path }}` (or passed alongside it) are parsed,
//! loaded into tables of an embedded engine, and the query is rewritten to
//! refer to those tables before it runs.
//!
//! ```rust,no_run
//! use ingest::{ProgramOptions, Store, run};
//!
//! # fn example() -> ingest::Result<()> {
//! let summary = run(
//!     "SELECT name FROM {{ people.csv }}",
//!     &[],
//!     Store::Memory,
//!     &ProgramOptions::default(),
//!     |row| {
//!         println!("{}", row.to_line());
//!         Ok(())
//!     },
//! )?;
//! assert_eq!(summary.loads.len(), 1);
//! # Ok(())
//! # }
//! ```

mod error;
mod file_set;
mod options;

pub mod engine;
pub mod loader;
pub mod parser;
pub mod plan;
pub mod table_name;
pub mod template;
pub mod testing;

pub use engine::{DuckDbEngine, Engine, ResultRow, Store};
pub use error::{EngineError, Error, Result};
pub use file_set::FileSet;
pub use loader::LoadReport;
pub use options::{BATCH_SIZE, ProgramOptions};
pub use parser::ParsedTable;
pub use plan::{DEFAULT_QUERY, Plan, RunSummary, run};
pub use table_name::resolve;
pub use template::QueryTemplate;
