// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Run orchestration
//!
//! A run moves through fixed stages and stops at the first error:
//!
//! ```text
//! Init -> DiscoverFiles -> LoadFiles (xN) -> RewriteQuery -> Execute -> Stream -> Done
//! ```
//!
//! Discovery only touches the file system, so a missing file is reported
//! before any engine exists. The engine is passed in, never global.

use crate::engine::{DuckDbEngine, Store};
use crate::loader::{LoadReport, load_file};
use crate::template::{QueryTemplate, discover};
use crate::{Engine, EngineError, Error, FileSet, ProgramOptions, Result, ResultRow};
use diagnostics::*;
use std::collections::HashMap;

/// Default query: report the engine version
pub const DEFAULT_QUERY: &str = "SELECT version()";

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub loads: Vec<LoadReport>,
    /// The query as executed
    pub query: String,
    /// Result rows handed to the sink
    pub rows: usize,
}

/// A query with its files discovered and checked, ready to run
#[derive(Debug, Clone)]
pub struct Plan {
    template: QueryTemplate,
    files: FileSet,
}

impl Plan {
    /// Parse `query` and collect the files it needs, from placeholders and
    /// from `extra_files`. Every file must exist.
    pub fn discover(query: &str, extra_files: &[String]) -> Result<Self> {
        let (template, files) = discover(query, extra_files)?;
        Ok(Self { template, files })
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn template(&self) -> &QueryTemplate {
        &self.template
    }

    /// Load every file once, in discovery order.
    pub fn load<E: Engine + ?Sized>(
        &self,
        engine: &mut E,
        options: &ProgramOptions,
    ) -> Result<Vec<LoadReport>> {
        let mut owners: HashMap<String, &str> = HashMap::new();
        let mut loads = Vec::with_capacity(self.files.len());

        for path in &self.files {
            let report = load_file(engine, path, options)?;
            if let Some(previous) = owners.insert(report.table.clone(), path.as_str()) {
                // Both files land in the same table.
                warn!("Files {previous} and {path} share table {table}",
                      previous: previous, path: path.as_str(), table: report.table.as_str());
            }
            loads.push(report);
        }
        Ok(loads)
    }

    /// Load the files, rewrite the query, run it and hand each result row to
    /// `sink`.
    pub fn execute<E, F>(
        &self,
        engine: &mut E,
        options: &ProgramOptions,
        mut sink: F,
    ) -> Result<RunSummary>
    where
        E: Engine + ?Sized,
        F: FnMut(&ResultRow) -> std::io::Result<()>,
    {
        let loads = self.load(engine, options)?;

        let names: HashMap<String, String> = self
            .files
            .iter()
            .zip(&loads)
            .map(|(path, report)| (path.clone(), report.table.clone()))
            .collect();
        let query = self.template.render(&names);
        debug!("Rewritten query: {query}", query: query.as_str());

        let mut output_error = None;
        let mut rows = 0;
        let result = engine.query(&query, &mut |row| {
            sink(row).map_err(|e| {
                let msg = e.to_string();
                output_error = Some(e);
                EngineError::from(msg)
            })?;
            rows += 1;
            Ok(())
        });

        if let Some(e) = output_error {
            return Err(Error::Output(e));
        }
        result.map_err(|source| Error::Query {
            query: query.clone(),
            source,
        })?;

        info!("Streamed {rows} result rows", rows: rows);
        Ok(RunSummary { loads, query, rows })
    }
}

/// Discover, open the store, then execute: the whole pipeline for one query.
pub fn run<F>(
    query: &str,
    extra_files: &[String],
    store: Store,
    options: &ProgramOptions,
    sink: F,
) -> Result<RunSummary>
where
    F: FnMut(&ResultRow) -> std::io::Result<()>,
{
    let plan = Plan::discover(query, extra_files)?;
    let mut engine = DuckDbEngine::open(store)?;
    plan.execute(&mut engine, options, sink)
}
