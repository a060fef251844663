// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Test doubles for the engine seam

use crate::{Engine, EngineError, ResultRow};

/// A statement seen by [`RecordingEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedStatement {
    pub sql: String,
    pub params: Vec<String>,
}

/// Engine that records what it is asked to run instead of running it
///
/// Queries are answered with `rows`. If `fail_on` is set, any statement or
/// query whose SQL contains it fails.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub statements: Vec<RecordedStatement>,
    pub queries: Vec<String>,
    pub rows: Vec<ResultRow>,
    pub fail_on: Option<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on<S: Into<String>>(pattern: S) -> Self {
        Self {
            fail_on: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Statements whose SQL starts with `prefix`
    pub fn statements_starting_with(&self, prefix: &str) -> Vec<&RecordedStatement> {
        self.statements
            .iter()
            .filter(|s| s.sql.starts_with(prefix))
            .collect()
    }

    /// True if the engine has not been asked to do anything
    pub fn is_untouched(&self) -> bool {
        self.statements.is_empty() && self.queries.is_empty()
    }

    fn check(&self, sql: &str) -> Result<(), EngineError> {
        match &self.fail_on {
            Some(pattern) if sql.contains(pattern.as_str()) => {
                Err(format!("rejected statement: {}", sql).into())
            }
            _ => Ok(()),
        }
    }
}

impl Engine for RecordingEngine {
    fn execute(&mut self, sql: &str, params: &[&str]) -> Result<usize, EngineError> {
        self.statements.push(RecordedStatement {
            sql: sql.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        });
        self.check(sql)?;
        Ok(0)
    }

    fn query(
        &mut self,
        sql: &str,
        on_row: &mut dyn FnMut(&ResultRow) -> Result<(), EngineError>,
    ) -> Result<(), EngineError> {
        self.queries.push(sql.to_string());
        self.check(sql)?;
        for row in &self.rows {
            on_row(row)?;
        }
        Ok(())
    }
}
