// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

/// Failure reported by an [`Engine`](crate::Engine) implementation
pub type EngineError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Ingestion pipeline error types
///
/// Every variant is fatal for a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A placeholder or positional argument names a file that does not exist
    #[error("{path}")]
    MissingFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file could not be opened, read or parsed as delimited text
    #[error("Malformed input {path}")]
    MalformedInput {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// The engine rejected a table-creation statement
    #[error("Failed to create table \"{table}\"")]
    Schema {
        table: String,
        #[source]
        source: EngineError,
    },

    /// The engine rejected an insert statement
    #[error("Failed to insert into \"{table}\"")]
    Statement {
        table: String,
        #[source]
        source: EngineError,
    },

    /// The rewritten query failed to execute
    #[error("Query failed: {query}")]
    Query {
        query: String,
        #[source]
        source: EngineError,
    },

    /// A result row could not be written out
    #[error("Failed to write result row")]
    Output(#[source] std::io::Error),

    /// The backing store could not be opened
    #[error("Failed to open database {store}")]
    Engine {
        store: String,
        #[source]
        source: EngineError,
    },

    /// The field delimiter is not a single ASCII character
    #[error("Invalid delimiter {0:?}: expected a single ASCII character")]
    InvalidDelimiter(String),

    /// The batch size is zero
    #[error("Invalid batch size {0}: must be at least 1")]
    InvalidBatchSize(usize),
}

impl Error {
    pub fn missing_file<S: Into<String>>(path: S, source: std::io::Error) -> Self {
        Error::MissingFile {
            path: path.into(),
            source,
        }
    }

    pub fn malformed_input<S: Into<String>>(path: S, source: csv::Error) -> Self {
        Error::MalformedInput {
            path: path.into(),
            source,
        }
    }
}

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_message_leaves_cause_to_source_chain() {
        let err = Error::missing_file("gone.csv", io::Error::new(io::ErrorKind::NotFound, "not found"));
        assert_eq!(err.to_string(), "gone.csv");
        assert_eq!(err.source().map(|s| s.to_string()), Some("not found".to_string()));

        let err = Error::Schema {
            table: "t".to_string(),
            source: "bad column".into(),
        };
        assert_eq!(err.to_string(), "Failed to create table \"t\"");
        assert!(err.source().is_some());
    }
}
