use std::{error::Error as StdError, time::Duration};
use thiserror::Error;

/// Validation and compilation failures. Always raised before any statement reaches a connection.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("The operator \"{0}\" is not permitted")]
    InvalidOperator(String),
    #[error("Undefined binding(s) detected when compiling {method}. Undefined column(s): [{columns}] query: {sql}")]
    UndefinedBinding {
        method: &'static str,
        columns: String,
        sql: String,
    },
    #[error("Expected {expected} bindings, saw {actual}")]
    BindingCount { expected: usize, actual: usize },
    #[error("Identifier binding must be a text value, found {0}")]
    IdentifierBinding(&'static str),
    #[error("Invalid chunk size: {0}, it must be a positive integer")]
    InvalidChunkSize(usize),
    #[error("A table name is required to compile {0}")]
    MissingTable(&'static str),
    #[error("Column at position {0} has no name")]
    MissingColumnName(usize),
    #[error("Column type {column_type} of column \"{column}\" is not supported by {dialect}")]
    UnsupportedType {
        column_type: String,
        column: String,
        dialect: &'static str,
    },
    #[error("Empty {0}() call, at least one column or value is required")]
    Empty(&'static str),
    #[error("{0}")]
    Invalid(String),
}

/// Failures of the `CREATE TABLE` rewrite. Raised before any DDL is executed.
#[derive(Debug, Error)]
pub enum DdlError {
    #[error("No column definitions in this statement: {0}")]
    NoColumnDefinitions(String),
    #[error("The column {column} is not in the {table} table")]
    ColumnNotFound { column: String, table: String },
    #[error("Unable to drop last column from table")]
    LastColumn,
    #[error("Unable to find the column to change: {0}")]
    ColumnToChange(String),
    #[error("Table {0} was not found in sqlite_master")]
    TableNotFound(String),
}

/// Failures raised by the runner around the execution of a statement.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Defined query timeout of {}ms exceeded when running query", .timeout.as_millis())]
    Timeout { timeout: Duration, sql: String },
    #[error(
        "Query cancelling not supported for the {dialect} dialect, the query timed out after {}ms",
        .timeout.as_millis()
    )]
    CancelUnsupported {
        dialect: &'static str,
        timeout: Duration,
        sql: String,
    },
    #[error(
        "After query timeout of {}ms exceeded, cancelling of query failed: {source}",
        .timeout.as_millis()
    )]
    CancelFailed {
        timeout: Duration,
        sql: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("The connection was disposed and cannot run further statements: {0}")]
    Disposed(String),
}

impl RunnerError {
    /// Whether the error originates from a statement running past its timeout.
    pub fn is_timeout(&self) -> bool {
        !matches!(self, RunnerError::Disposed(..))
    }
}
