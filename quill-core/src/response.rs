use crate::{AsValue, Error, Record, Result, Value};
use std::{collections::BTreeMap, sync::Arc};

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted / affected identifier when available.
    pub last_affected_id: Option<i64>,
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values()[i])
    }
    /// Converts the named column into `T`.
    pub fn get<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get_column(name)
            .ok_or_else(|| Error::msg(format!("Column `{}` is not part of the row", name)))?;
        T::try_from_value(value.clone())
    }
    pub fn into_record(self) -> Record {
        self.labels
            .iter()
            .cloned()
            .zip(self.values.into_vec())
            .collect()
    }
}

/// Heterogeneous items produced by `Executor::run` combining rows and modify results.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// A labeled row.
    Row(RowLabeled),
    /// A modify effect aggregation.
    Affected(RowsAffected),
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_affected_id.is_some() {
                self.last_affected_id = elem.last_affected_id;
            }
        }
    }
}

impl From<RowLabeled> for QueryResult {
    fn from(value: RowLabeled) -> Self {
        QueryResult::Row(value)
    }
}

impl From<RowsAffected> for QueryResult {
    fn from(value: RowsAffected) -> Self {
        QueryResult::Affected(value)
    }
}

/// Everything the driver answered for one statement, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    pub rows: Vec<RowLabeled>,
    pub affected: RowsAffected,
}

impl Extend<QueryResult> for RawResponse {
    fn extend<T: IntoIterator<Item = QueryResult>>(&mut self, iter: T) {
        for item in iter {
            match item {
                QueryResult::Row(row) => self.rows.push(row),
                QueryResult::Affected(affected) => self.affected.extend([affected]),
            }
        }
    }
}

/// Description of a table column as reported by introspection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnInfo {
    pub data_type: String,
    pub max_length: Option<i64>,
    pub nullable: bool,
    pub default_value: Option<String>,
}

/// Normalized response of a statement, shaped by its method.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Rows(Vec<RowLabeled>),
    Row(Option<RowLabeled>),
    Values(Vec<Value>),
    Affected(RowsAffected),
    Exists(bool),
    Columns(BTreeMap<String, ColumnInfo>),
    Empty,
}

impl QueryOutput {
    pub fn rows(self) -> Result<Vec<RowLabeled>> {
        match self {
            QueryOutput::Rows(v) => Ok(v),
            QueryOutput::Row(v) => Ok(v.into_iter().collect()),
            v => Err(Error::msg(format!("Expected rows, found {:?}", v))),
        }
    }
    pub fn affected(&self) -> Option<RowsAffected> {
        match self {
            QueryOutput::Affected(v) => Some(*v),
            QueryOutput::Rows(v) => Some(RowsAffected {
                rows_affected: v.len() as u64,
                last_affected_id: None,
            }),
            _ => None,
        }
    }
    pub fn exists(&self) -> Option<bool> {
        match self {
            QueryOutput::Exists(v) => Some(*v),
            _ => None,
        }
    }
}
