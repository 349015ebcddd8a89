mod column;
mod query;
mod schema;
mod table;

pub use column::*;
pub use query::*;
pub use schema::*;
pub use table::*;

use crate::{Executor, QueryOutput, RawResponse, Result, Value, future::BoxFuture};
use std::{fmt, sync::Arc, time::Duration};

/// Kind of operation a compiled statement performs, decides how its response is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Select,
    First,
    Pluck,
    Insert,
    Update,
    Delete,
    Truncate,
    ColumnInfo,
    HasTable,
    HasColumn,
    Ddl,
    Raw,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Select => "select",
            Method::First => "first",
            Method::Pluck => "pluck",
            Method::Insert => "insert",
            Method::Update => "update",
            Method::Delete => "del",
            Method::Truncate => "truncate",
            Method::ColumnInfo => "columnInfo",
            Method::HasTable => "hasTable",
            Method::HasColumn => "hasColumn",
            Method::Ddl => "ddl",
            Method::Raw => "raw",
        }
    }
}

pub type TransformFn = Arc<dyn Fn(RawResponse) -> Result<QueryOutput> + Send + Sync>;
pub type ContinueFn = Arc<
    dyn for<'c> Fn(&'c mut dyn Executor, RawResponse) -> BoxFuture<'c, Result<QueryOutput>>
        + Send
        + Sync,
>;

/// Custom handling of the response of a statement.
#[derive(Clone)]
pub enum Output {
    /// Pure reshaping of the response.
    Transform(TransformFn),
    /// Receives the executor the statement ran on and may keep running statements on it.
    Continue(ContinueFn),
}

impl Output {
    pub fn transform(f: impl Fn(RawResponse) -> Result<QueryOutput> + Send + Sync + 'static) -> Self {
        Output::Transform(Arc::new(f))
    }

    pub fn continuation<F>(f: F) -> Self
    where
        F: for<'c> Fn(&'c mut dyn Executor, RawResponse) -> BoxFuture<'c, Result<QueryOutput>>
            + Send
            + Sync
            + 'static,
    {
        Output::Continue(Arc::new(f))
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Output::Transform(..) => "Output::Transform",
            Output::Continue(..) => "Output::Continue",
        })
    }
}

/// A complete SQL statement with its positional bindings, immutable once produced.
///
/// The SQL uses `?` placeholders (`\?` for a literal question mark). Conversion to the
/// native placeholder syntax of the dialect happens right before execution.
#[derive(Debug, Clone)]
pub struct CompiledStatement {
    pub sql: String,
    pub bindings: Vec<Value>,
    pub method: Method,
    pub output: Option<Output>,
    pub timeout: Option<Duration>,
    pub cancel_on_timeout: bool,
    pub pluck: Option<String>,
    pub returning: bool,
}

impl CompiledStatement {
    pub fn new(sql: impl Into<String>, bindings: Vec<Value>, method: Method) -> Self {
        Self {
            sql: sql.into(),
            bindings,
            method,
            output: None,
            timeout: None,
            cancel_on_timeout: false,
            pluck: None,
            returning: false,
        }
    }

    pub fn ddl(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new(), Method::Ddl)
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }
}

impl PartialEq for CompiledStatement {
    fn eq(&self, other: &Self) -> bool {
        self.sql == other.sql
            && self.bindings == other.bindings
            && self.method == other.method
            && self.timeout == other.timeout
            && self.cancel_on_timeout == other.cancel_on_timeout
            && self.pluck == other.pluck
            && self.returning == other.returning
    }
}

/// Ordered statements produced by one compilation, executed strictly in order.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    statements: Vec<CompiledStatement>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: CompiledStatement) {
        self.statements.push(statement);
    }

    pub fn push_ddl(&mut self, sql: impl Into<String>) {
        self.push(CompiledStatement::ddl(sql));
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn into_vec(self) -> Vec<CompiledStatement> {
        self.statements
    }
}
