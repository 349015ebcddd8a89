use quill_core::{
    Connection, ErrorContext, Executor, GenericDialect, QueryResult, Result, RowLabeled,
    RowNames, RowsAffected, Value, stream::{self, BoxStream, StreamExt}, truncate_long,
};
use rusqlite::{params_from_iter, types::ValueRef};

/// In-memory SQLite database used to run compiled statements for real.
pub struct SqliteTestConnection {
    connection: rusqlite::Connection,
    executed: Vec<String>,
    disposed: Option<String>,
}

impl SqliteTestConnection {
    pub fn open() -> Result<Self> {
        Ok(Self {
            connection: rusqlite::Connection::open_in_memory()
                .context("Could not open an in-memory database")?,
            executed: Vec::new(),
            disposed: None,
        })
    }

    /// Runs a script of statements without bindings, for fixtures.
    pub fn batch(&self, sql: &str) -> Result<()> {
        self.connection
            .execute_batch(sql)
            .with_context(|| format!("Could not execute the script:\n{}", truncate_long!(sql)))
    }

    /// Stored definition of `table`.
    pub fn table_sql(&self, table: &str) -> Result<String> {
        Ok(self.connection.query_row(
            "select sql from sqlite_master where type = 'table' and name = ?",
            [table],
            |row| row.get(0),
        )?)
    }

    /// Stored definitions of the indexes created explicitly on `table`, ordered by name.
    pub fn index_sql(&self, table: &str) -> Result<Vec<String>> {
        let mut statement = self.connection.prepare(
            "select sql from sqlite_master where type = 'index' and tbl_name = ? and sql is not null order by name",
        )?;
        let rows = statement.query_map([table], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
    }

    /// Every statement received through [`Executor::run`], in order.
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    fn query(&mut self, sql: &str, bindings: &[Value]) -> Result<Vec<QueryResult>> {
        self.executed.push(sql.to_string());
        let params: Vec<rusqlite::types::Value> = bindings.iter().map(to_sqlite).collect();
        let mut statement = self
            .connection
            .prepare(sql)
            .with_context(|| format!("Could not prepare the query:\n{}", truncate_long!(sql)))?;
        if statement.column_count() == 0 {
            let rows_affected = statement.execute(params_from_iter(params.iter()))?;
            return Ok(vec![
                RowsAffected {
                    rows_affected: rows_affected as u64,
                    last_affected_id: Some(self.connection.last_insert_rowid()),
                }
                .into(),
            ]);
        }
        let labels: RowNames = statement
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let mut rows = statement.query(params_from_iter(params.iter()))?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..labels.len())
                .map(|i| row.get_ref(i).map(from_sqlite))
                .collect::<rusqlite::Result<Box<[Value]>>>()?;
            result.push(RowLabeled::new(labels.clone(), values).into());
        }
        Ok(result)
    }
}

impl Executor for SqliteTestConnection {
    fn run<'s>(
        &'s mut self,
        sql: &'s str,
        bindings: &'s [Value],
    ) -> BoxStream<'s, Result<QueryResult>> {
        match self.query(sql, bindings) {
            Ok(results) => stream::iter(results.into_iter().map(Ok)).boxed(),
            Err(e) => stream::once(async { Err(e) }).boxed(),
        }
    }
}

impl Connection for SqliteTestConnection {
    fn dispose(&mut self, reason: String) {
        self.disposed = Some(reason);
    }

    fn disposed(&self) -> Option<&str> {
        self.disposed.as_deref()
    }
}

fn to_sqlite(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sqlite;
    match value {
        Value::Null | Value::Default => Sqlite::Null,
        Value::Boolean(v) => Sqlite::Integer(*v as i64),
        Value::Int(v) => Sqlite::Integer(*v),
        Value::Float(v) => Sqlite::Real(*v),
        Value::Text(v) | Value::Json(v) => Sqlite::Text(v.clone()),
        Value::Blob(v) => Sqlite::Blob(v.to_vec()),
        Value::Decimal(v) => Sqlite::Text(v.to_string()),
        Value::Uuid(v) => Sqlite::Text(v.to_string()),
        Value::Date(..) | Value::Time(..) | Value::Timestamp(..) => {
            let mut out = String::new();
            quill_core::Dialect::write_value(&GenericDialect, &mut out, value);
            Sqlite::Text(out.trim_matches('\'').to_string())
        }
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int(v),
        ValueRef::Real(v) => Value::Float(v),
        ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => Value::Blob(v.into()),
    }
}
