use crate::{
    CompileError, CompiledStatement, Config, Connection, Dialect, Error, Executor, Output, Pool,
    QueryBuilder, QueryOutput, Record, Result, RunnerError, interpolate, truncate_long,
};
use std::time::Duration;

/// Runs compiled statements on one exclusively borrowed connection, strictly in order.
pub struct Runner<'c, C: Connection> {
    dialect: &'c dyn Dialect,
    connection: &'c mut C,
}

impl<'c, C: Connection> Runner<'c, C> {
    pub fn new(dialect: &'c dyn Dialect, connection: &'c mut C) -> Self {
        Self {
            dialect,
            connection,
        }
    }

    pub fn connection(&mut self) -> &mut C {
        self.connection
    }

    /// Runs every statement, each one only after the previous completed. Returns the output of
    /// the last statement (`QueryOutput::Empty` for an empty sequence).
    pub async fn run_all(&mut self, statements: &[CompiledStatement]) -> Result<QueryOutput> {
        let mut output = QueryOutput::Empty;
        for statement in statements {
            output = self.run(statement).await?;
        }
        Ok(output)
    }

    pub async fn run(&mut self, statement: &CompiledStatement) -> Result<QueryOutput> {
        if let Some(reason) = self.connection.disposed() {
            return Err(RunnerError::Disposed(reason.to_string()).into());
        }
        let sql = self.dialect.position_bindings(&statement.sql);
        log::debug!("{}", truncate_long!(sql));
        let result = match statement.timeout {
            Some(timeout) => {
                tokio::time::timeout(timeout, self.connection.collect(&sql, &statement.bindings))
                    .await
                    .map_err(|_| timeout)
            }
            None => Ok(self.connection.collect(&sql, &statement.bindings).await),
        };
        let response = match result {
            Ok(response) => response,
            Err(timeout) => return Err(self.on_timeout(statement, timeout).await),
        };
        let response = response.map_err(|e| {
            let query = interpolate(self.dialect, &statement.sql, &statement.bindings);
            let e = e.context(format!("While running the query:\n{}", truncate_long!(query)));
            log::error!("{:#}", e);
            e
        })?;
        match &statement.output {
            Some(Output::Transform(transform)) => transform(response),
            Some(Output::Continue(continuation)) => {
                let executor: &mut dyn Executor = &mut *self.connection;
                continuation(executor, response).await
            }
            None => self.dialect.process_response(statement, response),
        }
    }

    async fn on_timeout(&mut self, statement: &CompiledStatement, timeout: Duration) -> Error {
        let query = interpolate(self.dialect, &statement.sql, &statement.bindings);
        let sql = truncate_long!(query).to_string();
        let reason = format!("Query timed out after {}ms", timeout.as_millis());
        let error = if !statement.cancel_on_timeout {
            self.connection.dispose(reason);
            RunnerError::Timeout { timeout, sql }
        } else if !self.dialect.can_cancel_query() {
            self.connection.dispose(reason);
            RunnerError::CancelUnsupported {
                dialect: self.dialect.name(),
                timeout,
                sql,
            }
        } else {
            match self.connection.cancel_query().await {
                Ok(()) => RunnerError::Timeout { timeout, sql },
                Err(e) => {
                    self.connection
                        .dispose(format!("{reason}, cancelling failed: {e:#}"));
                    RunnerError::CancelFailed {
                        timeout,
                        sql,
                        source: e.into(),
                    }
                }
            }
        };
        log::error!("{}", error);
        error.into()
    }
}

/// Acquires a connection, runs the statements and gives the connection back, also on failure.
pub async fn run_pooled<P: Pool>(
    pool: &P,
    dialect: &dyn Dialect,
    statements: &[CompiledStatement],
) -> Result<QueryOutput> {
    let mut connection = pool.acquire().await?;
    let result = Runner::new(dialect, &mut connection)
        .run_all(statements)
        .await;
    if let Err(e) = pool.release(connection).await {
        log::warn!("Could not release the connection: {:#}", e);
    }
    result
}

/// Compiles one insert statement per `chunk_size` rows.
pub fn batch_insert(
    dialect: &dyn Dialect,
    config: &Config,
    table: &str,
    rows: impl IntoIterator<Item = Record>,
    chunk_size: usize,
) -> Result<Vec<CompiledStatement>> {
    if chunk_size == 0 {
        return Err(CompileError::InvalidChunkSize(chunk_size).into());
    }
    let rows: Vec<Record> = rows.into_iter().collect();
    rows.chunks(chunk_size)
        .map(|chunk| {
            QueryBuilder::table(table)
                .insert_many(chunk.iter().cloned())
                .compile_with(dialect, config)
        })
        .collect()
}
