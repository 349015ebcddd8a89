use crate::{
    QueryResult, RawResponse, Result, RowLabeled, RowsAffected, Value,
    future::{BoxFuture, FutureExt},
    stream::{BoxStream, StreamExt, TryStreamExt},
};

/// Something able to send native SQL with positional bindings to a database.
///
/// Implemented by driver connections (and transactions) outside of this crate. The trait is
/// object safe so that response continuations can keep running statements on the same
/// connection through `&mut dyn Executor`.
pub trait Executor: Send {
    /// General method to send any statement and return any result type (either row or count).
    fn run<'s>(
        &'s mut self,
        sql: &'s str,
        bindings: &'s [Value],
    ) -> BoxStream<'s, Result<QueryResult>>;

    /// Execute the statement and return the rows.
    fn fetch<'s>(
        &'s mut self,
        sql: &'s str,
        bindings: &'s [Value],
    ) -> BoxStream<'s, Result<RowLabeled>> {
        self.run(sql, bindings)
            .try_filter_map(|v| async move {
                Ok(match v {
                    QueryResult::Row(v) => Some(v),
                    _ => None,
                })
            })
            .boxed()
    }

    /// Execute the statement and return the total number of rows affected.
    fn execute<'s>(
        &'s mut self,
        sql: &'s str,
        bindings: &'s [Value],
    ) -> BoxFuture<'s, Result<RowsAffected>> {
        self.run(sql, bindings)
            .try_filter_map(|v| async move {
                Ok(match v {
                    QueryResult::Affected(v) => Some(v),
                    _ => None,
                })
            })
            .try_collect()
            .boxed()
    }

    /// Execute the statement and gather everything it produced.
    fn collect<'s>(
        &'s mut self,
        sql: &'s str,
        bindings: &'s [Value],
    ) -> BoxFuture<'s, Result<RawResponse>> {
        self.run(sql, bindings).try_collect().boxed()
    }
}
