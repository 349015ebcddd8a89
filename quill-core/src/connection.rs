use crate::{Error, Executor, Result, future::BoxFuture};
use std::future::Future;

/// A single database connection, exclusively borrowed by whoever runs statements on it.
pub trait Connection: Executor {
    /// Ask the backend to abort the statement currently running on this connection.
    fn cancel_query(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Err(Error::msg("This connection cannot cancel queries")) })
    }

    /// Mark the connection as unusable. A disposed connection must never go back to a pool.
    fn dispose(&mut self, reason: String);

    /// The reason given to [`Connection::dispose`], if the connection was disposed.
    fn disposed(&self) -> Option<&str>;

    fn is_disposed(&self) -> bool {
        self.disposed().is_some()
    }
}

/// Source of connections, implemented outside of this crate.
pub trait Pool: Send + Sync {
    type Connection: Connection;

    fn acquire(&self) -> impl Future<Output = Result<Self::Connection>> + Send;

    /// Give a connection back. Implementations destroy connections that were disposed.
    fn release(&self, connection: Self::Connection) -> impl Future<Output = Result<()>> + Send;
}
