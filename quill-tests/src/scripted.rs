use quill_core::{
    Connection, Error, Executor, QueryResult, RawResponse, Result, Value,
    future::BoxFuture,
    stream::{self, BoxStream, StreamExt},
};
use std::{collections::VecDeque, time::Duration};

/// What a [`ScriptedConnection`] answers to `cancel_query`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CancelOutcome {
    #[default]
    Succeed,
    Fail(String),
}

/// Connection that records every statement and answers with scripted responses after a delay.
#[derive(Debug, Default)]
pub struct ScriptedConnection {
    pub delay: Duration,
    pub responses: VecDeque<RawResponse>,
    pub cancel: CancelOutcome,
    pub executed: Vec<(String, Vec<Value>)>,
    pub cancelled: usize,
    disposed: Option<String>,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelOutcome) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn respond(mut self, response: RawResponse) -> Self {
        self.responses.push_back(response);
        self
    }

    pub fn executed_sql(&self) -> Vec<&str> {
        self.executed.iter().map(|(sql, _)| sql.as_str()).collect()
    }
}

impl Executor for ScriptedConnection {
    fn run<'s>(
        &'s mut self,
        sql: &'s str,
        bindings: &'s [Value],
    ) -> BoxStream<'s, Result<QueryResult>> {
        self.executed.push((sql.to_string(), bindings.to_vec()));
        let delay = self.delay;
        let response = self.responses.pop_front().unwrap_or_default();
        let items: Vec<Result<QueryResult>> = response
            .rows
            .into_iter()
            .map(|row| Ok(row.into()))
            .chain([Ok(response.affected.into())])
            .collect();
        stream::once(async move {
            tokio::time::sleep(delay).await;
            stream::iter(items)
        })
        .flatten()
        .boxed()
    }
}

impl Connection for ScriptedConnection {
    fn cancel_query(&mut self) -> BoxFuture<'_, Result<()>> {
        self.cancelled += 1;
        let outcome = self.cancel.clone();
        Box::pin(async move {
            match outcome {
                CancelOutcome::Succeed => Ok(()),
                CancelOutcome::Fail(message) => Err(Error::msg(message)),
            }
        })
    }

    fn dispose(&mut self, reason: String) {
        self.disposed = Some(reason);
    }

    fn disposed(&self) -> Option<&str> {
        self.disposed.as_deref()
    }
}
