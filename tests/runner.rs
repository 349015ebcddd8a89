#[cfg(test)]
mod tests {
    use quill::{
        CompiledStatement, Connection, Dialect, Filter, GenericDialect, Method, Output, Pool,
        PostgresDialect, QueryBuilder, QueryOutput, RawResponse, Result, RowLabeled, RowsAffected,
        Runner, RunnerError, SqliteDialect, Value, run_pooled,
    };
    use quill_tests::{
        CancelOutcome, ScriptedConnection, SqliteTestConnection, init_logs, silent_logs,
    };
    use std::{
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    fn slow_query(cancel: bool) -> QueryBuilder {
        QueryBuilder::table("reports").timeout(Duration::from_millis(50), cancel)
    }

    fn slow_connection() -> ScriptedConnection {
        ScriptedConnection::new().with_delay(Duration::from_millis(300))
    }

    async fn run(
        dialect: &dyn Dialect,
        connection: &mut ScriptedConnection,
        statement: &CompiledStatement,
    ) -> Result<QueryOutput> {
        let mut result = None;
        silent_logs! {
            result = Some(Runner::new(dialect, connection).run(statement).await);
        }
        result.expect("The statement must have run")
    }

    fn runner_error(error: &quill::Error) -> &RunnerError {
        error
            .downcast_ref::<RunnerError>()
            .expect("Expected a runner error")
    }

    #[tokio::test]
    async fn runs_in_order() {
        init_logs();
        let row = RowLabeled::new(Arc::from(["id".to_string()]), Box::new([Value::Int(1)]));
        let mut connection = ScriptedConnection::new()
            .respond(RawResponse {
                affected: RowsAffected {
                    rows_affected: 2,
                    last_affected_id: None,
                },
                ..Default::default()
            })
            .respond(RawResponse {
                rows: vec![row.clone()],
                ..Default::default()
            });
        let statements = [
            CompiledStatement::new("delete from t", Vec::new(), Method::Delete),
            CompiledStatement::new("select * from t", Vec::new(), Method::Select),
        ];
        let output = Runner::new(&GenericDialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not run the statements");
        assert_eq!(output, QueryOutput::Rows(vec![row]));
        assert_eq!(connection.executed_sql(), ["delete from t", "select * from t"]);

        let output = Runner::new(&GenericDialect, &mut connection)
            .run_all(&[])
            .await
            .expect("Nothing to run");
        assert_eq!(output, QueryOutput::Empty);
    }

    #[tokio::test]
    async fn output_precedence() {
        init_logs();
        let mut connection = ScriptedConnection::new();
        let statement = CompiledStatement::new("select 1", Vec::new(), Method::Select)
            .with_output(Output::transform(|_| Ok(QueryOutput::Exists(true))));
        let output = Runner::new(&GenericDialect, &mut connection)
            .run(&statement)
            .await
            .expect("Could not run the statement");
        assert_eq!(output, QueryOutput::Exists(true));

        let statement = CompiledStatement::new("select 1", Vec::new(), Method::HasTable);
        let output = Runner::new(&GenericDialect, &mut connection)
            .run(&statement)
            .await
            .expect("Could not run the statement");
        assert_eq!(output, QueryOutput::Exists(false));
    }

    #[tokio::test]
    async fn timeout_disposes_connection() {
        init_logs();
        let statement = slow_query(false)
            .compile(&GenericDialect)
            .expect("Could not compile the query");
        let mut connection = slow_connection();
        let error = run(&GenericDialect, &mut connection, &statement)
            .await
            .expect_err("The query must time out");
        let kind = runner_error(&error);
        assert!(matches!(kind, RunnerError::Timeout { .. }));
        assert!(kind.is_timeout());
        assert_eq!(
            error.to_string(),
            "Defined query timeout of 50ms exceeded when running query"
        );
        assert_eq!(connection.cancelled, 0);
        assert!(connection.is_disposed());

        let error = run(&GenericDialect, &mut connection, &statement)
            .await
            .expect_err("A disposed connection must refuse statements");
        let kind = runner_error(&error);
        assert!(matches!(kind, RunnerError::Disposed(..)));
        assert!(!kind.is_timeout());
        assert_eq!(connection.executed.len(), 1);
    }

    #[tokio::test]
    async fn cancel_unsupported() {
        init_logs();
        let statement = slow_query(true)
            .compile(&GenericDialect)
            .expect("Could not compile the query");
        let mut connection = slow_connection();
        let error = run(&GenericDialect, &mut connection, &statement)
            .await
            .expect_err("The query must time out");
        assert!(matches!(
            runner_error(&error),
            RunnerError::CancelUnsupported {
                dialect: "generic",
                ..
            }
        ));
        assert_eq!(connection.cancelled, 0);
        assert!(connection.is_disposed());
    }

    #[tokio::test]
    async fn cancel_failed() {
        init_logs();
        let statement = slow_query(true)
            .compile(&PostgresDialect)
            .expect("Could not compile the query");
        let mut connection =
            slow_connection().with_cancel(CancelOutcome::Fail("Backend gone".into()));
        let error = run(&PostgresDialect, &mut connection, &statement)
            .await
            .expect_err("The query must time out");
        assert!(matches!(
            runner_error(&error),
            RunnerError::CancelFailed { .. }
        ));
        assert!(error.to_string().ends_with("cancelling of query failed: Backend gone"));
        assert_eq!(connection.cancelled, 1);
        assert!(
            connection
                .disposed()
                .is_some_and(|v| v.contains("Backend gone"))
        );
    }

    #[tokio::test]
    async fn cancel_keeps_connection() {
        init_logs();
        let statement = slow_query(true)
            .compile(&PostgresDialect)
            .expect("Could not compile the query");
        let mut connection = slow_connection();
        let error = run(&PostgresDialect, &mut connection, &statement)
            .await
            .expect_err("The query must time out");
        assert!(matches!(runner_error(&error), RunnerError::Timeout { .. }));
        assert_eq!(connection.cancelled, 1);
        assert!(!connection.is_disposed());

        connection.delay = Duration::ZERO;
        run(&PostgresDialect, &mut connection, &statement)
            .await
            .expect("The connection must still be usable");
        assert_eq!(connection.executed.len(), 2);
    }

    #[tokio::test]
    async fn query_error_context() {
        init_logs();
        let dialect = SqliteDialect::new();
        let mut connection = SqliteTestConnection::open().expect("Could not open the database");
        let statement = QueryBuilder::table("missing")
            .where_("id", 5)
            .compile(&dialect)
            .expect("Could not compile the query");
        let mut result = None;
        silent_logs! {
            result = Some(Runner::new(&dialect, &mut connection).run(&statement).await);
        }
        let error = result
            .expect("The statement must have run")
            .expect_err("The table does not exist");
        let message = format!("{:#}", error);
        assert!(
            message.starts_with("While running the query:\nselect * from \"missing\" where \"id\" = 5"),
            "{message}"
        );
        assert!(!connection.is_disposed());
    }

    #[derive(Default)]
    struct TestPool {
        idle: Mutex<Vec<ScriptedConnection>>,
        delay: Duration,
        released: AtomicUsize,
        destroyed: AtomicUsize,
    }

    impl Pool for TestPool {
        type Connection = ScriptedConnection;

        async fn acquire(&self) -> Result<ScriptedConnection> {
            let connection = self.idle.lock().expect("Poisoned pool").pop();
            Ok(connection.unwrap_or_else(|| ScriptedConnection::new().with_delay(self.delay)))
        }

        async fn release(&self, connection: ScriptedConnection) -> Result<()> {
            self.released.fetch_add(1, Ordering::Relaxed);
            if connection.is_disposed() {
                self.destroyed.fetch_add(1, Ordering::Relaxed);
            } else {
                self.idle.lock().expect("Poisoned pool").push(connection);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn pooled_connections_are_released() {
        init_logs();
        let pool = TestPool::default();
        let statement = QueryBuilder::table("t")
            .compile(&GenericDialect)
            .expect("Could not compile the query");
        run_pooled(&pool, &GenericDialect, &[statement.clone(), statement])
            .await
            .expect("Could not run the statements");
        assert_eq!(pool.released.load(Ordering::Relaxed), 1);
        assert_eq!(pool.destroyed.load(Ordering::Relaxed), 0);
        let idle = pool.idle.lock().expect("Poisoned pool");
        assert_eq!(idle.len(), 1);
        assert_eq!(idle[0].executed.len(), 2);
    }

    #[tokio::test]
    async fn pooled_connections_are_released_on_failure() {
        init_logs();
        let pool = TestPool {
            delay: Duration::from_millis(300),
            ..Default::default()
        };
        let statement = slow_query(false)
            .compile(&GenericDialect)
            .expect("Could not compile the query");
        let mut result = None;
        silent_logs! {
            result = Some(run_pooled(&pool, &GenericDialect, &[statement]).await);
        }
        let error = result
            .expect("The statement must have run")
            .expect_err("The query must time out");
        assert!(runner_error(&error).is_timeout());
        assert_eq!(pool.released.load(Ordering::Relaxed), 1);
        assert_eq!(pool.destroyed.load(Ordering::Relaxed), 1);
        assert!(pool.idle.lock().expect("Poisoned pool").is_empty());
    }
}
