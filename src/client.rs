use quill_core::{
    CompiledStatement, Config, Connection, Dialect, Error, Formatter, GenericDialect, Method,
    Pool, QueryBuilder, QueryOutput, Raw, Record, Result, Runner, SchemaBuilder, batch_insert,
    run_pooled,
};
use quill_mysql::MySqlDialect;
use quill_postgres::PostgresDialect;
use quill_sqlite::SqliteDialect;
use std::{fmt, sync::Arc};

/// Entry point binding a dialect to a configuration.
///
/// Builders compiled through a client share its identifier transform, default timeout and
/// migration chunk size.
#[derive(Clone)]
pub struct Client {
    dialect: Arc<dyn Dialect>,
    config: Config,
}

impl Client {
    /// Selects the dialect by client name.
    ///
    /// Accepted names: `sqlite`, `sqlite3`, `better-sqlite3`, `pg`, `postgres`, `postgresql`,
    /// `mysql`, `mysql2`, `mariadb` and `generic`.
    pub fn new(client: &str, config: Config) -> Result<Self> {
        let dialect: Arc<dyn Dialect> = match client.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" | "better-sqlite3" => Arc::new(SqliteDialect::new()),
            "pg" | "postgres" | "postgresql" => Arc::new(PostgresDialect::new()),
            "mysql" | "mysql2" | "mariadb" => Arc::new(MySqlDialect::new()),
            "generic" => Arc::new(GenericDialect),
            _ => {
                let error = Error::msg(format!("Unknown client `{}`", client));
                log::error!("{:#}", error);
                return Err(error);
            }
        };
        Ok(Self { dialect, config })
    }

    pub fn with_dialect(dialect: impl Dialect + 'static, config: Config) -> Self {
        Self {
            dialect: Arc::new(dialect),
            config,
        }
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn query(&self, table: &str) -> QueryBuilder {
        QueryBuilder::table(table)
    }

    pub fn schema(&self) -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn compile(&self, query: &QueryBuilder) -> Result<CompiledStatement> {
        query.compile_with(self.dialect(), &self.config)
    }

    pub fn compile_schema(&self, schema: &SchemaBuilder) -> Result<Vec<CompiledStatement>> {
        schema.compile_with(self.dialect(), &self.config)
    }

    /// Literal SQL, placeholders expanded with the usual protocol.
    pub fn raw(&self, raw: impl Into<Raw>) -> Result<CompiledStatement> {
        let raw = raw.into();
        let mut f = Formatter::new(self.dialect(), &self.config);
        let mut sql = String::with_capacity(raw.sql.len());
        f.raw(&mut sql, &raw)?;
        let mut statement = CompiledStatement::new(sql, f.take_bindings(), Method::Raw);
        statement.timeout = self.config.default_timeout;
        Ok(statement)
    }

    pub fn batch_insert(
        &self,
        table: &str,
        rows: impl IntoIterator<Item = Record>,
        chunk_size: usize,
    ) -> Result<Vec<CompiledStatement>> {
        batch_insert(self.dialect(), &self.config, table, rows, chunk_size)
    }

    /// Runs the statements in order on the connection, returns the output of the last one.
    pub async fn run<C: Connection>(
        &self,
        connection: &mut C,
        statements: &[CompiledStatement],
    ) -> Result<QueryOutput> {
        Runner::new(self.dialect(), connection)
            .run_all(statements)
            .await
    }

    pub async fn run_pooled<P: Pool>(
        &self,
        pool: &P,
        statements: &[CompiledStatement],
    ) -> Result<QueryOutput> {
        run_pooled(pool, self.dialect(), statements).await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("dialect", &self.dialect.name())
            .field("config", &self.config)
            .finish()
    }
}
