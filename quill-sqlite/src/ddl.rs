use crate::SqliteDialect;
use futures::FutureExt;
use quill_core::{
    ColumnInfo, CompileError, CompiledStatement, Config, DdlError, Dialect, Error, ErrorContext,
    Executor, Filter, Method, Output, QueryBuilder, QueryOutput, RawResponse, Record, Result,
    RowLabeled, Value, batch_insert,
    ddl::{CreateTable, Rewrite, drop_foreign_key, rewrite_create_index, rewrite_create_table},
    escape_placeholders, truncate_long,
};
use std::collections::BTreeMap;

/// One row of `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PragmaColumn {
    pub cid: i64,
    pub name: String,
    pub column_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub primary_key: i64,
}

impl PragmaColumn {
    pub fn from_row(row: &RowLabeled) -> Result<Self> {
        let text = |name: &str| match row.get_column(name) {
            None | Some(Value::Null) => None,
            Some(Value::Text(v)) => Some(v.clone()),
            Some(v) => v.as_i64().map(|v| v.to_string()),
        };
        let int = |name: &str| row.get_column(name).and_then(Value::as_i64).unwrap_or_default();
        Ok(Self {
            cid: int("cid"),
            name: text("name")
                .ok_or_else(|| Error::msg("Column description without a name in table_info"))?,
            column_type: text("type").unwrap_or_default(),
            not_null: int("notnull") != 0,
            default_value: text("dflt_value"),
            primary_key: int("pk"),
        })
    }

    pub fn info(&self) -> ColumnInfo {
        let lower = self.column_type.to_ascii_lowercase();
        let (data_type, max_length) = match lower.split_once('(') {
            Some((data_type, arguments)) => (
                data_type.trim().to_string(),
                arguments
                    .trim_end_matches(')')
                    .split(',')
                    .next()
                    .and_then(|v| v.trim().parse().ok()),
            ),
            None => (lower.trim().to_string(), None),
        };
        ColumnInfo {
            data_type,
            max_length,
            nullable: !self.not_null,
            default_value: self.default_value.clone(),
        }
    }
}

/// Shapes `PRAGMA table_info` rows into a column map, optionally keeping one column.
pub fn pragma_column_info(rows: &[RowLabeled], column: Option<&str>) -> Result<QueryOutput> {
    let mut result = BTreeMap::new();
    for row in rows {
        let pragma = PragmaColumn::from_row(row)?;
        if column.is_some_and(|v| !v.eq_ignore_ascii_case(&pragma.name)) {
            continue;
        }
        result.insert(pragma.name.clone(), pragma.info());
    }
    Ok(QueryOutput::Columns(result))
}

/// Table change SQLite cannot perform in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    RenameColumn { from: String, to: String },
    DropColumn(String),
    AlterColumn { column: String, definition: String },
    DropForeign { columns: Vec<String>, name: Option<String> },
}

/// Rebuilds a table through a shadow copy to apply a [`Change`].
///
/// Starts from the `PRAGMA table_info` response of the table, then:
/// 1. reads the stored `create table` and `create index` texts from `sqlite_master`
/// 2. rewrites the table, failing before any DDL when the column is missing or would be the
///    last one
/// 3. creates the shadow table from the original text and copies every row into it
/// 4. drops the table and creates it again from the rewritten text
/// 5. copies the rows back, mapped to the new shape
/// 6. creates the indexes again, those covering a dropped column are left out
/// 7. drops the shadow table
///
/// Rows move in batches of `chunk_size`. All steps must run inside the same transaction.
#[derive(Debug, Clone)]
pub struct SqliteDdl {
    dialect: SqliteDialect,
    table: String,
    change: Change,
    chunk_size: usize,
}

impl SqliteDdl {
    /// `table` is the stored name, identifier transformations are already applied.
    pub fn new(
        dialect: SqliteDialect,
        table: impl Into<String>,
        change: Change,
        chunk_size: usize,
    ) -> Self {
        Self {
            dialect,
            table: table.into(),
            change,
            chunk_size,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn change(&self) -> &Change {
        &self.change
    }

    /// The introspection statement continuing into the rebuild.
    pub fn statement(self) -> CompiledStatement {
        let mut sql = String::from("pragma table_info(");
        self.dialect.write_identifier_quoted(&mut sql, &self.table);
        sql.push(')');
        CompiledStatement::ddl(sql).with_output(Output::continuation(move |executor, response| {
            let ddl = self.clone();
            async move { ddl.run(executor, response).await }.boxed()
        }))
    }

    pub async fn run(&self, executor: &mut dyn Executor, pragma: RawResponse) -> Result<QueryOutput> {
        if self.chunk_size == 0 {
            return Err(CompileError::InvalidChunkSize(self.chunk_size).into());
        }
        let columns = pragma
            .rows
            .iter()
            .map(PragmaColumn::from_row)
            .collect::<Result<Vec<_>>>()?;
        let sql = self.table_sql(executor).await?;
        let indexes = self.index_sql(executor).await?;
        let (rewritten, rewrite) = self.rewrite(&columns, &sql)?;
        log::debug!(
            "Rebuilding table `{}` as:\n{}",
            self.table,
            truncate_long!(rewritten)
        );
        let temp = format!("{}_quill_temp_alter", self.dialect.ids().next_id());
        self.migrate(executor, &temp, &sql, &rewritten, rewrite.as_ref())
            .await?;
        self.restore_indexes(executor, &indexes, rewrite.as_ref())
            .await?;
        self.execute(executor, &self.drop_table(&temp)).await?;
        Ok(QueryOutput::Empty)
    }

    fn rewrite<'s>(
        &'s self,
        columns: &'s [PragmaColumn],
        sql: &str,
    ) -> Result<(String, Option<Rewrite<'s>>)> {
        let rewrite = match &self.change {
            Change::RenameColumn { from, to } => Rewrite::Rename {
                from: self.find_column(columns, from)?,
                to: to.as_str(),
            },
            Change::DropColumn(column) => Rewrite::Drop(self.find_column(columns, column)?),
            Change::AlterColumn { column, definition } => Rewrite::Replace {
                column: self.find_column(columns, column)?,
                definition: definition.as_str(),
            },
            Change::DropForeign { columns: keys, name } => {
                return Ok((drop_foreign_key(sql, keys, name.as_deref())?, None));
            }
        };
        Ok((rewrite_create_table(sql, &rewrite)?, Some(rewrite)))
    }

    fn find_column<'c>(&self, columns: &'c [PragmaColumn], name: &str) -> Result<&'c str> {
        columns
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .map(|v| v.name.as_str())
            .ok_or_else(|| {
                DdlError::ColumnNotFound {
                    column: name.to_string(),
                    table: self.table.clone(),
                }
                .into()
            })
    }

    async fn table_sql(&self, executor: &mut dyn Executor) -> Result<String> {
        let statement = QueryBuilder::table("sqlite_master")
            .select(["sql"])
            .where_("type", "table")
            .where_("name", self.table.as_str())
            .compile_with(&self.dialect, &Config::default())?;
        let response = self.execute(executor, &statement).await?;
        match response.rows.first().and_then(|v| v.get_column("sql")) {
            Some(Value::Text(sql)) => Ok(sql.clone()),
            _ => Err(DdlError::TableNotFound(self.table.clone()).into()),
        }
    }

    /// Stored definitions of the indexes created explicitly on the table.
    async fn index_sql(&self, executor: &mut dyn Executor) -> Result<Vec<String>> {
        let statement = QueryBuilder::table("sqlite_master")
            .select(["sql"])
            .where_("type", "index")
            .where_("tbl_name", self.table.as_str())
            .where_not_null("sql")
            .compile_with(&self.dialect, &Config::default())?;
        let response = self.execute(executor, &statement).await?;
        Ok(response
            .rows
            .iter()
            .filter_map(|row| match row.get_column("sql") {
                Some(Value::Text(sql)) => Some(sql.clone()),
                _ => None,
            })
            .collect())
    }

    async fn restore_indexes(
        &self,
        executor: &mut dyn Executor,
        indexes: &[String],
        rewrite: Option<&Rewrite<'_>>,
    ) -> Result<()> {
        for index in indexes {
            let index = match rewrite {
                Some(rewrite) => rewrite_create_index(index, rewrite),
                None => Some(index.clone()),
            };
            match index {
                Some(index) => {
                    self.execute(executor, &stored_ddl(&index)).await?;
                }
                None => log::debug!(
                    "Index of the dropped column is not created again on table `{}`",
                    self.table
                ),
            }
        }
        Ok(())
    }

    async fn migrate(
        &self,
        executor: &mut dyn Executor,
        temp: &str,
        original: &str,
        rewritten: &str,
        rewrite: Option<&Rewrite<'_>>,
    ) -> Result<()> {
        let create = CreateTable::parse(original)?;
        self.execute(executor, &stored_ddl(&create.renamed(temp)))
            .await?;
        let rows = self.select_all(executor, &self.table).await?;
        self.insert_chunks(executor, temp, rows).await?;
        self.execute(executor, &self.drop_table(&self.table))
            .await?;
        self.execute(executor, &stored_ddl(rewritten)).await?;
        let rows = self
            .select_all(executor, temp)
            .await?
            .into_iter()
            .map(|row| match rewrite {
                Some(rewrite) => rewrite.map_row(row),
                None => row,
            })
            .collect();
        self.insert_chunks(executor, &self.table, rows).await?;
        Ok(())
    }

    fn drop_table(&self, name: &str) -> CompiledStatement {
        let mut sql = String::from("drop table ");
        self.dialect.write_identifier_quoted(&mut sql, name);
        CompiledStatement::ddl(sql)
    }

    async fn select_all(&self, executor: &mut dyn Executor, table: &str) -> Result<Vec<Record>> {
        let mut sql = String::from("select * from ");
        self.dialect.write_identifier_quoted(&mut sql, table);
        let response = self
            .execute(executor, &CompiledStatement::new(sql, Vec::new(), Method::Select))
            .await?;
        Ok(response
            .rows
            .into_iter()
            .map(RowLabeled::into_record)
            .collect())
    }

    async fn insert_chunks(
        &self,
        executor: &mut dyn Executor,
        table: &str,
        rows: Vec<Record>,
    ) -> Result<()> {
        let statements = batch_insert(
            &self.dialect,
            &Config::default(),
            table,
            rows,
            self.chunk_size,
        )?;
        for statement in &statements {
            self.execute(executor, statement).await?;
        }
        Ok(())
    }

    async fn execute(
        &self,
        executor: &mut dyn Executor,
        statement: &CompiledStatement,
    ) -> Result<RawResponse> {
        let sql = self.dialect.position_bindings(&statement.sql);
        log::debug!("{}", truncate_long!(sql));
        executor
            .collect(&sql, &statement.bindings)
            .await
            .with_context(|| format!("While rebuilding the table `{}`", self.table))
    }
}

/// Statement replaying DDL text read back from `sqlite_master`.
fn stored_ddl(sql: &str) -> CompiledStatement {
    let mut escaped = String::with_capacity(sql.len());
    escape_placeholders(&mut escaped, sql);
    CompiledStatement::ddl(escaped)
}
