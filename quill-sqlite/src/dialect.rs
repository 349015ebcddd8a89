use crate::pragma_column_info;
use futures::FutureExt;
use quill_core::{
    ColumnCompiler, CompileError, CompiledStatement, Dialect, Formatter, GenericDialect,
    Method, MonotonicIds, Operator, Output, QueryBuilder, QueryCompiler, QueryOutput, Result,
    SchemaCompiler, Sequence, TableCompiler, Target, UniqueId, Value,
};
use std::{fmt, sync::Arc};

/// SQLite flavour: double quoted identifiers, `?` placeholders, no `alter column`.
///
/// Column renames, column drops and foreign key drops are emulated by rebuilding the table,
/// the shadow copy of the table is named after the ids handed out by `ids`.
#[derive(Clone)]
pub struct SqliteDialect {
    ids: Arc<dyn UniqueId>,
}

impl SqliteDialect {
    pub fn new() -> Self {
        Self::with_ids(Arc::new(MonotonicIds::new()))
    }

    pub fn with_ids(ids: Arc<dyn UniqueId>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &dyn UniqueId {
        self.ids.as_ref()
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SqliteDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SqliteDialect")
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }
    fn query_compiler(&self) -> &dyn QueryCompiler {
        self
    }
    fn schema_compiler(&self) -> &dyn SchemaCompiler {
        self
    }
    fn table_compiler(&self) -> &dyn TableCompiler {
        self
    }
    fn column_compiler(&self) -> &dyn ColumnCompiler {
        self
    }

    fn write_value_float(&self, out: &mut String, value: f64) {
        if value.is_infinite() {
            if value < 0.0 {
                out.push('-');
            }
            out.push_str("1.0e+10000");
        } else {
            GenericDialect.write_value_float(out, value);
        }
    }
}

impl QueryCompiler for SqliteDialect {
    fn operator(&self, operator: Operator) -> Result<&'static str> {
        Ok(match operator {
            Operator::ILike => "like",
            Operator::NotILike => "not like",
            _ => operator.as_str(),
        })
    }

    /// An offset needs a limit in SQLite, `-1` stands for no limit.
    fn limit(&self, f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        let limit = match self.limit_value(query) {
            Some(limit) => limit as i64,
            None if query.single().offset.is_some() => -1,
            None => return Ok(()),
        };
        out.push_str("limit ");
        f.parameter(out, &Value::Int(limit));
        Ok(())
    }

    fn lock(&self, f: &mut Formatter, _out: &mut String, query: &QueryBuilder) -> Result<()> {
        if query.single().lock.is_some() {
            log::warn!(
                "Table lock is not supported by {}, the clause is ignored",
                f.dialect().name()
            );
        }
        Ok(())
    }

    fn insert_default(&self, _f: &Formatter) -> &'static str {
        "NULL"
    }

    /// `delete from`, then the autoincrement counter of the table is reset.
    fn truncate(&self, f: &mut Formatter, query: &QueryBuilder) -> Result<CompiledStatement> {
        let mut out = String::from("delete from ");
        self.table(f, &mut out, query, "truncate")?;
        let table = match &query.single().table {
            Some(Target::Column(table)) => f.transform(table),
            _ => return Err(CompileError::MissingTable("truncate").into()),
        };
        Ok(
            CompiledStatement::new(out, f.take_bindings(), Method::Truncate).with_output(
                Output::continuation(move |executor, response| {
                    let bindings = [Value::Text(table.clone())];
                    async move {
                        let sql = "delete from sqlite_sequence where name = ?";
                        if let Err(e) = executor.execute(sql, &bindings).await {
                            // No sqlite_sequence table until some table uses autoincrement
                            log::debug!("Could not reset the table sequence: {:#}", e);
                        }
                        Ok(QueryOutput::Affected(response.affected))
                    }
                    .boxed()
                }),
            ),
        )
    }

    fn column_info(&self, f: &mut Formatter, query: &QueryBuilder) -> Result<CompiledStatement> {
        let Some(Target::Column(table)) = &query.single().table else {
            return Err(CompileError::MissingTable("columnInfo").into());
        };
        let column = query.single().column_info.clone();
        Ok(CompiledStatement::new(
            format!("pragma table_info({})", f.wrap(table)),
            Vec::new(),
            Method::ColumnInfo,
        )
        .with_output(Output::transform(move |response| {
            pragma_column_info(&response.rows, column.as_deref())
        })))
    }
}

impl SchemaCompiler for SqliteDialect {
    fn has_table(&self, f: &mut Formatter, name: &str, sequence: &mut Sequence) -> Result<()> {
        let name = Value::Text(f.transform(name));
        let mut sql = String::from("select * from sqlite_master where type = 'table' and name = ");
        f.parameter(&mut sql, &name);
        sequence.push(CompiledStatement::new(sql, f.take_bindings(), Method::HasTable));
        Ok(())
    }

    fn has_column(
        &self,
        f: &mut Formatter,
        table: &str,
        column: &str,
        sequence: &mut Sequence,
    ) -> Result<()> {
        let column = f.transform(column);
        sequence.push(
            CompiledStatement::new(
                format!("pragma table_info({})", f.wrap(table)),
                Vec::new(),
                Method::HasColumn,
            )
            .with_output(Output::transform(move |response| {
                let columns = pragma_column_info(&response.rows, Some(&column))?;
                Ok(QueryOutput::Exists(
                    matches!(columns, QueryOutput::Columns(v) if !v.is_empty()),
                ))
            })),
        );
        Ok(())
    }

    fn create_schema(
        &self,
        f: &mut Formatter,
        name: &str,
        _if_not_exists: bool,
        _sequence: &mut Sequence,
    ) -> Result<()> {
        // Sqlite does not support schema
        log::warn!("{} does not support schemas, \"{}\" is not created", f.dialect().name(), name);
        Ok(())
    }

    fn drop_schema(
        &self,
        f: &mut Formatter,
        name: &str,
        _if_exists: bool,
        _sequence: &mut Sequence,
    ) -> Result<()> {
        // Sqlite does not support schema
        log::warn!("{} does not support schemas, \"{}\" is not dropped", f.dialect().name(), name);
        Ok(())
    }
}
