use quill_core::{
    ColumnCompiler, CompileError, CompiledStatement, ConflictAction, Dialect, Formatter, Grouping,
    Lock, Merge, Method, Output, QueryBuilder, QueryCompiler, Result, SchemaCompiler, Sequence,
    TableCompiler, Target, Value, information_schema_columns, separated_by,
};

/// MySQL and MariaDB flavour: backtick quoting, `insert ignore`, `on duplicate key update`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
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

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(out, value, '`', "``");
        out.push('`');
    }

    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        let mut position = 0;
        for (i, c) in value.char_indices() {
            let replace = match c {
                '\'' => "''",
                '\\' => "\\\\",
                _ => continue,
            };
            out.push_str(&value[position..i]);
            out.push_str(replace);
            position = i + c.len_utf8();
        }
        out.push_str(&value[position..]);
        out.push('\'');
    }

    fn can_cancel_query(&self) -> bool {
        true
    }
}

impl QueryCompiler for MySqlDialect {
    /// MySQL has no way to offset without a limit other than the largest one.
    fn limit(&self, f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        match self.limit_value(query) {
            Some(limit) => {
                out.push_str("limit ");
                f.parameter(out, &Value::Int(limit as i64));
            }
            None if query.single().offset.is_some() => out.push_str("limit 18446744073709551615"),
            None => {}
        }
        Ok(())
    }

    fn lock(&self, _f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        match query.single().lock {
            Some(Lock::ForUpdate) => out.push_str("for update"),
            Some(Lock::ForShare) => out.push_str("lock in share mode"),
            None => {}
        }
        Ok(())
    }

    fn insert_keyword(&self, query: &QueryBuilder) -> &'static str {
        match &query.single().on_conflict {
            Some(conflict) if matches!(conflict.action, ConflictAction::Ignore) => {
                "insert ignore into "
            }
            _ => "insert into ",
        }
    }

    /// The conflicting key is whichever unique key fails, named columns are not part of the SQL.
    fn on_conflict(
        &self,
        f: &mut Formatter,
        out: &mut String,
        query: &QueryBuilder,
        inserted: &[&String],
    ) -> Result<()> {
        let Some(conflict) = &query.single().on_conflict else {
            return Ok(());
        };
        let ConflictAction::Merge(merge) = &conflict.action else {
            return Ok(());
        };
        if query.has(Grouping::Where) {
            log::warn!(
                "{} does not support a where clause on merge, the clause is ignored",
                f.dialect().name()
            );
        }
        out.push_str(" on duplicate key update ");
        let from_values = |f: &mut Formatter, out: &mut String, column: &str| {
            f.write_wrapped(out, column);
            out.push_str(" = values(");
            f.write_wrapped(out, column);
            out.push(')');
        };
        match merge {
            Merge::All => separated_by(out, inserted, |out, v| from_values(f, out, v.as_str()), ", "),
            Merge::Columns(columns) => {
                separated_by(out, columns, |out, v| from_values(f, out, v.as_str()), ", ")
            }
            Merge::Values(values) => separated_by(
                out,
                values,
                |out, (k, v)| {
                    f.write_wrapped(out, k);
                    out.push_str(" = ");
                    f.parameter(out, v);
                },
                ", ",
            ),
        }
        Ok(())
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn column_info(&self, f: &mut Formatter, query: &QueryBuilder) -> Result<CompiledStatement> {
        let Some(Target::Column(table)) = &query.single().table else {
            return Err(CompileError::MissingTable("columnInfo").into());
        };
        let table = Value::Text(f.transform(table));
        let mut out =
            String::from("select * from information_schema.columns where table_name = ");
        f.parameter(&mut out, &table);
        out.push_str(" and table_schema = database()");
        let column = query.single().column_info.clone();
        Ok(
            CompiledStatement::new(out, f.take_bindings(), Method::ColumnInfo).with_output(
                Output::transform(move |response| {
                    information_schema_columns(&response.rows, column.as_deref())
                }),
            ),
        )
    }
}

impl SchemaCompiler for MySqlDialect {
    fn rename_table(
        &self,
        f: &mut Formatter,
        from: &str,
        to: &str,
        sequence: &mut Sequence,
    ) -> Result<()> {
        sequence.push_ddl(format!("rename table {} to {}", f.wrap(from), f.wrap(to)));
        Ok(())
    }

    fn has_table(&self, f: &mut Formatter, name: &str, sequence: &mut Sequence) -> Result<()> {
        let name = Value::Text(f.transform(name));
        let mut sql = String::from("select * from information_schema.tables where table_name = ");
        f.parameter(&mut sql, &name);
        sql.push_str(" and table_schema = database()");
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
        let table = Value::Text(f.transform(table));
        let column = Value::Text(f.transform(column));
        let mut sql =
            String::from("select * from information_schema.columns where table_name = ");
        f.parameter(&mut sql, &table);
        sql.push_str(" and column_name = ");
        f.parameter(&mut sql, &column);
        sql.push_str(" and table_schema = database()");
        sequence.push(CompiledStatement::new(sql, f.take_bindings(), Method::HasColumn));
        Ok(())
    }
}
