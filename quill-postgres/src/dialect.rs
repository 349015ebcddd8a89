use quill_core::{
    ColumnCompiler, CompiledStatement, Dialect, Formatter, Method, QueryBuilder, QueryCompiler,
    Result, SchemaCompiler, Sequence, TableCompiler, Value,
};

/// PostgreSQL flavour: `$n` placeholders, `returning`, cancellable statements.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
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

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("'\\x");
        out.push_str(&hex::encode_upper(value));
        out.push('\'');
    }

    /// `?` becomes `$1`, `$2`, ... in order, `\?` becomes a plain `?`.
    fn position_bindings(&self, sql: &str) -> String {
        let mut out = String::with_capacity(sql.len() + 8);
        let mut position = 0usize;
        let mut chars = sql.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' if chars.peek() == Some(&'?') => {
                    chars.next();
                    out.push('?');
                }
                '?' => {
                    position += 1;
                    out.push('$');
                    out.push_str(itoa::Buffer::new().format(position));
                }
                _ => out.push(c),
            }
        }
        out
    }

    fn can_cancel_query(&self) -> bool {
        true
    }
}

impl QueryCompiler for PostgresDialect {
    fn truncate(&self, f: &mut Formatter, query: &QueryBuilder) -> Result<CompiledStatement> {
        let mut out = String::from("truncate ");
        self.table(f, &mut out, query, "truncate")?;
        out.push_str(" restart identity");
        Ok(CompiledStatement::new(out, f.take_bindings(), Method::Truncate))
    }
}

impl SchemaCompiler for PostgresDialect {
    fn has_table(&self, f: &mut Formatter, name: &str, sequence: &mut Sequence) -> Result<()> {
        let name = Value::Text(f.transform(name));
        let mut sql = String::from("select * from information_schema.tables where table_name = ");
        f.parameter(&mut sql, &name);
        sql.push_str(" and table_schema = current_schema()");
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
        sql.push_str(" and table_schema = current_schema()");
        sequence.push(CompiledStatement::new(sql, f.take_bindings(), Method::HasColumn));
        Ok(())
    }
}
