use crate::PostgresDialect;
use quill_core::{
    ColumnBuilder, ColumnCompiler, ColumnType, Formatter, Result, Sequence, TableBuilder,
    TableCompiler, index_name,
};

impl ColumnCompiler for PostgresDialect {
    fn column_type(&self, f: &Formatter, column: &ColumnBuilder) -> Result<String> {
        Ok(match &column.column_type {
            ColumnType::Increments => "serial primary key".into(),
            ColumnType::BigIncrements => "bigserial primary key".into(),
            ColumnType::Integer => "integer".into(),
            ColumnType::BigInteger => "bigint".into(),
            ColumnType::TinyInteger => "smallint".into(),
            ColumnType::Text => "text".into(),
            ColumnType::String(length) => format!("varchar({length})"),
            ColumnType::Float { .. } | ColumnType::Real => "real".into(),
            ColumnType::Double => "double precision".into(),
            ColumnType::Decimal { precision, scale } => format!("decimal({precision}, {scale})"),
            ColumnType::Boolean => "boolean".into(),
            ColumnType::Date => "date".into(),
            ColumnType::DateTime | ColumnType::Timestamp => "timestamptz".into(),
            ColumnType::Time => "time".into(),
            ColumnType::Binary(..) => "bytea".into(),
            ColumnType::Json => "json".into(),
            ColumnType::Jsonb => "jsonb".into(),
            ColumnType::Enum(values) => self.enum_type(f, column, values),
            ColumnType::Uuid => "uuid".into(),
            ColumnType::Specific(v) => v.clone(),
        })
    }
}

impl TableCompiler for PostgresDialect {
    /// Each altered column is redefined piece by piece: type, default, nullability.
    fn alter_columns(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        columns: &[&ColumnBuilder],
        sequence: &mut Sequence,
    ) -> Result<()> {
        let compiler = f.dialect().column_compiler();
        let name = f.wrap(table.name());
        for column in columns {
            let prefix = format!("alter table {} alter column {}", name, f.wrap(&column.name));
            let column_type = compiler.column_type(f, column)?;
            sequence.push_ddl(format!("{prefix} drop default"));
            sequence.push_ddl(format!("{prefix} drop not null"));
            sequence.push_ddl(format!(
                "{prefix} type {column_type} using ({}::{column_type})",
                f.wrap(&column.name)
            ));
            let default = compiler.default_to(f, column)?;
            if let Some(default) = default.strip_prefix("default ") {
                sequence.push_ddl(format!("{prefix} set default {default}"));
            }
            if column.modifiers.nullable == Some(false) {
                sequence.push_ddl(format!("{prefix} set not null"));
            }
        }
        Ok(())
    }

    fn column_comments(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        sequence: &mut Sequence,
    ) -> Result<()> {
        for column in table.columns() {
            let Some(comment) = &column.modifiers.comment else {
                continue;
            };
            let mut sql = String::from("comment on column ");
            f.write_wrapped(&mut sql, table.name());
            sql.push('.');
            f.write_identifier(&mut sql, &column.name);
            sql.push_str(" is ");
            f.ddl_string(&mut sql, comment);
            sequence.push_ddl(sql);
        }
        Ok(())
    }

    fn unique(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        columns: &[String],
        name: Option<&str>,
        sequence: &mut Sequence,
    ) -> Result<()> {
        let name = name.map_or_else(|| index_name(table.name(), columns, "unique"), Into::into);
        sequence.push_ddl(format!(
            "alter table {} add constraint {} unique ({})",
            f.wrap(table.name()),
            f.wrap(&name),
            f.columnize(columns)
        ));
        Ok(())
    }

    fn drop_unique(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        columns: &[String],
        name: Option<&str>,
        sequence: &mut Sequence,
    ) -> Result<()> {
        let name = name.map_or_else(|| index_name(table.name(), columns, "unique"), Into::into);
        sequence.push_ddl(format!(
            "alter table {} drop constraint {}",
            f.wrap(table.name()),
            f.wrap(&name)
        ));
        Ok(())
    }

    fn table_comment(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        comment: &str,
        sequence: &mut Sequence,
    ) -> Result<()> {
        let mut sql = String::from("comment on table ");
        f.write_wrapped(&mut sql, table.name());
        sql.push_str(" is ");
        f.ddl_string(&mut sql, comment);
        sequence.push_ddl(sql);
        Ok(())
    }
}
