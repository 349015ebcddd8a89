use crate::MySqlDialect;
use quill_core::{
    ColumnBuilder, ColumnCompiler, ColumnType, Formatter, ModifierKind, Result, Sequence,
    TableBuilder, TableCompiler, index_name,
};

impl ColumnCompiler for MySqlDialect {
    fn modifiers(&self) -> &'static [ModifierKind] {
        &[
            ModifierKind::Unsigned,
            ModifierKind::Nullable,
            ModifierKind::DefaultTo,
            ModifierKind::Comment,
            ModifierKind::Collate,
            ModifierKind::First,
            ModifierKind::After,
        ]
    }

    fn column_type(&self, f: &Formatter, column: &ColumnBuilder) -> Result<String> {
        Ok(match &column.column_type {
            ColumnType::Increments => self.increments().into(),
            ColumnType::BigIncrements => self.big_increments().into(),
            ColumnType::Integer => "int".into(),
            ColumnType::BigInteger => "bigint".into(),
            ColumnType::TinyInteger => "tinyint".into(),
            ColumnType::Text => "text".into(),
            ColumnType::String(length) => format!("varchar({length})"),
            ColumnType::Float { precision, scale } => format!("float({precision}, {scale})"),
            ColumnType::Double => "double".into(),
            ColumnType::Real => "real".into(),
            ColumnType::Decimal { precision, scale } => format!("decimal({precision}, {scale})"),
            ColumnType::Boolean => "boolean".into(),
            ColumnType::Date => "date".into(),
            ColumnType::DateTime => "datetime".into(),
            ColumnType::Timestamp => "timestamp".into(),
            ColumnType::Time => "time".into(),
            ColumnType::Binary(Some(length)) => format!("varbinary({length})"),
            ColumnType::Binary(None) => "blob".into(),
            ColumnType::Json | ColumnType::Jsonb => "json".into(),
            ColumnType::Enum(values) => self.enum_type(f, column, values),
            ColumnType::Uuid => "char(36)".into(),
            ColumnType::Specific(v) => v.clone(),
        })
    }

    fn increments(&self) -> &'static str {
        "int unsigned not null auto_increment primary key"
    }

    fn big_increments(&self) -> &'static str {
        "bigint unsigned not null auto_increment primary key"
    }

    fn enum_type(&self, f: &Formatter, _column: &ColumnBuilder, values: &[String]) -> String {
        let mut out = String::from("enum(");
        self.enum_values(f, &mut out, values);
        out.push(')');
        out
    }
}

impl TableCompiler for MySqlDialect {
    fn implicit_column(&self, f: &Formatter) -> Option<String> {
        Some(format!("{} {}", f.wrap("id"), self.increments()))
    }

    fn alter_columns(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        columns: &[&ColumnBuilder],
        sequence: &mut Sequence,
    ) -> Result<()> {
        let compiler = f.dialect().column_compiler();
        for (i, column) in columns.iter().enumerate() {
            sequence.push_ddl(format!(
                "alter table {} modify {}",
                f.wrap(table.name()),
                compiler.compile_column(f, column, i)?
            ));
        }
        Ok(())
    }

    fn index(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        columns: &[String],
        name: Option<&str>,
        sequence: &mut Sequence,
    ) -> Result<()> {
        let name = name.map_or_else(|| index_name(table.name(), columns, "index"), Into::into);
        sequence.push_ddl(format!(
            "alter table {} add index {}({})",
            f.wrap(table.name()),
            f.wrap(&name),
            f.columnize(columns)
        ));
        Ok(())
    }

    fn drop_index(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        columns: &[String],
        name: Option<&str>,
        sequence: &mut Sequence,
    ) -> Result<()> {
        let name = name.map_or_else(|| index_name(table.name(), columns, "index"), Into::into);
        sequence.push_ddl(format!(
            "alter table {} drop index {}",
            f.wrap(table.name()),
            f.wrap(&name)
        ));
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
            "alter table {} add unique {}({})",
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
            "alter table {} drop index {}",
            f.wrap(table.name()),
            f.wrap(&name)
        ));
        Ok(())
    }

    fn drop_foreign(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        columns: &[String],
        name: Option<&str>,
        sequence: &mut Sequence,
    ) -> Result<()> {
        let name = name.map_or_else(|| index_name(table.name(), columns, "foreign"), Into::into);
        sequence.push_ddl(format!(
            "alter table {} drop foreign key {}",
            f.wrap(table.name()),
            f.wrap(&name)
        ));
        Ok(())
    }

    fn drop_primary(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        _name: Option<&str>,
        sequence: &mut Sequence,
    ) -> Result<()> {
        sequence.push_ddl(format!(
            "alter table {} drop primary key",
            f.wrap(table.name())
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
        let mut sql = String::from("alter table ");
        f.write_wrapped(&mut sql, table.name());
        sql.push_str(" comment = ");
        f.ddl_string(&mut sql, comment);
        sequence.push_ddl(sql);
        Ok(())
    }
}
