use crate::{Change, SqliteDdl, SqliteDialect};
use quill_core::{
    AlterDirective, ColumnBuilder, ColumnCompiler, Dialect, ForeignKey, Formatter, Result,
    Sequence, TableBuilder, TableCompiler,
};

impl ColumnCompiler for SqliteDialect {
    fn jsonb(&self, _f: &Formatter, _column: &ColumnBuilder) -> Result<String> {
        Ok("json".into())
    }
}

impl SqliteDialect {
    fn rebuild(&self, f: &Formatter, table: &TableBuilder, change: Change) -> SqliteDdl {
        SqliteDdl::new(
            self.clone(),
            f.transform(table.name()),
            change,
            f.config().migration_chunk_size,
        )
    }
}

/// Keys cannot be added to an existing table, they are declared by `create table`.
impl TableCompiler for SqliteDialect {
    fn implicit_column(&self, f: &Formatter) -> Option<String> {
        Some(format!("{} {}", f.wrap("id"), self.increments()))
    }

    fn inline_at_creation(&self, directive: &AlterDirective) -> bool {
        matches!(
            directive,
            AlterDirective::Primary { .. } | AlterDirective::Foreign(..)
        )
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
            // Spliced into the stored table text, which holds native SQL
            let definition = self.position_bindings(&compiler.compile_column(f, column, i)?);
            let change = Change::AlterColumn {
                column: f.transform(&column.name),
                definition,
            };
            sequence.push(self.rebuild(f, table, change).statement());
        }
        Ok(())
    }

    fn foreign(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        _foreign: &ForeignKey,
        _sequence: &mut Sequence,
    ) -> Result<()> {
        TableCompiler::unsupported(self, f, table, "foreign")
    }

    fn drop_foreign(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        columns: &[String],
        name: Option<&str>,
        sequence: &mut Sequence,
    ) -> Result<()> {
        let change = Change::DropForeign {
            columns: columns.iter().map(|v| f.transform(v)).collect(),
            name: name.map(|v| f.transform(v)),
        };
        sequence.push(self.rebuild(f, table, change).statement());
        Ok(())
    }

    fn primary(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        _columns: &[String],
        _name: Option<&str>,
        _sequence: &mut Sequence,
    ) -> Result<()> {
        TableCompiler::unsupported(self, f, table, "primary")
    }

    fn drop_primary(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        _name: Option<&str>,
        _sequence: &mut Sequence,
    ) -> Result<()> {
        TableCompiler::unsupported(self, f, table, "dropPrimary")
    }

    fn rename_column(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        from: &str,
        to: &str,
        sequence: &mut Sequence,
    ) -> Result<()> {
        let change = Change::RenameColumn {
            from: f.transform(from),
            to: f.transform(to),
        };
        sequence.push(self.rebuild(f, table, change).statement());
        Ok(())
    }

    /// One rebuild per column.
    fn drop_columns(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        columns: &[String],
        sequence: &mut Sequence,
    ) -> Result<()> {
        for column in columns {
            let change = Change::DropColumn(f.transform(column));
            sequence.push(self.rebuild(f, table, change).statement());
        }
        Ok(())
    }
}
