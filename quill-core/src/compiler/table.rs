use crate::{
    AlterDirective, ColumnBuilder, ColumnKind, ForeignKey, Formatter, Result, Sequence,
    TableBuilder, TableMethod,
};

/// Generated index name: `{table}_{columns}_{kind}`, lowercased, `-` and `.` become `_`.
pub fn index_name(table: &str, columns: &[String], kind: &str) -> String {
    format!("{}_{}_{}", table, columns.join("_"), kind)
        .to_lowercase()
        .replace(['-', '.'], "_")
}

/// Compiles the creation or alteration of one table into DDL statements.
pub trait TableCompiler: Send + Sync {
    fn compile(&self, f: &mut Formatter, table: &TableBuilder, sequence: &mut Sequence) -> Result<()> {
        match table.method() {
            TableMethod::Create | TableMethod::CreateIfNotExists => {
                self.create_table(f, table, sequence)
            }
            TableMethod::Alter => self.alter_table(f, table, sequence),
        }
    }

    fn column_definitions(
        &self,
        f: &Formatter,
        table: &TableBuilder,
        kind: ColumnKind,
    ) -> Result<Vec<String>> {
        let compiler = f.dialect().column_compiler();
        table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, v)| v.kind == kind)
            .map(|(i, v)| compiler.compile_column(f, v, i))
            .collect()
    }

    /// Row identifier column for dialects that refuse a table without columns.
    fn implicit_column(&self, _f: &Formatter) -> Option<String> {
        None
    }

    /// Directives that must be part of the `create table` statement itself.
    fn inline_at_creation(&self, _directive: &AlterDirective) -> bool {
        false
    }

    fn inline_constraint(
        &self,
        f: &Formatter,
        table: &TableBuilder,
        directive: &AlterDirective,
    ) -> Result<String> {
        let mut out = String::new();
        match directive {
            AlterDirective::Primary { columns, name } => {
                out.push_str("constraint ");
                f.write_identifier(
                    &mut out,
                    &name.clone().unwrap_or_else(|| self.primary_name(table.name())),
                );
                out.push_str(" primary key (");
                out.push_str(&f.columnize(columns));
                out.push(')');
            }
            AlterDirective::Unique { columns, name } => {
                out.push_str("constraint ");
                f.write_identifier(
                    &mut out,
                    &name
                        .clone()
                        .unwrap_or_else(|| index_name(table.name(), columns, "unique")),
                );
                out.push_str(" unique (");
                out.push_str(&f.columnize(columns));
                out.push(')');
            }
            AlterDirective::Foreign(foreign) => {
                out.push_str("constraint ");
                f.write_identifier(&mut out, &self.foreign_name(table, foreign));
                out.push_str(" foreign key(");
                out.push_str(&f.columnize(&foreign.columns));
                out.push_str(") ");
                out.push_str(&self.references(f, foreign));
            }
            _ => {}
        }
        Ok(out)
    }

    fn create_table(&self, f: &mut Formatter, table: &TableBuilder, sequence: &mut Sequence) -> Result<()> {
        let mut definitions = self.column_definitions(f, table, ColumnKind::Add)?;
        if definitions.is_empty() {
            definitions.extend(self.implicit_column(f));
        }
        let directives = table.all_directives();
        for directive in directives.iter().filter(|v| self.inline_at_creation(v)) {
            let constraint = self.inline_constraint(f, table, directive)?;
            if !constraint.is_empty() {
                definitions.push(constraint);
            }
        }
        let mut sql = String::from("create table ");
        if table.method() == TableMethod::CreateIfNotExists {
            sql.push_str("if not exists ");
        }
        f.write_wrapped(&mut sql, table.name());
        sql.push_str(" (");
        sql.push_str(&definitions.join(", "));
        sql.push(')');
        sequence.push_ddl(sql);
        self.column_comments(f, table, sequence)?;
        for directive in directives.iter().filter(|v| !self.inline_at_creation(v)) {
            self.directive(f, table, directive, sequence)?;
        }
        Ok(())
    }

    fn alter_table(&self, f: &mut Formatter, table: &TableBuilder, sequence: &mut Sequence) -> Result<()> {
        let added = self.column_definitions(f, table, ColumnKind::Add)?;
        if !added.is_empty() {
            self.add_columns(f, table, added, sequence)?;
        }
        let altered: Vec<&ColumnBuilder> = table
            .columns()
            .iter()
            .filter(|v| v.kind == ColumnKind::Alter)
            .collect();
        if !altered.is_empty() {
            self.alter_columns(f, table, &altered, sequence)?;
        }
        self.column_comments(f, table, sequence)?;
        for directive in table.all_directives() {
            self.directive(f, table, &directive, sequence)?;
        }
        Ok(())
    }

    fn add_columns(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        definitions: Vec<String>,
        sequence: &mut Sequence,
    ) -> Result<()> {
        let table = f.wrap(table.name());
        for definition in definitions {
            sequence.push_ddl(format!("alter table {table} add column {definition}"));
        }
        Ok(())
    }

    fn alter_columns(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        _columns: &[&ColumnBuilder],
        _sequence: &mut Sequence,
    ) -> Result<()> {
        self.unsupported(f, table, "alter")
    }

    fn column_comments(&self, _f: &mut Formatter, _table: &TableBuilder, _sequence: &mut Sequence) -> Result<()> {
        Ok(())
    }

    fn directive(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        directive: &AlterDirective,
        sequence: &mut Sequence,
    ) -> Result<()> {
        match directive {
            AlterDirective::Index { columns, name } => {
                self.index(f, table, columns, name.as_deref(), sequence)
            }
            AlterDirective::DropIndex { columns, name } => {
                self.drop_index(f, table, columns, name.as_deref(), sequence)
            }
            AlterDirective::Unique { columns, name } => {
                self.unique(f, table, columns, name.as_deref(), sequence)
            }
            AlterDirective::DropUnique { columns, name } => {
                self.drop_unique(f, table, columns, name.as_deref(), sequence)
            }
            AlterDirective::Foreign(foreign) => self.foreign(f, table, foreign, sequence),
            AlterDirective::DropForeign { columns, name } => {
                self.drop_foreign(f, table, columns, name.as_deref(), sequence)
            }
            AlterDirective::Primary { columns, name } => {
                self.primary(f, table, columns, name.as_deref(), sequence)
            }
            AlterDirective::DropPrimary { name } => {
                self.drop_primary(f, table, name.as_deref(), sequence)
            }
            AlterDirective::RenameColumn { from, to } => {
                self.rename_column(f, table, from, to, sequence)
            }
            AlterDirective::DropColumns(columns) => self.drop_columns(f, table, columns, sequence),
            AlterDirective::Comment(comment) => self.table_comment(f, table, comment, sequence),
        }
    }

    /// Directives a dialect cannot express are logged and skipped.
    fn unsupported(&self, f: &Formatter, table: &TableBuilder, method: &str) -> Result<()> {
        log::warn!(
            "{} does not support {} on table \"{}\", the directive is skipped",
            f.dialect().name(),
            method,
            table.name()
        );
        Ok(())
    }

    fn primary_name(&self, table: &str) -> String {
        format!("{table}_pkey")
            .to_lowercase()
            .replace(['-', '.'], "_")
    }

    fn foreign_name(&self, table: &TableBuilder, foreign: &ForeignKey) -> String {
        foreign
            .key_name
            .clone()
            .unwrap_or_else(|| index_name(table.name(), &foreign.columns, "foreign"))
    }

    /// `references "table" ("column") [on delete ...] [on update ...]`
    fn references(&self, f: &Formatter, foreign: &ForeignKey) -> String {
        let mut out = String::from("references ");
        f.write_wrapped(&mut out, &foreign.in_table);
        out.push_str(" (");
        out.push_str(&f.columnize(&foreign.references));
        out.push(')');
        if let Some(action) = &foreign.on_delete {
            out.push_str(" on delete ");
            out.push_str(action);
        }
        if let Some(action) = &foreign.on_update {
            out.push_str(" on update ");
            out.push_str(action);
        }
        if let Some(mode) = &foreign.deferrable {
            out.push_str(" deferrable initially ");
            out.push_str(mode);
        }
        out
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
            "create index {} on {} ({})",
            f.wrap(&name),
            f.wrap(table.name()),
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
        sequence.push_ddl(format!("drop index {}", f.wrap(&name)));
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
            "create unique index {} on {} ({})",
            f.wrap(&name),
            f.wrap(table.name()),
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
        sequence.push_ddl(format!("drop index {}", f.wrap(&name)));
        Ok(())
    }

    fn foreign(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        foreign: &ForeignKey,
        sequence: &mut Sequence,
    ) -> Result<()> {
        sequence.push_ddl(format!(
            "alter table {} add constraint {} foreign key ({}) {}",
            f.wrap(table.name()),
            f.wrap(&self.foreign_name(table, foreign)),
            f.columnize(&foreign.columns),
            self.references(f, foreign)
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
            "alter table {} drop constraint {}",
            f.wrap(table.name()),
            f.wrap(&name)
        ));
        Ok(())
    }

    fn primary(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        columns: &[String],
        name: Option<&str>,
        sequence: &mut Sequence,
    ) -> Result<()> {
        let name = name.map_or_else(|| self.primary_name(table.name()), Into::into);
        sequence.push_ddl(format!(
            "alter table {} add constraint {} primary key ({})",
            f.wrap(table.name()),
            f.wrap(&name),
            f.columnize(columns)
        ));
        Ok(())
    }

    fn drop_primary(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        name: Option<&str>,
        sequence: &mut Sequence,
    ) -> Result<()> {
        let name = name.map_or_else(|| self.primary_name(table.name()), Into::into);
        sequence.push_ddl(format!(
            "alter table {} drop constraint {}",
            f.wrap(table.name()),
            f.wrap(&name)
        ));
        Ok(())
    }

    fn rename_column(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        from: &str,
        to: &str,
        sequence: &mut Sequence,
    ) -> Result<()> {
        sequence.push_ddl(format!(
            "alter table {} rename column {} to {}",
            f.wrap(table.name()),
            f.wrap(from),
            f.wrap(to)
        ));
        Ok(())
    }

    fn drop_columns(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        columns: &[String],
        sequence: &mut Sequence,
    ) -> Result<()> {
        let drops: Vec<String> = columns
            .iter()
            .map(|v| format!("drop column {}", f.wrap(v)))
            .collect();
        sequence.push_ddl(format!(
            "alter table {} {}",
            f.wrap(table.name()),
            drops.join(", ")
        ));
        Ok(())
    }

    fn table_comment(
        &self,
        f: &mut Formatter,
        table: &TableBuilder,
        _comment: &str,
        _sequence: &mut Sequence,
    ) -> Result<()> {
        self.unsupported(f, table, "comment")
    }
}
