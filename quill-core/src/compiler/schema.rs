use crate::{
    CompiledStatement, Formatter, Method, Raw, Result, SchemaBuilder, SchemaStatement, Sequence,
    Value,
};

/// Compiles a [`SchemaBuilder`] into its ordered statement sequence.
pub trait SchemaCompiler: Send + Sync {
    fn compile(&self, f: &mut Formatter, schema: &SchemaBuilder) -> Result<Vec<CompiledStatement>> {
        let mut sequence = Sequence::new();
        for statement in schema.statements() {
            self.statement(f, statement, &mut sequence)?;
        }
        Ok(sequence.into_vec())
    }

    fn statement(
        &self,
        f: &mut Formatter,
        statement: &SchemaStatement,
        sequence: &mut Sequence,
    ) -> Result<()> {
        match statement {
            SchemaStatement::Table(table) => {
                f.dialect().table_compiler().compile(f, table, sequence)
            }
            SchemaStatement::DropTable { name, if_exists } => {
                self.drop_table(f, name, *if_exists, sequence)
            }
            SchemaStatement::RenameTable { from, to } => self.rename_table(f, from, to, sequence),
            SchemaStatement::HasTable(name) => self.has_table(f, name, sequence),
            SchemaStatement::HasColumn { table, column } => {
                self.has_column(f, table, column, sequence)
            }
            SchemaStatement::CreateSchema {
                name,
                if_not_exists,
            } => self.create_schema(f, name, *if_not_exists, sequence),
            SchemaStatement::DropSchema { name, if_exists } => {
                self.drop_schema(f, name, *if_exists, sequence)
            }
            SchemaStatement::Raw(raw) => self.raw(f, raw, sequence),
        }
    }

    fn drop_table(
        &self,
        f: &mut Formatter,
        name: &str,
        if_exists: bool,
        sequence: &mut Sequence,
    ) -> Result<()> {
        sequence.push_ddl(format!(
            "drop table {}{}",
            if if_exists { "if exists " } else { "" },
            f.wrap(name)
        ));
        Ok(())
    }

    fn rename_table(
        &self,
        f: &mut Formatter,
        from: &str,
        to: &str,
        sequence: &mut Sequence,
    ) -> Result<()> {
        sequence.push_ddl(format!(
            "alter table {} rename to {}",
            f.wrap(from),
            f.wrap(to)
        ));
        Ok(())
    }

    fn has_table(&self, f: &mut Formatter, name: &str, sequence: &mut Sequence) -> Result<()> {
        let mut sql = String::from("select * from information_schema.tables where table_name = ");
        f.parameter(&mut sql, &Value::Text(name.into()));
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
        let mut sql =
            String::from("select * from information_schema.columns where table_name = ");
        f.parameter(&mut sql, &Value::Text(table.into()));
        sql.push_str(" and column_name = ");
        f.parameter(&mut sql, &Value::Text(column.into()));
        sequence.push(CompiledStatement::new(sql, f.take_bindings(), Method::HasColumn));
        Ok(())
    }

    fn create_schema(
        &self,
        f: &mut Formatter,
        name: &str,
        if_not_exists: bool,
        sequence: &mut Sequence,
    ) -> Result<()> {
        sequence.push_ddl(format!(
            "create schema {}{}",
            if if_not_exists { "if not exists " } else { "" },
            f.wrap(name)
        ));
        Ok(())
    }

    fn drop_schema(
        &self,
        f: &mut Formatter,
        name: &str,
        if_exists: bool,
        sequence: &mut Sequence,
    ) -> Result<()> {
        sequence.push_ddl(format!(
            "drop schema {}{}",
            if if_exists { "if exists " } else { "" },
            f.wrap(name)
        ));
        Ok(())
    }

    fn raw(&self, f: &mut Formatter, raw: &Raw, sequence: &mut Sequence) -> Result<()> {
        let mut sql = String::new();
        f.raw(&mut sql, raw)?;
        sequence.push(CompiledStatement::new(sql, f.take_bindings(), Method::Raw));
        Ok(())
    }
}
