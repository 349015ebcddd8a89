use crate::{CompiledStatement, Config, Dialect, Formatter, Raw, Result, TableBuilder, TableMethod};

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaStatement {
    Table(TableBuilder),
    DropTable { name: String, if_exists: bool },
    RenameTable { from: String, to: String },
    HasTable(String),
    HasColumn { table: String, column: String },
    CreateSchema { name: String, if_not_exists: bool },
    DropSchema { name: String, if_exists: bool },
    Raw(Raw),
}

/// Owned accumulator of schema changes, compiled into one statement sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaBuilder {
    statements: Vec<SchemaStatement>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statements(&self) -> &[SchemaStatement] {
        &self.statements
    }

    fn table_statement(
        mut self,
        name: impl Into<String>,
        method: TableMethod,
        f: impl FnOnce(&mut TableBuilder),
    ) -> Self {
        let mut table = TableBuilder::new(name, method);
        f(&mut table);
        self.statements.push(SchemaStatement::Table(table));
        self
    }

    pub fn create_table(self, name: impl Into<String>, f: impl FnOnce(&mut TableBuilder)) -> Self {
        self.table_statement(name, TableMethod::Create, f)
    }

    pub fn create_table_if_not_exists(
        self,
        name: impl Into<String>,
        f: impl FnOnce(&mut TableBuilder),
    ) -> Self {
        self.table_statement(name, TableMethod::CreateIfNotExists, f)
    }

    pub fn alter_table(self, name: impl Into<String>, f: impl FnOnce(&mut TableBuilder)) -> Self {
        self.table_statement(name, TableMethod::Alter, f)
    }

    /// Same as [`SchemaBuilder::alter_table`].
    pub fn table(self, name: impl Into<String>, f: impl FnOnce(&mut TableBuilder)) -> Self {
        self.alter_table(name, f)
    }

    pub fn drop_table(mut self, name: impl Into<String>) -> Self {
        self.statements.push(SchemaStatement::DropTable {
            name: name.into(),
            if_exists: false,
        });
        self
    }

    pub fn drop_table_if_exists(mut self, name: impl Into<String>) -> Self {
        self.statements.push(SchemaStatement::DropTable {
            name: name.into(),
            if_exists: true,
        });
        self
    }

    pub fn rename_table(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.statements.push(SchemaStatement::RenameTable {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn has_table(mut self, name: impl Into<String>) -> Self {
        self.statements.push(SchemaStatement::HasTable(name.into()));
        self
    }

    pub fn has_column(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.statements.push(SchemaStatement::HasColumn {
            table: table.into(),
            column: column.into(),
        });
        self
    }

    pub fn create_schema(mut self, name: impl Into<String>, if_not_exists: bool) -> Self {
        self.statements.push(SchemaStatement::CreateSchema {
            name: name.into(),
            if_not_exists,
        });
        self
    }

    pub fn drop_schema(mut self, name: impl Into<String>, if_exists: bool) -> Self {
        self.statements.push(SchemaStatement::DropSchema {
            name: name.into(),
            if_exists,
        });
        self
    }

    pub fn raw(mut self, raw: impl Into<Raw>) -> Self {
        self.statements.push(SchemaStatement::Raw(raw.into()));
        self
    }

    pub fn compile(&self, dialect: &dyn Dialect) -> Result<Vec<CompiledStatement>> {
        self.compile_with(dialect, &Config::default())
    }

    pub fn compile_with(
        &self,
        dialect: &dyn Dialect,
        config: &Config,
    ) -> Result<Vec<CompiledStatement>> {
        let mut f = Formatter::new(dialect, config);
        let mut result = dialect.schema_compiler().compile(&mut f, self)?;
        if let Some(timeout) = config.default_timeout {
            for statement in result.iter_mut().filter(|v| v.timeout.is_none()) {
                statement.timeout = Some(timeout);
            }
        }
        Ok(result)
    }
}
