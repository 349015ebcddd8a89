use super::query::names;
use crate::{ColumnBuilder, ColumnType, ForeignKey, Raw};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMethod {
    Create,
    CreateIfNotExists,
    Alter,
}

/// Table level operation, run after the columns were created or altered.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterDirective {
    Index {
        columns: Vec<String>,
        name: Option<String>,
    },
    DropIndex {
        columns: Vec<String>,
        name: Option<String>,
    },
    Unique {
        columns: Vec<String>,
        name: Option<String>,
    },
    DropUnique {
        columns: Vec<String>,
        name: Option<String>,
    },
    Foreign(ForeignKey),
    DropForeign {
        columns: Vec<String>,
        name: Option<String>,
    },
    Primary {
        columns: Vec<String>,
        name: Option<String>,
    },
    DropPrimary {
        name: Option<String>,
    },
    RenameColumn {
        from: String,
        to: String,
    },
    DropColumns(Vec<String>),
    Comment(String),
}

impl AlterDirective {
    pub fn method_name(&self) -> &'static str {
        match self {
            AlterDirective::Index { .. } => "index",
            AlterDirective::DropIndex { .. } => "dropIndex",
            AlterDirective::Unique { .. } => "unique",
            AlterDirective::DropUnique { .. } => "dropUnique",
            AlterDirective::Foreign(..) => "foreign",
            AlterDirective::DropForeign { .. } => "dropForeign",
            AlterDirective::Primary { .. } => "primary",
            AlterDirective::DropPrimary { .. } => "dropPrimary",
            AlterDirective::RenameColumn { .. } => "renameColumn",
            AlterDirective::DropColumns(..) => "dropColumn",
            AlterDirective::Comment(..) => "comment",
        }
    }
}

/// Accumulates the columns and directives of a created or altered table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBuilder {
    name: String,
    method: TableMethod,
    columns: Vec<ColumnBuilder>,
    directives: Vec<AlterDirective>,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>, method: TableMethod) -> Self {
        Self {
            name: name.into(),
            method,
            columns: Vec::new(),
            directives: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> TableMethod {
        self.method
    }

    pub fn is_altering(&self) -> bool {
        self.method == TableMethod::Alter
    }

    pub fn columns(&self) -> &[ColumnBuilder] {
        &self.columns
    }

    pub fn directives(&self) -> &[AlterDirective] {
        &self.directives
    }

    /// Explicit directives followed by the ones implied by column modifiers.
    pub fn all_directives(&self) -> Vec<AlterDirective> {
        let mut result = self.directives.clone();
        for column in &self.columns {
            let modifiers = &column.modifiers;
            if let Some(name) = &modifiers.primary {
                result.push(AlterDirective::Primary {
                    columns: vec![column.name.clone()],
                    name: name.clone(),
                });
            }
            if let Some(name) = &modifiers.unique {
                result.push(AlterDirective::Unique {
                    columns: vec![column.name.clone()],
                    name: name.clone(),
                });
            }
            if let Some(name) = &modifiers.index {
                result.push(AlterDirective::Index {
                    columns: vec![column.name.clone()],
                    name: name.clone(),
                });
            }
            if let Some(foreign) = &modifiers.foreign {
                result.push(AlterDirective::Foreign(foreign.clone()));
            }
        }
        result
    }

    pub fn column(&mut self, name: impl Into<String>, column_type: ColumnType) -> &mut ColumnBuilder {
        let altering = self.is_altering();
        self.columns
            .push(ColumnBuilder::new(name, column_type, altering));
        let index = self.columns.len() - 1;
        &mut self.columns[index]
    }

    pub fn increments(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Increments)
    }

    pub fn big_increments(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::BigIncrements)
    }

    pub fn integer(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Integer)
    }

    pub fn big_integer(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::BigInteger)
    }

    pub fn tiny_integer(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::TinyInteger)
    }

    pub fn text(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Text)
    }

    /// `varchar(length)`, 255 when no length is given.
    pub fn string(&mut self, name: impl Into<String>, length: Option<u32>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::String(length.unwrap_or(255)))
    }

    pub fn float(&mut self, name: impl Into<String>, precision: u8, scale: u8) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Float { precision, scale })
    }

    pub fn double(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Double)
    }

    pub fn real(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Real)
    }

    pub fn decimal(&mut self, name: impl Into<String>, precision: u8, scale: u8) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Decimal { precision, scale })
    }

    pub fn boolean(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Boolean)
    }

    pub fn date(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Date)
    }

    pub fn datetime(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::DateTime)
    }

    pub fn timestamp(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Timestamp)
    }

    pub fn time(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Time)
    }

    pub fn binary(&mut self, name: impl Into<String>, length: Option<u32>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Binary(length))
    }

    pub fn json(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Json)
    }

    pub fn jsonb(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Jsonb)
    }

    pub fn enu(
        &mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Enum(names(values)))
    }

    pub fn uuid(&mut self, name: impl Into<String>) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Uuid)
    }

    pub fn specific_type(
        &mut self,
        name: impl Into<String>,
        sql_type: impl Into<String>,
    ) -> &mut ColumnBuilder {
        self.column(name, ColumnType::Specific(sql_type.into()))
    }

    /// `created_at` and `updated_at`, not null and defaulting to the current time when asked.
    pub fn timestamps(&mut self, default_to_now: bool) {
        for name in ["created_at", "updated_at"] {
            let column = self.timestamp(name);
            if default_to_now {
                column
                    .not_nullable()
                    .default_raw(Raw::new("CURRENT_TIMESTAMP"));
            }
        }
    }

    pub fn index(&mut self, columns: impl IntoIterator<Item = impl Into<String>>, name: Option<&str>) {
        self.directives.push(AlterDirective::Index {
            columns: names(columns),
            name: name.map(Into::into),
        });
    }

    pub fn drop_index(
        &mut self,
        columns: impl IntoIterator<Item = impl Into<String>>,
        name: Option<&str>,
    ) {
        self.directives.push(AlterDirective::DropIndex {
            columns: names(columns),
            name: name.map(Into::into),
        });
    }

    pub fn unique(&mut self, columns: impl IntoIterator<Item = impl Into<String>>, name: Option<&str>) {
        self.directives.push(AlterDirective::Unique {
            columns: names(columns),
            name: name.map(Into::into),
        });
    }

    pub fn drop_unique(
        &mut self,
        columns: impl IntoIterator<Item = impl Into<String>>,
        name: Option<&str>,
    ) {
        self.directives.push(AlterDirective::DropUnique {
            columns: names(columns),
            name: name.map(Into::into),
        });
    }

    /// Table level foreign key, completed through the returned [`ForeignKey`].
    pub fn foreign(&mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> &mut ForeignKey {
        self.directives.push(AlterDirective::Foreign(ForeignKey {
            columns: names(columns),
            ..Default::default()
        }));
        match self.directives.last_mut() {
            Some(AlterDirective::Foreign(foreign)) => foreign,
            _ => unreachable!(),
        }
    }

    pub fn drop_foreign(
        &mut self,
        columns: impl IntoIterator<Item = impl Into<String>>,
        name: Option<&str>,
    ) {
        self.directives.push(AlterDirective::DropForeign {
            columns: names(columns),
            name: name.map(Into::into),
        });
    }

    pub fn primary(&mut self, columns: impl IntoIterator<Item = impl Into<String>>, name: Option<&str>) {
        self.directives.push(AlterDirective::Primary {
            columns: names(columns),
            name: name.map(Into::into),
        });
    }

    pub fn drop_primary(&mut self, name: Option<&str>) {
        self.directives.push(AlterDirective::DropPrimary {
            name: name.map(Into::into),
        });
    }

    pub fn rename_column(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.directives.push(AlterDirective::RenameColumn {
            from: from.into(),
            to: to.into(),
        });
    }

    pub fn drop_column(&mut self, column: impl Into<String>) {
        self.drop_columns([column]);
    }

    pub fn drop_columns(&mut self, columns: impl IntoIterator<Item = impl Into<String>>) {
        self.directives
            .push(AlterDirective::DropColumns(names(columns)));
    }

    pub fn comment(&mut self, comment: impl Into<String>) {
        self.directives.push(AlterDirective::Comment(comment.into()));
    }
}
