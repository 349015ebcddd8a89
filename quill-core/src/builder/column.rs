use crate::{Raw, Value};

/// SQL type requested for a column, resolved to a type name by the column compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    Increments,
    BigIncrements,
    Integer,
    BigInteger,
    TinyInteger,
    Text,
    String(u32),
    Float { precision: u8, scale: u8 },
    Double,
    Real,
    Decimal { precision: u8, scale: u8 },
    Boolean,
    Date,
    DateTime,
    Timestamp,
    Time,
    Binary(Option<u32>),
    Json,
    Jsonb,
    Enum(Vec<String>),
    Uuid,
    /// Passed through as written.
    Specific(String),
}

impl ColumnType {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Increments => "increments",
            ColumnType::BigIncrements => "bigIncrements",
            ColumnType::Integer => "integer",
            ColumnType::BigInteger => "bigInteger",
            ColumnType::TinyInteger => "tinyInteger",
            ColumnType::Text => "text",
            ColumnType::String(..) => "string",
            ColumnType::Float { .. } => "float",
            ColumnType::Double => "double",
            ColumnType::Real => "real",
            ColumnType::Decimal { .. } => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Time => "time",
            ColumnType::Binary(..) => "binary",
            ColumnType::Json => "json",
            ColumnType::Jsonb => "jsonb",
            ColumnType::Enum(..) => "enum",
            ColumnType::Uuid => "uuid",
            ColumnType::Specific(..) => "specificType",
        }
    }

    pub fn is_increments(&self) -> bool {
        matches!(self, ColumnType::Increments | ColumnType::BigIncrements)
    }
}

/// Whether the column is added to the table or redefined in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnKind {
    #[default]
    Add,
    Alter,
}

/// Default value of a column, embedded as a literal in the DDL.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultTo {
    Value(Value),
    Raw(Raw),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub in_table: String,
    pub references: Vec<String>,
    pub key_name: Option<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
    pub deferrable: Option<String>,
}

impl ForeignKey {
    /// Referenced columns, `"table.column"` also sets the referenced table.
    pub fn references(&mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.references = columns
            .into_iter()
            .map(|v| {
                let v: String = v.into();
                match v.split_once('.') {
                    Some((table, column)) => {
                        self.in_table = table.into();
                        column.into()
                    }
                    None => v,
                }
            })
            .collect();
        self
    }

    pub fn in_table(&mut self, table: impl Into<String>) -> &mut Self {
        self.in_table = table.into();
        self
    }

    pub fn on_delete(&mut self, action: impl Into<String>) -> &mut Self {
        self.on_delete = Some(action.into());
        self
    }

    pub fn on_update(&mut self, action: impl Into<String>) -> &mut Self {
        self.on_update = Some(action.into());
        self
    }

    pub fn with_key_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.key_name = Some(name.into());
        self
    }

    pub fn deferrable(&mut self, mode: impl Into<String>) -> &mut Self {
        self.deferrable = Some(mode.into());
        self
    }
}

/// Column level modifiers. For the index-like ones `Some(None)` requests a generated name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modifiers {
    pub nullable: Option<bool>,
    pub default: Option<DefaultTo>,
    pub unsigned: bool,
    pub primary: Option<Option<String>>,
    pub unique: Option<Option<String>>,
    pub index: Option<Option<String>>,
    pub foreign: Option<ForeignKey>,
    pub comment: Option<String>,
    pub collate: Option<String>,
    pub first: bool,
    pub after: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBuilder {
    pub name: String,
    pub column_type: ColumnType,
    pub kind: ColumnKind,
    pub modifiers: Modifiers,
    altering: bool,
}

impl ColumnBuilder {
    pub fn new(name: impl Into<String>, column_type: ColumnType, altering: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            kind: ColumnKind::Add,
            modifiers: Modifiers::default(),
            altering,
        }
    }

    pub fn nullable(&mut self) -> &mut Self {
        self.modifiers.nullable = Some(true);
        self
    }

    pub fn not_nullable(&mut self) -> &mut Self {
        self.modifiers.nullable = Some(false);
        self
    }

    pub fn default_to(&mut self, value: impl Into<Value>) -> &mut Self {
        self.modifiers.default = Some(DefaultTo::Value(value.into()));
        self
    }

    pub fn default_raw(&mut self, raw: impl Into<Raw>) -> &mut Self {
        self.modifiers.default = Some(DefaultTo::Raw(raw.into()));
        self
    }

    pub fn unsigned(&mut self) -> &mut Self {
        self.modifiers.unsigned = true;
        self
    }

    /// Primary key on this column alone, ignored on increments columns which already are one.
    pub fn primary(&mut self) -> &mut Self {
        if !self.column_type.is_increments() {
            self.modifiers.primary = Some(None);
        }
        self
    }

    pub fn unique(&mut self) -> &mut Self {
        self.modifiers.unique = Some(None);
        self
    }

    pub fn unique_named(&mut self, name: impl Into<String>) -> &mut Self {
        self.modifiers.unique = Some(Some(name.into()));
        self
    }

    pub fn index(&mut self) -> &mut Self {
        self.modifiers.index = Some(None);
        self
    }

    pub fn index_named(&mut self, name: impl Into<String>) -> &mut Self {
        self.modifiers.index = Some(Some(name.into()));
        self
    }

    /// Foreign key to `column`, or to `"table.column"`.
    pub fn references(&mut self, column: impl Into<String>) -> &mut Self {
        let mut foreign = ForeignKey {
            columns: vec![self.name.clone()],
            ..Default::default()
        };
        foreign.references([column]);
        self.modifiers.foreign = Some(foreign);
        self
    }

    fn foreign(&mut self) -> &mut ForeignKey {
        let name = self.name.clone();
        self.modifiers.foreign.get_or_insert_with(|| ForeignKey {
            columns: vec![name],
            ..Default::default()
        })
    }

    pub fn in_table(&mut self, table: impl Into<String>) -> &mut Self {
        self.foreign().in_table(table);
        self
    }

    pub fn on_delete(&mut self, action: impl Into<String>) -> &mut Self {
        self.foreign().on_delete(action);
        self
    }

    pub fn on_update(&mut self, action: impl Into<String>) -> &mut Self {
        self.foreign().on_update(action);
        self
    }

    pub fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.modifiers.comment = Some(comment.into());
        self
    }

    pub fn collate(&mut self, collation: impl Into<String>) -> &mut Self {
        self.modifiers.collate = Some(collation.into());
        self
    }

    pub fn first(&mut self) -> &mut Self {
        self.modifiers.first = true;
        self
    }

    pub fn after(&mut self, column: impl Into<String>) -> &mut Self {
        self.modifiers.after = Some(column.into());
        self
    }

    /// Redefine an existing column instead of adding it. Only meaningful on a table being altered.
    pub fn alter(&mut self) -> &mut Self {
        if self.altering {
            self.kind = ColumnKind::Alter;
        } else {
            log::debug!(
                "alter() on column \"{}\" ignored, the table is not being altered",
                self.name
            );
        }
        self
    }
}
