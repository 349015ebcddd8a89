use crate::{ColumnBuilder, ColumnType, CompileError, DefaultTo, Formatter, Result};

/// Column modifier clauses, rendered in the order a dialect declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    Unsigned,
    Nullable,
    DefaultTo,
    Comment,
    Collate,
    First,
    After,
}

/// Renders one column definition: quoted name, type, modifiers.
pub trait ColumnCompiler: Send + Sync {
    fn modifiers(&self) -> &'static [ModifierKind] {
        &[ModifierKind::Nullable, ModifierKind::DefaultTo]
    }

    /// `position` only serves error messages.
    fn compile_column(&self, f: &Formatter, column: &ColumnBuilder, position: usize) -> Result<String> {
        if column.name.trim().is_empty() {
            return Err(CompileError::MissingColumnName(position).into());
        }
        let mut out = f.wrap(&column.name);
        out.push(' ');
        out.push_str(&self.column_type(f, column)?);
        for kind in self.modifiers() {
            let modifier = self.modifier(f, column, *kind)?;
            if !modifier.is_empty() {
                out.push(' ');
                out.push_str(&modifier);
            }
        }
        Ok(out)
    }

    fn column_type(&self, f: &Formatter, column: &ColumnBuilder) -> Result<String> {
        Ok(match &column.column_type {
            ColumnType::Increments => self.increments().into(),
            ColumnType::BigIncrements => self.big_increments().into(),
            ColumnType::Integer => "integer".into(),
            ColumnType::BigInteger => "bigint".into(),
            ColumnType::TinyInteger => "tinyint".into(),
            ColumnType::Text => "text".into(),
            ColumnType::String(length) => format!("varchar({length})"),
            ColumnType::Float { precision, scale } => format!("float({precision}, {scale})"),
            ColumnType::Double => "double".into(),
            ColumnType::Real => "real".into(),
            ColumnType::Decimal { precision, scale } => format!("decimal({precision}, {scale})"),
            ColumnType::Boolean => "integer".into(),
            ColumnType::Date => "date".into(),
            ColumnType::DateTime | ColumnType::Timestamp => "datetime".into(),
            ColumnType::Time => "time".into(),
            ColumnType::Binary(..) => "blob".into(),
            ColumnType::Json => "json".into(),
            ColumnType::Enum(values) => self.enum_type(f, column, values),
            ColumnType::Uuid => "char(36)".into(),
            ColumnType::Specific(v) => v.clone(),
            ColumnType::Jsonb => self.jsonb(f, column)?,
        })
    }

    fn jsonb(&self, f: &Formatter, column: &ColumnBuilder) -> Result<String> {
        Err(self.unsupported(f, column))
    }

    fn unsupported(&self, f: &Formatter, column: &ColumnBuilder) -> crate::Error {
        CompileError::UnsupportedType {
            column_type: column.column_type.name().into(),
            column: column.name.clone(),
            dialect: f.dialect().name(),
        }
        .into()
    }

    fn increments(&self) -> &'static str {
        "integer not null primary key autoincrement"
    }

    fn big_increments(&self) -> &'static str {
        self.increments()
    }

    /// Enumerations are text columns restricted by a check constraint.
    fn enum_type(&self, f: &Formatter, column: &ColumnBuilder, values: &[String]) -> String {
        let mut out = String::from("text check (");
        f.write_wrapped(&mut out, &column.name);
        out.push_str(" in (");
        self.enum_values(f, &mut out, values);
        out.push_str("))");
        out
    }

    fn enum_values(&self, f: &Formatter, out: &mut String, values: &[String]) {
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            f.ddl_string(out, value);
        }
    }

    fn modifier(&self, f: &Formatter, column: &ColumnBuilder, kind: ModifierKind) -> Result<String> {
        Ok(match kind {
            ModifierKind::Unsigned => self.unsigned(column),
            ModifierKind::Nullable => self.nullable(column),
            ModifierKind::DefaultTo => self.default_to(f, column)?,
            ModifierKind::Comment => self.comment(f, column),
            ModifierKind::Collate => self.collate(f, column),
            ModifierKind::First => self.first(column),
            ModifierKind::After => self.after(f, column),
        })
    }

    fn unsigned(&self, column: &ColumnBuilder) -> String {
        if column.modifiers.unsigned {
            "unsigned".into()
        } else {
            String::new()
        }
    }

    /// Increments columns already carry their own nullability.
    fn nullable(&self, column: &ColumnBuilder) -> String {
        if column.column_type.is_increments() {
            return String::new();
        }
        match column.modifiers.nullable {
            Some(true) => "null".into(),
            Some(false) => "not null".into(),
            None => String::new(),
        }
    }

    fn default_to(&self, f: &Formatter, column: &ColumnBuilder) -> Result<String> {
        let mut out = String::new();
        match &column.modifiers.default {
            Some(DefaultTo::Value(value)) => {
                out.push_str("default ");
                f.ddl_literal(&mut out, value);
            }
            Some(DefaultTo::Raw(raw)) => {
                out.push_str("default ");
                f.ddl_raw(&mut out, raw)?;
            }
            None => {}
        }
        Ok(out)
    }

    fn comment(&self, f: &Formatter, column: &ColumnBuilder) -> String {
        let mut out = String::new();
        if let Some(comment) = &column.modifiers.comment {
            out.push_str("comment ");
            f.ddl_string(&mut out, comment);
        }
        out
    }

    fn collate(&self, f: &Formatter, column: &ColumnBuilder) -> String {
        let mut out = String::new();
        if let Some(collation) = &column.modifiers.collate {
            out.push_str("collate ");
            f.write_identifier(&mut out, collation);
        }
        out
    }

    fn first(&self, column: &ColumnBuilder) -> String {
        if column.modifiers.first {
            "first".into()
        } else {
            String::new()
        }
    }

    fn after(&self, f: &Formatter, column: &ColumnBuilder) -> String {
        let mut out = String::new();
        if let Some(after) = &column.modifiers.after {
            out.push_str("after ");
            f.write_wrapped(&mut out, after);
        }
        out
    }
}
